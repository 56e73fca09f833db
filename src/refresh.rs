//! Staleness-driven refresh flows.
//!
//! Each flow follows the same shape: read the store, check staleness, fetch
//! from upstream if needed, upsert every fetched record, then re-read and
//! return what the store now holds. A store error on any record aborts the
//! flow; malformed upstream records were already dropped during parsing.

use chrono::{Duration, Utc};
use tracing::info;

use crate::error::Result;
use crate::nhl::types::{GameLogRecord, RosterPlayerRecord, TeamRecord};
use crate::nhl::UpstreamApi;
use crate::staleness::is_stale;
use crate::storage::{
    GameStat, GameStatUpsert, Player, PlayerUpsert, StatsDatabase, StintUpsert, Team, TeamUpsert,
};
use crate::types::{PlayerId, Season, TeamId};

/// Maximum ages before each mirrored collection is refetched.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    pub team_max_age: Duration,
    pub roster_max_age: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            team_max_age: Duration::hours(24),
            roster_max_age: Duration::hours(4),
        }
    }
}

/// Ensure the team table is fresh, then return all teams.
pub async fn refresh_teams(
    db: &mut StatsDatabase,
    api: &dyn UpstreamApi,
    config: &RefreshConfig,
) -> Result<Vec<Team>> {
    let teams = db.list_teams()?;
    if !is_stale(&teams, config.team_max_age) {
        return Ok(teams);
    }

    info!("team data missing or stale, refreshing from upstream");
    api.clear_team_cache().await;
    let records = api.list_teams().await?;

    let now = Utc::now();
    for record in &records {
        upsert_team_record(db, record, now)?;
    }
    info!(teams = records.len(), "team refresh complete");

    db.list_teams()
}

/// Ensure a team's roster for one season is fresh, then return it.
pub async fn refresh_roster(
    db: &mut StatsDatabase,
    api: &dyn UpstreamApi,
    config: &RefreshConfig,
    team: &Team,
    season: Season,
) -> Result<Vec<Player>> {
    let roster = db.roster(team.id, season)?;
    if !is_stale(&roster, config.roster_max_age) {
        return Ok(roster);
    }

    info!(team = %team.abbr, %season, "roster missing or stale, refreshing from upstream");
    let records = api.team_roster(&team.abbr, season).await?;

    let now = Utc::now();
    for record in &records {
        db.upsert_player(&player_upsert(record, Some(team.id)), now)?;
        db.upsert_stint(
            &StintUpsert {
                player_id: PlayerId::new(record.id),
                team_id: team.id,
                season,
                sweater_number: record.sweater_number,
                games_played: None,
            },
            now,
        )?;
    }
    info!(team = %team.abbr, players = records.len(), "roster refresh complete");

    db.roster(team.id, season)
}

/// Ensure a player's game stats for one season are present, then return them.
/// Stats are fetched only when the store has none for that player and season;
/// once mirrored, a game's counting stats do not age out.
pub async fn refresh_game_log(
    db: &mut StatsDatabase,
    api: &dyn UpstreamApi,
    player_id: PlayerId,
    season: Season,
) -> Result<Vec<GameStat>> {
    let stats = db.game_stats(player_id, season)?;
    if !stats.is_empty() {
        return Ok(stats);
    }

    info!(player = %player_id, %season, "no game stats stored, fetching from upstream");
    let records = api.player_game_log(player_id, season).await?;

    let now = Utc::now();
    for record in &records {
        db.upsert_game_stat(&game_stat_upsert(record, player_id, season), now)?;
    }
    info!(player = %player_id, games = records.len(), "game log fetch complete");

    db.game_stats(player_id, season)
}

fn upsert_team_record(
    db: &mut StatsDatabase,
    record: &TeamRecord,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    let conference_id =
        db.upsert_conference(&record.conference.abbr, &record.conference.name, now)?;
    let division_id = db.upsert_division(&record.division.abbr, &record.division.name, now)?;
    db.upsert_team(
        &TeamUpsert {
            id: TeamId::new(record.franchise_id),
            abbr: record.abbr.clone(),
            common_name: record.common_name.clone(),
            name: record.name.clone(),
            logo: record.logo.clone(),
            conference_id,
            division_id,
        },
        now,
    )
}

fn player_upsert(record: &RosterPlayerRecord, team_id: Option<TeamId>) -> PlayerUpsert {
    PlayerUpsert {
        id: PlayerId::new(record.id),
        first_name: record.first_name.default.clone(),
        last_name: record.last_name.default.clone(),
        birth_city: record.birth_city.as_ref().map(|s| s.default.clone()),
        birth_country: record.birth_country.clone(),
        birth_date: record.birth_date,
        birth_state_province: record
            .birth_state_province
            .as_ref()
            .map(|s| s.default.clone()),
        headshot: record.headshot.clone(),
        height_in_inches: record.height_in_inches,
        height_in_centimeters: record.height_in_centimeters,
        weight_in_pounds: record.weight_in_pounds,
        weight_in_kilograms: record.weight_in_kilograms,
        position_code: record.position_code.clone(),
        shoots_catches: record.shoots_catches.clone(),
        sweater_number: record.sweater_number,
        team_id,
    }
}

fn game_stat_upsert(record: &GameLogRecord, player_id: PlayerId, season: Season) -> GameStatUpsert {
    GameStatUpsert {
        player_id,
        game_id: record.game_id,
        season,
        game_date: record.game_date,
        team_abbr: record.team_abbrev.clone(),
        opponent_abbr: record.opponent_abbrev.clone(),
        opponent_common_name: record
            .opponent_common_name
            .as_ref()
            .map(|s| s.default.clone()),
        home_game: record.is_home_game(),
        goals: record.goals,
        assists: record.assists,
        points: record.points,
        plus_minus: record.plus_minus,
        power_play_goals: record.power_play_goals,
        power_play_points: record.power_play_points,
        shorthanded_goals: record.shorthanded_goals,
        shorthanded_points: record.shorthanded_points,
        game_winning_goal: record.is_game_winning_goal(),
        ot_goals: record.ot_goals,
        shots: record.shots,
        shifts: record.shifts,
        pim: record.pim,
        toi: record.toi.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nhl::types::{GroupRecord, LocalizedString};
    use crate::storage::Table;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubApi {
        teams: Mutex<Vec<TeamRecord>>,
        roster: Mutex<Vec<RosterPlayerRecord>>,
        game_log: Mutex<Vec<GameLogRecord>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UpstreamApi for StubApi {
        async fn list_teams(&self) -> Result<Vec<TeamRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.teams.lock().unwrap().clone())
        }

        async fn team_roster(
            &self,
            _team_abbr: &str,
            _season: Season,
        ) -> Result<Vec<RosterPlayerRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.roster.lock().unwrap().clone())
        }

        async fn player_game_log(
            &self,
            _player_id: PlayerId,
            _season: Season,
        ) -> Result<Vec<GameLogRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.game_log.lock().unwrap().clone())
        }
    }

    /// 32 teams split over 2 conferences and 4 divisions, 8 per division.
    fn league_fixture() -> Vec<TeamRecord> {
        let conferences = [("E", "Eastern"), ("W", "Western")];
        let divisions = [
            ("A", "Atlantic", 0),
            ("M", "Metropolitan", 0),
            ("C", "Central", 1),
            ("P", "Pacific", 1),
        ];

        let mut teams = Vec::new();
        for (d, (div_abbr, div_name, conf_idx)) in divisions.iter().enumerate() {
            let (conf_abbr, conf_name) = conferences[*conf_idx];
            for i in 0..8 {
                let id = (d * 8 + i + 1) as i64;
                teams.push(TeamRecord {
                    franchise_id: id,
                    abbr: format!("T{id:02}"),
                    common_name: format!("Club {id}"),
                    name: format!("City {id} Club {id}"),
                    logo: None,
                    conference: GroupRecord {
                        abbr: conf_abbr.to_string(),
                        name: conf_name.to_string(),
                    },
                    division: GroupRecord {
                        abbr: div_abbr.to_string(),
                        name: div_name.to_string(),
                    },
                });
            }
        }
        teams
    }

    fn local(s: &str) -> LocalizedString {
        LocalizedString {
            default: s.to_string(),
        }
    }

    fn roster_fixture() -> Vec<RosterPlayerRecord> {
        let record = serde_json::json!({
            "id": 8478402,
            "firstName": {"default": "Connor"},
            "lastName": {"default": "McDavid"},
            "positionCode": "C",
            "sweaterNumber": 97
        });
        vec![serde_json::from_value(record).unwrap()]
    }

    fn game_log_fixture(goals: i64) -> Vec<GameLogRecord> {
        let mut record: GameLogRecord = serde_json::from_value(serde_json::json!({
            "gameId": 2025020345,
            "homeRoadFlag": "H",
            "teamAbbrev": "EDM",
            "opponentAbbrev": "BOS"
        }))
        .unwrap();
        record.opponent_common_name = Some(local("Bruins"));
        record.goals = goals;
        record.points = goals;
        vec![record]
    }

    #[tokio::test]
    async fn empty_store_is_seeded_with_the_whole_league() {
        let mut db = StatsDatabase::new_in_memory().unwrap();
        let api = StubApi::default();
        *api.teams.lock().unwrap() = league_fixture();

        let teams = refresh_teams(&mut db, &api, &RefreshConfig::default())
            .await
            .unwrap();

        assert_eq!(teams.len(), 32);
        assert_eq!(db.count(Table::Teams).unwrap(), 32);
        assert_eq!(db.count(Table::Conferences).unwrap(), 2);
        assert_eq!(db.count(Table::Divisions).unwrap(), 4);
    }

    #[tokio::test]
    async fn team_refresh_is_idempotent() {
        let mut db = StatsDatabase::new_in_memory().unwrap();
        let api = StubApi::default();
        *api.teams.lock().unwrap() = league_fixture();
        let config = RefreshConfig {
            team_max_age: Duration::zero(),
            ..RefreshConfig::default()
        };

        let first = refresh_teams(&mut db, &api, &config).await.unwrap();
        let second = refresh_teams(&mut db, &api, &config).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(db.count(Table::Teams).unwrap(), 32);
        assert_eq!(db.count(Table::Conferences).unwrap(), 2);
        assert_eq!(db.count(Table::Divisions).unwrap(), 4);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.name, b.name);
            assert_eq!(a.conference_id, b.conference_id);
            assert_eq!(a.division_id, b.division_id);
        }
    }

    #[tokio::test]
    async fn fresh_teams_are_served_without_an_upstream_call() {
        let mut db = StatsDatabase::new_in_memory().unwrap();
        let api = StubApi::default();
        *api.teams.lock().unwrap() = league_fixture();
        let config = RefreshConfig::default();

        refresh_teams(&mut db, &api, &config).await.unwrap();
        let calls_after_seed = api.calls.load(Ordering::SeqCst);

        refresh_teams(&mut db, &api, &config).await.unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), calls_after_seed);
    }

    async fn seeded_team(db: &mut StatsDatabase, api: &StubApi) -> Team {
        *api.teams.lock().unwrap() = league_fixture();
        let teams = refresh_teams(db, api, &RefreshConfig::default())
            .await
            .unwrap();
        teams.into_iter().next().unwrap()
    }

    #[tokio::test]
    async fn aged_roster_is_refetched_and_reflects_upstream_changes() {
        let mut db = StatsDatabase::new_in_memory().unwrap();
        let api = StubApi::default();
        let team = seeded_team(&mut db, &api).await;
        let season = Season::new(2025);
        let config = RefreshConfig::default();

        *api.roster.lock().unwrap() = roster_fixture();
        let roster = refresh_roster(&mut db, &api, &config, &team, season)
            .await
            .unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].sweater_number, Some(97));

        // Age the stored player past the threshold, then change upstream.
        let aged = Utc::now() - config.roster_max_age - Duration::minutes(1);
        db.upsert_player(&player_upsert(&api.roster.lock().unwrap()[0], Some(team.id)), aged)
            .unwrap();
        api.roster.lock().unwrap()[0].sweater_number = Some(29);

        let roster = refresh_roster(&mut db, &api, &config, &team, season)
            .await
            .unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].sweater_number, Some(29));
        assert_eq!(db.count(Table::Players).unwrap(), 1);
        assert_eq!(db.count(Table::PlayerTeamSeasons).unwrap(), 1);
    }

    #[tokio::test]
    async fn fresh_roster_is_served_without_an_upstream_call() {
        let mut db = StatsDatabase::new_in_memory().unwrap();
        let api = StubApi::default();
        let team = seeded_team(&mut db, &api).await;
        let season = Season::new(2025);
        let config = RefreshConfig::default();

        *api.roster.lock().unwrap() = roster_fixture();
        refresh_roster(&mut db, &api, &config, &team, season)
            .await
            .unwrap();
        let calls = api.calls.load(Ordering::SeqCst);

        refresh_roster(&mut db, &api, &config, &team, season)
            .await
            .unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn game_stats_are_fetched_only_while_empty() {
        let mut db = StatsDatabase::new_in_memory().unwrap();
        let api = StubApi::default();
        let player = PlayerId::new(8478402);
        let season = Season::new(2025);

        *api.game_log.lock().unwrap() = game_log_fixture(2);
        let stats = refresh_game_log(&mut db, &api, player, season).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].goals, 2);
        assert!(stats[0].home_game);

        // Upstream changes are ignored once stats are mirrored.
        *api.game_log.lock().unwrap() = game_log_fixture(5);
        let calls = api.calls.load(Ordering::SeqCst);
        let stats = refresh_game_log(&mut db, &api, player, season).await.unwrap();
        assert_eq!(stats[0].goals, 2);
        assert_eq!(api.calls.load(Ordering::SeqCst), calls);
    }
}
