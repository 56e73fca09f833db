//! Unit tests for storage functionality

use super::*;
use crate::types::{PlayerId, Season, TeamId};
use chrono::{Duration, NaiveDate, Utc};

fn create_test_db() -> StatsDatabase {
    StatsDatabase::new_in_memory().unwrap()
}

fn seed_groups(db: &mut StatsDatabase) -> (i64, i64) {
    let now = Utc::now();
    let conference_id = db.upsert_conference("E", "Eastern", now).unwrap();
    let division_id = db.upsert_division("A", "Atlantic", now).unwrap();
    (conference_id, division_id)
}

fn bruins(conference_id: i64, division_id: i64) -> TeamUpsert {
    TeamUpsert {
        id: TeamId::new(6),
        abbr: "BOS".to_string(),
        common_name: "Bruins".to_string(),
        name: "Boston Bruins".to_string(),
        logo: None,
        conference_id,
        division_id,
    }
}

fn test_player(id: i64, first: &str, last: &str, team_id: Option<TeamId>) -> PlayerUpsert {
    PlayerUpsert {
        id: PlayerId::new(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        birth_city: None,
        birth_country: Some("CAN".to_string()),
        birth_date: NaiveDate::from_ymd_opt(1997, 1, 13),
        birth_state_province: None,
        headshot: None,
        height_in_inches: Some(73),
        height_in_centimeters: Some(185),
        weight_in_pounds: Some(194),
        weight_in_kilograms: Some(88),
        position_code: Some("C".to_string()),
        shoots_catches: Some("L".to_string()),
        sweater_number: Some(97),
        team_id,
    }
}

#[test]
fn test_database_creation() {
    let _db = create_test_db();
}

#[test]
fn test_upsert_conference_deduplicates_by_name() {
    let mut db = create_test_db();
    let now = Utc::now();

    let first = db.upsert_conference("E", "Eastern", now).unwrap();
    let second = db.upsert_conference("EAS", "Eastern", now).unwrap();

    assert_eq!(first, second);
    assert_eq!(db.count(Table::Conferences).unwrap(), 1);
}

#[test]
fn test_upsert_team_and_lookup_by_id() {
    let mut db = create_test_db();
    let (conference_id, division_id) = seed_groups(&mut db);
    db.upsert_team(&bruins(conference_id, division_id), Utc::now())
        .unwrap();

    let team = db.team_by_id(TeamId::new(6)).unwrap().unwrap();
    assert_eq!(team.abbr, "BOS");
    assert_eq!(team.conference_name, "Eastern");
    assert_eq!(team.division_name, "Atlantic");

    assert!(db.team_by_id(TeamId::new(99)).unwrap().is_none());
}

#[test]
fn test_team_name_lookup_is_case_insensitive() {
    let mut db = create_test_db();
    let (conference_id, division_id) = seed_groups(&mut db);
    db.upsert_team(&bruins(conference_id, division_id), Utc::now())
        .unwrap();

    for name in ["bruins", "BRUINS", "Boston Bruins", "bos"] {
        let team = db.team_by_name(name).unwrap();
        assert_eq!(team.unwrap().id, TeamId::new(6), "lookup key {name:?}");
    }
    assert!(db.team_by_name("Canadiens").unwrap().is_none());
}

#[test]
fn test_teams_by_conference_and_division() {
    let mut db = create_test_db();
    let now = Utc::now();
    let east = db.upsert_conference("E", "Eastern", now).unwrap();
    let west = db.upsert_conference("W", "Western", now).unwrap();
    let atlantic = db.upsert_division("A", "Atlantic", now).unwrap();
    let pacific = db.upsert_division("P", "Pacific", now).unwrap();

    db.upsert_team(&bruins(east, atlantic), now).unwrap();
    db.upsert_team(
        &TeamUpsert {
            id: TeamId::new(25),
            abbr: "EDM".to_string(),
            common_name: "Oilers".to_string(),
            name: "Edmonton Oilers".to_string(),
            logo: None,
            conference_id: west,
            division_id: pacific,
        },
        now,
    )
    .unwrap();

    let eastern = db.teams_by_conference_name("eastern").unwrap();
    assert_eq!(eastern.len(), 1);
    assert_eq!(eastern[0].abbr, "BOS");

    let pacific_teams = db.teams_by_division_id(pacific).unwrap();
    assert_eq!(pacific_teams.len(), 1);
    assert_eq!(pacific_teams[0].abbr, "EDM");

    assert!(db.teams_by_conference_name("Central").unwrap().is_empty());
}

#[test]
fn test_upsert_player_updates_in_place() {
    let mut db = create_test_db();
    let now = Utc::now();

    db.upsert_player(&test_player(97, "Connor", "McDavid", None), now)
        .unwrap();

    let mut updated = test_player(97, "Connor", "McDavid", None);
    updated.sweater_number = Some(29);
    db.upsert_player(&updated, now).unwrap();

    assert_eq!(db.count(Table::Players).unwrap(), 1);
    let player = db.player_by_id(PlayerId::new(97)).unwrap().unwrap();
    assert_eq!(player.sweater_number, Some(29));
}

#[test]
fn test_player_name_lookup_is_case_insensitive() {
    let mut db = create_test_db();
    db.upsert_player(&test_player(97, "Connor", "McDavid", None), Utc::now())
        .unwrap();

    let player = db.player_by_name("connor", "MCDAVID").unwrap().unwrap();
    assert_eq!(player.id, PlayerId::new(97));
    assert!(db.player_by_name("Leon", "Draisaitl").unwrap().is_none());
}

#[test]
fn test_roster_returns_only_the_requested_stint() {
    let mut db = create_test_db();
    let now = Utc::now();
    let (conference_id, division_id) = seed_groups(&mut db);
    db.upsert_team(&bruins(conference_id, division_id), now)
        .unwrap();

    let season = Season::new(2025);
    let other_season = Season::new(2024);
    db.upsert_player(&test_player(1, "A", "One", Some(TeamId::new(6))), now)
        .unwrap();
    db.upsert_player(&test_player(2, "B", "Two", Some(TeamId::new(6))), now)
        .unwrap();
    db.upsert_stint(
        &StintUpsert {
            player_id: PlayerId::new(1),
            team_id: TeamId::new(6),
            season,
            sweater_number: Some(11),
            games_played: None,
        },
        now,
    )
    .unwrap();
    db.upsert_stint(
        &StintUpsert {
            player_id: PlayerId::new(2),
            team_id: TeamId::new(6),
            season: other_season,
            sweater_number: Some(22),
            games_played: None,
        },
        now,
    )
    .unwrap();

    let roster = db.roster(TeamId::new(6), season).unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, PlayerId::new(1));
}

#[test]
fn test_stint_upsert_keeps_one_row_per_key() {
    let mut db = create_test_db();
    let now = Utc::now();
    let (conference_id, division_id) = seed_groups(&mut db);
    db.upsert_team(&bruins(conference_id, division_id), now)
        .unwrap();
    db.upsert_player(&test_player(1, "A", "One", Some(TeamId::new(6))), now)
        .unwrap();

    let stint = StintUpsert {
        player_id: PlayerId::new(1),
        team_id: TeamId::new(6),
        season: Season::new(2025),
        sweater_number: Some(11),
        games_played: None,
    };
    db.upsert_stint(&stint, now).unwrap();
    let mut renumbered = stint.clone();
    renumbered.sweater_number = Some(12);
    db.upsert_stint(&renumbered, now).unwrap();

    assert_eq!(db.count(Table::PlayerTeamSeasons).unwrap(), 1);
    let history = db.team_history(PlayerId::new(1)).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sweater_number, Some(12));
    assert_eq!(history[0].team_name, "Boston Bruins");
}

#[test]
fn test_game_stat_upsert_by_derived_id() {
    let mut db = create_test_db();
    let now = Utc::now();
    db.upsert_player(&test_player(8478402, "Connor", "McDavid", None), now)
        .unwrap();

    let season = Season::new(2025);
    let stat = GameStatUpsert {
        player_id: PlayerId::new(8478402),
        game_id: 2025020345,
        season,
        game_date: NaiveDate::from_ymd_opt(2025, 11, 20),
        team_abbr: Some("EDM".to_string()),
        opponent_abbr: Some("BOS".to_string()),
        opponent_common_name: Some("Bruins".to_string()),
        home_game: false,
        goals: 2,
        assists: 1,
        points: 3,
        plus_minus: 2,
        power_play_goals: 1,
        power_play_points: 2,
        shorthanded_goals: 0,
        shorthanded_points: 0,
        game_winning_goal: true,
        ot_goals: 0,
        shots: 6,
        shifts: 24,
        pim: 0,
        toi: Some("21:43".to_string()),
    };
    db.upsert_game_stat(&stat, now).unwrap();

    let mut corrected = stat.clone();
    corrected.assists = 2;
    corrected.points = 4;
    db.upsert_game_stat(&corrected, now).unwrap();

    let stats = db.game_stats(PlayerId::new(8478402), season).unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].id, stat_id(2025020345, PlayerId::new(8478402)));
    assert_eq!(stats[0].points, 4);
    assert!(stats[0].game_winning_goal);
    assert!(!stats[0].home_game);
}

#[test]
fn test_last_updated_round_trips_for_staleness() {
    let mut db = create_test_db();
    let written = Utc::now() - Duration::hours(5);
    db.upsert_player(&test_player(1, "A", "One", None), written)
        .unwrap();

    let player = db.player_by_id(PlayerId::new(1)).unwrap().unwrap();
    assert!((player.last_updated - written).num_seconds().abs() < 1);
    assert!(crate::staleness::is_stale(
        std::slice::from_ref(&player),
        Duration::hours(4)
    ));
    assert!(!crate::staleness::is_stale(
        std::slice::from_ref(&player),
        Duration::hours(6)
    ));
}
