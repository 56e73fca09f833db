//! Query and upsert operations over the mirrored tables.
//!
//! All statements are parameterized. Upserts take the write timestamp as an
//! argument so refresh flows and tests control record ages; every upsert is a
//! single `INSERT ... ON CONFLICT ... DO UPDATE`, so concurrent refreshes
//! converge with last-writer-wins on mutable fields.

use super::models::*;
use super::schema::StatsDatabase;
use crate::error::Result;
use crate::types::{PlayerId, Season, TeamId};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

const TEAM_SELECT: &str = "SELECT t.id, t.abbr, t.common_name, t.name, t.logo,
            t.conference_id, c.name, t.division_id, d.name, t.last_updated
     FROM teams t
     JOIN conferences c ON t.conference_id = c.id
     JOIN divisions d ON t.division_id = d.id";

const PLAYER_SELECT: &str = "SELECT id, first_name, last_name, birth_city, birth_country, birth_date,
            birth_state_province, headshot, height_in_inches, height_in_centimeters,
            weight_in_pounds, weight_in_kilograms, position_code, shoots_catches,
            sweater_number, team_id, last_updated
     FROM players";

impl StatsDatabase {
    /// Insert or update a conference by name, returning its row id
    pub fn upsert_conference(&mut self, abbr: &str, name: &str, now: DateTime<Utc>) -> Result<i64> {
        let id = self.conn.query_row(
            "INSERT INTO conferences (abbr, name, last_updated)
             VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                abbr = excluded.abbr,
                last_updated = excluded.last_updated
             RETURNING id",
            params![abbr, name, now],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Insert or update a division by name, returning its row id
    pub fn upsert_division(&mut self, abbr: &str, name: &str, now: DateTime<Utc>) -> Result<i64> {
        let id = self.conn.query_row(
            "INSERT INTO divisions (abbr, name, last_updated)
             VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                abbr = excluded.abbr,
                last_updated = excluded.last_updated
             RETURNING id",
            params![abbr, name, now],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Insert or update a team by its upstream franchise id
    pub fn upsert_team(&mut self, team: &TeamUpsert, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO teams
                (id, abbr, common_name, name, logo, conference_id, division_id, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                abbr = excluded.abbr,
                common_name = excluded.common_name,
                name = excluded.name,
                logo = excluded.logo,
                conference_id = excluded.conference_id,
                division_id = excluded.division_id,
                last_updated = excluded.last_updated",
            params![
                team.id,
                team.abbr,
                team.common_name,
                team.name,
                team.logo,
                team.conference_id,
                team.division_id,
                now
            ],
        )?;
        Ok(())
    }

    /// Insert or update a player by their upstream id
    pub fn upsert_player(&mut self, player: &PlayerUpsert, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO players
                (id, first_name, last_name, birth_city, birth_country, birth_date,
                 birth_state_province, headshot, height_in_inches, height_in_centimeters,
                 weight_in_pounds, weight_in_kilograms, position_code, shoots_catches,
                 sweater_number, team_id, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                birth_city = excluded.birth_city,
                birth_country = excluded.birth_country,
                birth_date = excluded.birth_date,
                birth_state_province = excluded.birth_state_province,
                headshot = excluded.headshot,
                height_in_inches = excluded.height_in_inches,
                height_in_centimeters = excluded.height_in_centimeters,
                weight_in_pounds = excluded.weight_in_pounds,
                weight_in_kilograms = excluded.weight_in_kilograms,
                position_code = excluded.position_code,
                shoots_catches = excluded.shoots_catches,
                sweater_number = excluded.sweater_number,
                team_id = excluded.team_id,
                last_updated = excluded.last_updated",
            params![
                player.id,
                player.first_name,
                player.last_name,
                player.birth_city,
                player.birth_country,
                player.birth_date,
                player.birth_state_province,
                player.headshot,
                player.height_in_inches,
                player.height_in_centimeters,
                player.weight_in_pounds,
                player.weight_in_kilograms,
                player.position_code,
                player.shoots_catches,
                player.sweater_number,
                player.team_id,
                now
            ],
        )?;
        Ok(())
    }

    /// Insert or update a (player, team, season) stint row
    pub fn upsert_stint(&mut self, stint: &StintUpsert, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO player_team_seasons
                (player_id, team_id, season, sweater_number, games_played, last_updated)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(player_id, team_id, season) DO UPDATE SET
                sweater_number = excluded.sweater_number,
                games_played = excluded.games_played,
                last_updated = excluded.last_updated",
            params![
                stint.player_id,
                stint.team_id,
                stint.season,
                stint.sweater_number,
                stint.games_played,
                now
            ],
        )?;
        Ok(())
    }

    /// Insert or update one game's stats by the derived row id
    pub fn upsert_game_stat(&mut self, stat: &GameStatUpsert, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO game_stats
                (id, player_id, game_id, season, game_date, team_abbr, opponent_abbr,
                 opponent_common_name, home_game, goals, assists, points, plus_minus,
                 power_play_goals, power_play_points, shorthanded_goals, shorthanded_points,
                 game_winning_goal, ot_goals, shots, shifts, pim, toi, last_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                game_date = excluded.game_date,
                team_abbr = excluded.team_abbr,
                opponent_abbr = excluded.opponent_abbr,
                opponent_common_name = excluded.opponent_common_name,
                home_game = excluded.home_game,
                goals = excluded.goals,
                assists = excluded.assists,
                points = excluded.points,
                plus_minus = excluded.plus_minus,
                power_play_goals = excluded.power_play_goals,
                power_play_points = excluded.power_play_points,
                shorthanded_goals = excluded.shorthanded_goals,
                shorthanded_points = excluded.shorthanded_points,
                game_winning_goal = excluded.game_winning_goal,
                ot_goals = excluded.ot_goals,
                shots = excluded.shots,
                shifts = excluded.shifts,
                pim = excluded.pim,
                toi = excluded.toi,
                last_updated = excluded.last_updated",
            params![
                stat_id(stat.game_id, stat.player_id),
                stat.player_id,
                stat.game_id,
                stat.season,
                stat.game_date,
                stat.team_abbr,
                stat.opponent_abbr,
                stat.opponent_common_name,
                stat.home_game,
                stat.goals,
                stat.assists,
                stat.points,
                stat.plus_minus,
                stat.power_play_goals,
                stat.power_play_points,
                stat.shorthanded_goals,
                stat.shorthanded_points,
                stat.game_winning_goal,
                stat.ot_goals,
                stat.shots,
                stat.shifts,
                stat.pim,
                stat.toi,
                now
            ],
        )?;
        Ok(())
    }

    /// All teams, ordered by full name
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let query = format!("{TEAM_SELECT} ORDER BY t.name");
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map([], row_to_team)?;
        collect(rows)
    }

    /// Single team by franchise id
    pub fn team_by_id(&self, id: TeamId) -> Result<Option<Team>> {
        let query = format!("{TEAM_SELECT} WHERE t.id = ?");
        let mut stmt = self.conn.prepare(&query)?;
        optional(stmt.query_row(params![id], row_to_team))
    }

    /// Single team by full name, common name, or abbreviation, case-insensitive
    pub fn team_by_name(&self, name: &str) -> Result<Option<Team>> {
        let query = format!(
            "{TEAM_SELECT}
             WHERE LOWER(t.name) = LOWER(?1)
                OR LOWER(t.common_name) = LOWER(?1)
                OR LOWER(t.abbr) = LOWER(?1)"
        );
        let mut stmt = self.conn.prepare(&query)?;
        optional(stmt.query_row(params![name], row_to_team))
    }

    /// Teams in a conference by conference row id
    pub fn teams_by_conference_id(&self, id: i64) -> Result<Vec<Team>> {
        let query = format!("{TEAM_SELECT} WHERE t.conference_id = ? ORDER BY t.name");
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![id], row_to_team)?;
        collect(rows)
    }

    /// Teams in a conference by conference name or abbreviation, case-insensitive
    pub fn teams_by_conference_name(&self, name: &str) -> Result<Vec<Team>> {
        let query = format!(
            "{TEAM_SELECT}
             WHERE LOWER(c.name) = LOWER(?1) OR LOWER(c.abbr) = LOWER(?1)
             ORDER BY t.name"
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![name], row_to_team)?;
        collect(rows)
    }

    /// Teams in a division by division row id
    pub fn teams_by_division_id(&self, id: i64) -> Result<Vec<Team>> {
        let query = format!("{TEAM_SELECT} WHERE t.division_id = ? ORDER BY t.name");
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![id], row_to_team)?;
        collect(rows)
    }

    /// Teams in a division by division name or abbreviation, case-insensitive
    pub fn teams_by_division_name(&self, name: &str) -> Result<Vec<Team>> {
        let query = format!(
            "{TEAM_SELECT}
             WHERE LOWER(d.name) = LOWER(?1) OR LOWER(d.abbr) = LOWER(?1)
             ORDER BY t.name"
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![name], row_to_team)?;
        collect(rows)
    }

    /// Players with a stint on the given team in the given season
    pub fn roster(&self, team_id: TeamId, season: Season) -> Result<Vec<Player>> {
        let query = format!(
            "{PLAYER_SELECT}
             WHERE id IN (SELECT player_id FROM player_team_seasons
                          WHERE team_id = ? AND season = ?)
             ORDER BY last_name, first_name"
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![team_id, season], row_to_player)?;
        collect(rows)
    }

    /// Single player by upstream id
    pub fn player_by_id(&self, id: PlayerId) -> Result<Option<Player>> {
        let query = format!("{PLAYER_SELECT} WHERE id = ?");
        let mut stmt = self.conn.prepare(&query)?;
        optional(stmt.query_row(params![id], row_to_player))
    }

    /// Single player by first and last name, case-insensitive
    pub fn player_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<Player>> {
        let query = format!(
            "{PLAYER_SELECT}
             WHERE LOWER(first_name) = LOWER(?) AND LOWER(last_name) = LOWER(?)"
        );
        let mut stmt = self.conn.prepare(&query)?;
        optional(stmt.query_row(params![first_name, last_name], row_to_player))
    }

    /// Every stint recorded for a player, newest season first
    pub fn team_history(&self, player_id: PlayerId) -> Result<Vec<TeamStint>> {
        let mut stmt = self.conn.prepare(
            "SELECT pts.team_id, t.abbr, t.name, pts.season, pts.sweater_number,
                    pts.games_played, pts.last_updated
             FROM player_team_seasons pts
             JOIN teams t ON pts.team_id = t.id
             WHERE pts.player_id = ?
             ORDER BY pts.season DESC, t.name",
        )?;
        let rows = stmt.query_map(params![player_id], |row| {
            Ok(TeamStint {
                team_id: row.get(0)?,
                team_abbr: row.get(1)?,
                team_name: row.get(2)?,
                season: row.get(3)?,
                sweater_number: row.get(4)?,
                games_played: row.get(5)?,
                last_updated: row.get(6)?,
            })
        })?;
        collect(rows)
    }

    /// All of a player's game stats for a season, in game-date order
    pub fn game_stats(&self, player_id: PlayerId, season: Season) -> Result<Vec<GameStat>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, player_id, game_id, season, game_date, team_abbr, opponent_abbr,
                    opponent_common_name, home_game, goals, assists, points, plus_minus,
                    power_play_goals, power_play_points, shorthanded_goals, shorthanded_points,
                    game_winning_goal, ot_goals, shots, shifts, pim, toi, last_updated
             FROM game_stats
             WHERE player_id = ? AND season = ?
             ORDER BY game_date, game_id",
        )?;
        let rows = stmt.query_map(params![player_id, season], row_to_game_stat)?;
        collect(rows)
    }

    /// Row counts used by the startup seed check
    pub fn count(&self, table: Table) -> Result<i64> {
        let query = match table {
            Table::Conferences => "SELECT COUNT(*) FROM conferences",
            Table::Divisions => "SELECT COUNT(*) FROM divisions",
            Table::Teams => "SELECT COUNT(*) FROM teams",
            Table::Players => "SELECT COUNT(*) FROM players",
            Table::PlayerTeamSeasons => "SELECT COUNT(*) FROM player_team_seasons",
            Table::GameStats => "SELECT COUNT(*) FROM game_stats",
        };
        let count = self.conn.query_row(query, [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Table selector for [`StatsDatabase::count`]
#[derive(Debug, Clone, Copy)]
pub enum Table {
    Conferences,
    Divisions,
    Teams,
    Players,
    PlayerTeamSeasons,
    GameStats,
}

fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        abbr: row.get(1)?,
        common_name: row.get(2)?,
        name: row.get(3)?,
        logo: row.get(4)?,
        conference_id: row.get(5)?,
        conference_name: row.get(6)?,
        division_id: row.get(7)?,
        division_name: row.get(8)?,
        last_updated: row.get(9)?,
    })
}

fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birth_city: row.get(3)?,
        birth_country: row.get(4)?,
        birth_date: row.get(5)?,
        birth_state_province: row.get(6)?,
        headshot: row.get(7)?,
        height_in_inches: row.get(8)?,
        height_in_centimeters: row.get(9)?,
        weight_in_pounds: row.get(10)?,
        weight_in_kilograms: row.get(11)?,
        position_code: row.get(12)?,
        shoots_catches: row.get(13)?,
        sweater_number: row.get(14)?,
        team_id: row.get(15)?,
        last_updated: row.get(16)?,
    })
}

fn row_to_game_stat(row: &Row) -> rusqlite::Result<GameStat> {
    Ok(GameStat {
        id: row.get(0)?,
        player_id: row.get(1)?,
        game_id: row.get(2)?,
        season: row.get(3)?,
        game_date: row.get(4)?,
        team_abbr: row.get(5)?,
        opponent_abbr: row.get(6)?,
        opponent_common_name: row.get(7)?,
        home_game: row.get(8)?,
        goals: row.get(9)?,
        assists: row.get(10)?,
        points: row.get(11)?,
        plus_minus: row.get(12)?,
        power_play_goals: row.get(13)?,
        power_play_points: row.get(14)?,
        shorthanded_goals: row.get(15)?,
        shorthanded_points: row.get(16)?,
        game_winning_goal: row.get(17)?,
        ot_goals: row.get(18)?,
        shots: row.get(19)?,
        shifts: row.get(20)?,
        pim: row.get(21)?,
        toi: row.get(22)?,
        last_updated: row.get(23)?,
    })
}

fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}
