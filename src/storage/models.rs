//! Data models for the storage layer.
//!
//! Read models carry the `last_updated` timestamp the staleness policy keys
//! on; upsert models carry exactly the fields a refresh writes, with the
//! timestamp supplied by the caller.

use crate::staleness::Timestamped;
use crate::types::{PlayerId, Season, TeamId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A team row joined with its conference and division names.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub abbr: String,
    pub common_name: String,
    pub name: String,
    pub logo: Option<String>,
    pub conference_id: i64,
    pub conference_name: String,
    pub division_id: i64,
    pub division_name: String,
    pub last_updated: DateTime<Utc>,
}

/// Fields written when mirroring one upstream team record.
#[derive(Debug, Clone)]
pub struct TeamUpsert {
    pub id: TeamId,
    pub abbr: String,
    pub common_name: String,
    pub name: String,
    pub logo: Option<String>,
    pub conference_id: i64,
    pub division_id: i64,
}

/// A player's biographical row.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub birth_city: Option<String>,
    pub birth_country: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_state_province: Option<String>,
    pub headshot: Option<String>,
    pub height_in_inches: Option<i64>,
    pub height_in_centimeters: Option<i64>,
    pub weight_in_pounds: Option<i64>,
    pub weight_in_kilograms: Option<i64>,
    pub position_code: Option<String>,
    pub shoots_catches: Option<String>,
    pub sweater_number: Option<i64>,
    pub team_id: Option<TeamId>,
    pub last_updated: DateTime<Utc>,
}

/// Fields written when mirroring one upstream roster record.
#[derive(Debug, Clone)]
pub struct PlayerUpsert {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub birth_city: Option<String>,
    pub birth_country: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_state_province: Option<String>,
    pub headshot: Option<String>,
    pub height_in_inches: Option<i64>,
    pub height_in_centimeters: Option<i64>,
    pub weight_in_pounds: Option<i64>,
    pub weight_in_kilograms: Option<i64>,
    pub position_code: Option<String>,
    pub shoots_catches: Option<String>,
    pub sweater_number: Option<i64>,
    pub team_id: Option<TeamId>,
}

/// One stint: a player on a team for one season.
#[derive(Debug, Clone, Serialize)]
pub struct TeamStint {
    pub team_id: TeamId,
    pub team_abbr: String,
    pub team_name: String,
    pub season: Season,
    pub sweater_number: Option<i64>,
    pub games_played: Option<i64>,
    pub last_updated: DateTime<Utc>,
}

/// Upsert key and fields for a (player, team, season) stint row.
#[derive(Debug, Clone)]
pub struct StintUpsert {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub season: Season,
    pub sweater_number: Option<i64>,
    pub games_played: Option<i64>,
}

/// A player plus every stint recorded for them.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerWithHistory {
    #[serde(flatten)]
    pub player: Player,
    pub team_history: Vec<TeamStint>,
}

/// One game's counting stats for a player.
#[derive(Debug, Clone, Serialize)]
pub struct GameStat {
    pub id: i64,
    pub player_id: PlayerId,
    pub game_id: i64,
    pub season: Season,
    pub game_date: Option<NaiveDate>,
    pub team_abbr: Option<String>,
    pub opponent_abbr: Option<String>,
    pub opponent_common_name: Option<String>,
    pub home_game: bool,
    pub goals: i64,
    pub assists: i64,
    pub points: i64,
    pub plus_minus: i64,
    pub power_play_goals: i64,
    pub power_play_points: i64,
    pub shorthanded_goals: i64,
    pub shorthanded_points: i64,
    pub game_winning_goal: bool,
    pub ot_goals: i64,
    pub shots: i64,
    pub shifts: i64,
    pub pim: i64,
    pub toi: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Fields written when mirroring one upstream game-log record. The row id is
/// derived, see [`stat_id`].
#[derive(Debug, Clone)]
pub struct GameStatUpsert {
    pub player_id: PlayerId,
    pub game_id: i64,
    pub season: Season,
    pub game_date: Option<NaiveDate>,
    pub team_abbr: Option<String>,
    pub opponent_abbr: Option<String>,
    pub opponent_common_name: Option<String>,
    pub home_game: bool,
    pub goals: i64,
    pub assists: i64,
    pub points: i64,
    pub plus_minus: i64,
    pub power_play_goals: i64,
    pub power_play_points: i64,
    pub shorthanded_goals: i64,
    pub shorthanded_points: i64,
    pub game_winning_goal: bool,
    pub ot_goals: i64,
    pub shots: i64,
    pub shifts: i64,
    pub pim: i64,
    pub toi: Option<String>,
}

/// Synthetic game-stat row id: the decimal digits of the game id followed by
/// the decimal digits of the player id. With 10-digit game ids and 7-digit
/// player ids this stays inside `i64`.
pub fn stat_id(game_id: i64, player_id: PlayerId) -> i64 {
    let mut shift = 10;
    while shift <= player_id.as_i64() {
        shift *= 10;
    }
    game_id * shift + player_id.as_i64()
}

impl Timestamped for Team {
    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

impl Timestamped for Player {
    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

impl Timestamped for TeamStint {
    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

impl Timestamped for GameStat {
    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}
