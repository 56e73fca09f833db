//! Typed views of the upstream API's field-tagged records.
//!
//! The upstream schema is an external contract: team records use snake_case
//! keys, roster and game-log records use camelCase with `{"default": ...}`
//! wrappers around localized strings. Only the fields this service mirrors
//! are modeled; everything else is ignored on deserialization.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Upstream localized string, e.g. `{"default": "Bruins"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedString {
    pub default: String,
}

/// Conference or division object nested inside a team record.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    pub abbr: String,
    pub name: String,
}

/// One team from the upstream team list.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamRecord {
    pub franchise_id: i64,
    pub abbr: String,
    pub common_name: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub conference: GroupRecord,
    pub division: GroupRecord,
}

/// One player from a team's roster response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayerRecord {
    pub id: i64,
    pub first_name: LocalizedString,
    pub last_name: LocalizedString,
    #[serde(default)]
    pub birth_city: Option<LocalizedString>,
    #[serde(default)]
    pub birth_country: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Absent for players born outside countries with provinces/states.
    #[serde(default)]
    pub birth_state_province: Option<LocalizedString>,
    #[serde(default)]
    pub headshot: Option<String>,
    #[serde(default)]
    pub height_in_centimeters: Option<i64>,
    #[serde(default)]
    pub height_in_inches: Option<i64>,
    #[serde(default)]
    pub position_code: Option<String>,
    #[serde(default)]
    pub shoots_catches: Option<String>,
    #[serde(default)]
    pub sweater_number: Option<i64>,
    #[serde(default)]
    pub weight_in_kilograms: Option<i64>,
    #[serde(default)]
    pub weight_in_pounds: Option<i64>,
}

/// Roster response grouped by position; records stay raw until
/// [`parse_records`] so one malformed player cannot fail the whole roster.
#[derive(Debug, Deserialize)]
pub struct RosterResponse {
    #[serde(default)]
    pub forwards: Vec<Value>,
    #[serde(default)]
    pub defensemen: Vec<Value>,
    #[serde(default)]
    pub goalies: Vec<Value>,
}

impl RosterResponse {
    pub fn into_flattened(self) -> Vec<Value> {
        let mut all = self.forwards;
        all.extend(self.defensemen);
        all.extend(self.goalies);
        all
    }
}

/// One game from a player's game log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogRecord {
    pub game_id: i64,
    #[serde(default)]
    pub opponent_common_name: Option<LocalizedString>,
    #[serde(default)]
    pub opponent_abbrev: Option<String>,
    #[serde(default)]
    pub team_abbrev: Option<String>,
    /// `"H"` for home, `"R"` for road.
    #[serde(default)]
    pub home_road_flag: Option<String>,
    #[serde(default)]
    pub game_date: Option<NaiveDate>,
    #[serde(default)]
    pub goals: i64,
    #[serde(default)]
    pub assists: i64,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub plus_minus: i64,
    #[serde(default)]
    pub power_play_goals: i64,
    #[serde(default)]
    pub power_play_points: i64,
    #[serde(default)]
    pub game_winning_goals: i64,
    #[serde(default)]
    pub ot_goals: i64,
    #[serde(default)]
    pub shots: i64,
    #[serde(default)]
    pub shifts: i64,
    #[serde(default)]
    pub shorthanded_goals: i64,
    #[serde(default)]
    pub shorthanded_points: i64,
    #[serde(default)]
    pub pim: i64,
    #[serde(default)]
    pub toi: Option<String>,
}

impl GameLogRecord {
    pub fn is_home_game(&self) -> bool {
        self.home_road_flag.as_deref() != Some("R")
    }

    pub fn is_game_winning_goal(&self) -> bool {
        self.game_winning_goals > 0
    }
}

/// Top-level envelope of the game-log endpoint.
#[derive(Debug, Deserialize)]
pub struct GameLogResponse {
    #[serde(rename = "gameLog", default)]
    pub game_log: Vec<Value>,
}

/// Deserialize each record individually, logging and skipping malformed ones
/// instead of failing the whole response.
pub fn parse_records<T: DeserializeOwned>(values: Vec<Value>, what: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(kind = what, error = %e, "skipping malformed upstream record");
                None
            }
        })
        .collect()
}
