//! Core identifier and season types shared across the crate.

use crate::error::{NhlError, Result};
use chrono::{Datelike, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for NHL franchise (team) IDs.
///
/// # Examples
///
/// ```rust
/// use puckstats::TeamId;
///
/// let team_id = TeamId::new(6);
/// assert_eq!(team_id.as_i64(), 6);
/// assert_eq!(team_id.to_string(), "6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl TeamId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TeamId {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

impl ToSql for TeamId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for TeamId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// Type-safe wrapper for NHL player IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i64);

impl PlayerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

impl ToSql for PlayerId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for PlayerId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// An NHL season, identified by its starting calendar year.
///
/// Rendered as the two concatenated years of the span, e.g. the 2025–2026
/// season is `"20252026"`. January through April belong to the season that
/// started the previous calendar year.
///
/// # Examples
///
/// ```rust
/// use puckstats::Season;
///
/// let season: Season = "20252026".parse().unwrap();
/// assert_eq!(season.start_year(), 2025);
/// assert_eq!(season.to_string(), "20252026");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season(u16);

impl Season {
    pub fn new(start_year: u16) -> Self {
        Self(start_year)
    }

    pub fn start_year(&self) -> u16 {
        self.0
    }

    pub fn end_year(&self) -> u16 {
        self.0 + 1
    }

    /// The season a given date falls in: Jan–Apr map to the season that
    /// started the previous year, May–Dec start a new season.
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year() as u16;
        if date.month() <= 4 {
            Self(year - 1)
        } else {
            Self(year)
        }
    }

    /// The season of the current wall-clock date.
    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.0 + 1)
    }
}

impl FromStr for Season {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || NhlError::InvalidSeason {
            season: s.to_string(),
        };

        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let start: u16 = s[..4].parse().map_err(|_| invalid())?;
        let end: u16 = s[4..].parse().map_err(|_| invalid())?;
        if end != start + 1 {
            return Err(invalid());
        }
        Ok(Self(start))
    }
}

impl TryFrom<String> for Season {
    type Error = NhlError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.to_string()
    }
}

impl ToSql for Season {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Season {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: NhlError| FromSqlError::Other(Box::new(e)))
    }
}
