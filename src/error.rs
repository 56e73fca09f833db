//! Error types for the NHL statistics mirror.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NhlError>;

#[derive(Error, Debug)]
pub enum NhlError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upstream API error: {message}")]
    Upstream { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("invalid season string: {season}")]
    InvalidSeason { season: String },

    #[error("failed to parse integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl NhlError {
    /// Not-found error for a lookup key, e.g. `NhlError::not_found("team 99")`.
    pub fn not_found(what: impl Into<String>) -> Self {
        NhlError::NotFound { what: what.into() }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        NhlError::Upstream {
            message: message.into(),
        }
    }
}
