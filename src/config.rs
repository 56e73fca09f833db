//! CLI argument definitions and environment-backed defaults.

use crate::nhl::http::NHL_WEB_BASE_URL;
use crate::refresh::RefreshConfig;
use chrono::Duration;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const UPSTREAM_URL_ENV_VAR: &str = "NHL_API_BASE_URL";

#[derive(Debug, Parser)]
#[clap(name = "puckstats", about = "NHL statistics mirror server")]
pub struct Cli {
    /// Address to serve on.
    #[clap(long, short, default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// SQLite database file (defaults to a file under the user data directory).
    #[clap(long, short)]
    pub database: Option<PathBuf>,

    /// Upstream API base URL (or set `NHL_API_BASE_URL` env var).
    #[clap(long)]
    pub upstream_url: Option<String>,

    /// Hours before the mirrored team list is refetched.
    #[clap(long, default_value_t = 24)]
    pub team_max_age_hours: i64,

    /// Hours before a mirrored roster is refetched.
    #[clap(long, default_value_t = 4)]
    pub roster_max_age_hours: i64,
}

impl Cli {
    /// CLI argument, then environment variable, then the public API default.
    pub fn resolve_upstream_url(&self) -> String {
        self.upstream_url
            .clone()
            .or_else(|| std::env::var(UPSTREAM_URL_ENV_VAR).ok())
            .unwrap_or_else(|| NHL_WEB_BASE_URL.to_string())
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            team_max_age: Duration::hours(self.team_max_age_hours),
            roster_max_age: Duration::hours(self.roster_max_age_hours),
        }
    }
}
