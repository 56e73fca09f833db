//! Upstream NHL web API adapter.
//!
//! The API is consumed through three logical operations behind [`UpstreamApi`]
//! so the refresh flow and its tests can swap the live client for a stub.
//! Calls are not retried; an upstream failure propagates to the caller.

pub mod http;
pub mod types;

use crate::error::Result;
use crate::types::{PlayerId, Season};
use async_trait::async_trait;
use types::{GameLogRecord, RosterPlayerRecord, TeamRecord};

pub use http::NhlClient;

/// The three upstream operations this service mirrors.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// All league teams with their nested conference/division objects.
    async fn list_teams(&self) -> Result<Vec<TeamRecord>>;

    /// A team's roster for one season, flattened across positions.
    async fn team_roster(&self, team_abbr: &str, season: Season)
        -> Result<Vec<RosterPlayerRecord>>;

    /// A player's regular-season game log for one season.
    async fn player_game_log(
        &self,
        player_id: PlayerId,
        season: Season,
    ) -> Result<Vec<GameLogRecord>>;

    /// Drop any memoized team-list response so the next [`UpstreamApi::list_teams`]
    /// hits the API. A no-op for implementations that do not memoize.
    async fn clear_team_cache(&self) {}
}
