//! NHL Statistics Mirror
//!
//! A backend that mirrors a subset of the NHL web API into a local SQLite
//! database and serves it as JSON. Reads come from the store; a
//! staleness-driven refresh flow refetches from upstream when mirrored data
//! is missing or too old.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use puckstats::nhl::{NhlClient, UpstreamApi};
//! use puckstats::refresh::{refresh_teams, RefreshConfig};
//! use puckstats::storage::StatsDatabase;
//!
//! # async fn example() -> puckstats::Result<()> {
//! let mut db = StatsDatabase::new_in_memory()?;
//! let api: Arc<dyn UpstreamApi> = Arc::new(NhlClient::default());
//!
//! let teams = refresh_teams(&mut db, api.as_ref(), &RefreshConfig::default()).await?;
//! println!("{} teams mirrored", teams.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod nhl;
pub mod refresh;
pub mod server;
pub mod staleness;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{NhlError, Result};
pub use types::{PlayerId, Season, TeamId};
