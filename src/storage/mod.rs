//! Storage layer for the mirrored NHL data
//!
//! A thin abstraction over the SQLite database:
//! - `models`: Row and upsert data structures
//! - `schema`: Database connection and schema management
//! - `queries`: Upserts and read queries

pub mod models;
pub mod queries;
pub mod schema;

#[cfg(test)]
mod tests;

pub use models::*;
pub use queries::Table;
pub use schema::StatsDatabase;
