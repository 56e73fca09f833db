//! Database connection and schema management

use crate::error::{NhlError, Result};
use dirs::data_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database connection manager for the mirrored NHL data
pub struct StatsDatabase {
    pub(crate) conn: Connection,
}

impl StatsDatabase {
    /// Open the database at its default location and ensure tables exist
    pub fn new() -> Result<Self> {
        Self::open(Self::database_path()?)
    }

    /// Open (or create) a database at an explicit path
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// In-memory database for tests
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Default path under the user data directory
    fn database_path() -> Result<PathBuf> {
        let data_dir = data_dir().ok_or_else(|| NhlError::Config {
            message: "could not determine user data directory".to_string(),
        })?;
        Ok(data_dir.join("puckstats").join("stats.db"))
    }

    /// Create tables and indexes if they do not exist yet
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS conferences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                abbr TEXT NOT NULL,
                name TEXT NOT NULL UNIQUE,
                last_updated TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS divisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                abbr TEXT NOT NULL,
                name TEXT NOT NULL UNIQUE,
                last_updated TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY,
                abbr TEXT NOT NULL,
                common_name TEXT NOT NULL,
                name TEXT NOT NULL,
                logo TEXT,
                conference_id INTEGER NOT NULL,
                division_id INTEGER NOT NULL,
                last_updated TEXT NOT NULL,
                FOREIGN KEY (conference_id) REFERENCES conferences(id),
                FOREIGN KEY (division_id) REFERENCES divisions(id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                birth_city TEXT,
                birth_country TEXT,
                birth_date TEXT,
                birth_state_province TEXT,
                headshot TEXT,
                height_in_inches INTEGER,
                height_in_centimeters INTEGER,
                weight_in_pounds INTEGER,
                weight_in_kilograms INTEGER,
                position_code TEXT,
                shoots_catches TEXT,
                sweater_number INTEGER,
                team_id INTEGER,
                last_updated TEXT NOT NULL,
                FOREIGN KEY (team_id) REFERENCES teams(id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS player_team_seasons (
                player_id INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                season TEXT NOT NULL,
                sweater_number INTEGER,
                games_played INTEGER,
                last_updated TEXT NOT NULL,
                PRIMARY KEY (player_id, team_id, season),
                FOREIGN KEY (player_id) REFERENCES players(id),
                FOREIGN KEY (team_id) REFERENCES teams(id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS game_stats (
                id INTEGER PRIMARY KEY,
                player_id INTEGER NOT NULL,
                game_id INTEGER NOT NULL,
                season TEXT NOT NULL,
                game_date TEXT,
                team_abbr TEXT,
                opponent_abbr TEXT,
                opponent_common_name TEXT,
                home_game INTEGER NOT NULL,
                goals INTEGER NOT NULL,
                assists INTEGER NOT NULL,
                points INTEGER NOT NULL,
                plus_minus INTEGER NOT NULL,
                power_play_goals INTEGER NOT NULL,
                power_play_points INTEGER NOT NULL,
                shorthanded_goals INTEGER NOT NULL,
                shorthanded_points INTEGER NOT NULL,
                game_winning_goal INTEGER NOT NULL,
                ot_goals INTEGER NOT NULL,
                shots INTEGER NOT NULL,
                shifts INTEGER NOT NULL,
                pim INTEGER NOT NULL,
                toi TEXT,
                last_updated TEXT NOT NULL,
                FOREIGN KEY (player_id) REFERENCES players(id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_stints_team_season
             ON player_team_seasons(team_id, season)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_game_stats_player_season
             ON game_stats(player_id, season)",
            [],
        )?;

        Ok(())
    }
}
