//! Live HTTP client for the NHL web APIs.

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::types::{PlayerId, Season};

use super::types::{
    parse_records, GameLogRecord, GameLogResponse, RosterPlayerRecord, RosterResponse, TeamRecord,
};
use super::UpstreamApi;

/// Default base URL for the NHL web API.
pub const NHL_WEB_BASE_URL: &str = "https://api-web.nhle.com/v1";

/// Game-type discriminator for regular-season games in the game-log endpoint.
const REGULAR_SEASON: u8 = 2;

/// HTTP client with a memo of the last team-list response.
///
/// The memo is not a cache: it has no TTL or bound, and it is cleared
/// explicitly by the refresh flow before a stale refetch.
pub struct NhlClient {
    client: Client,
    base_url: String,
    team_list: Mutex<Option<Vec<TeamRecord>>>,
}

impl NhlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            team_list: Mutex::new(None),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(%url, "upstream request");
        let res = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(res)
    }
}

impl Default for NhlClient {
    fn default() -> Self {
        Self::new(NHL_WEB_BASE_URL)
    }
}

#[async_trait::async_trait]
impl UpstreamApi for NhlClient {
    async fn list_teams(&self) -> Result<Vec<TeamRecord>> {
        let mut memo = self.team_list.lock().await;
        if let Some(teams) = memo.as_ref() {
            return Ok(teams.clone());
        }

        let url = format!("{}/teams", self.base_url);
        let body = self.get_json(&url).await?;
        let raw = match body.get("teams").and_then(Value::as_array) {
            Some(teams) => teams.clone(),
            None => Vec::new(),
        };
        let teams: Vec<TeamRecord> = parse_records(raw, "team");

        *memo = Some(teams.clone());
        Ok(teams)
    }

    async fn team_roster(
        &self,
        team_abbr: &str,
        season: Season,
    ) -> Result<Vec<RosterPlayerRecord>> {
        let url = format!("{}/roster/{}/{}", self.base_url, team_abbr, season);
        let body = self.get_json(&url).await?;
        let roster: RosterResponse = serde_json::from_value(body)?;
        Ok(parse_records(roster.into_flattened(), "roster player"))
    }

    async fn player_game_log(
        &self,
        player_id: PlayerId,
        season: Season,
    ) -> Result<Vec<GameLogRecord>> {
        let url = format!(
            "{}/player/{}/game-log/{}/{}",
            self.base_url, player_id, season, REGULAR_SEASON
        );
        let body = self.get_json(&url).await?;
        let log: GameLogResponse = serde_json::from_value(body)?;
        Ok(parse_records(log.game_log, "game log entry"))
    }

    async fn clear_team_cache(&self) {
        *self.team_list.lock().await = None;
    }
}
