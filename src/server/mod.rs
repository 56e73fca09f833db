//! HTTP surface: shared state, router, and error mapping.

pub mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::error;

use crate::error::NhlError;
use crate::nhl::UpstreamApi;
use crate::refresh::RefreshConfig;
use crate::storage::StatsDatabase;

/// State shared by every request handler.
///
/// The database sits behind an async mutex; a refresh holds it across its
/// upstream fetch, so two requests that both observe stale data run their
/// fetch-and-upsert cycles one after the other.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<StatsDatabase>>,
    pub api: Arc<dyn UpstreamApi>,
    pub refresh: RefreshConfig,
}

impl AppState {
    pub fn new(db: StatsDatabase, api: Arc<dyn UpstreamApi>, refresh: RefreshConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            api,
            refresh,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/teams", get(handlers::list_teams))
        .route("/teams/id/:id", get(handlers::team_by_id))
        .route("/teams/name/:name", get(handlers::team_by_name))
        .route(
            "/teams/conference/id/:id",
            get(handlers::teams_by_conference_id),
        )
        .route(
            "/teams/conference/name/:name",
            get(handlers::teams_by_conference_name),
        )
        .route(
            "/teams/division/id/:id",
            get(handlers::teams_by_division_id),
        )
        .route(
            "/teams/division/name/:name",
            get(handlers::teams_by_division_name),
        )
        .route("/players/team/id/:id", get(handlers::roster_by_team_id))
        .route(
            "/players/team/name/:name",
            get(handlers::roster_by_team_name),
        )
        .route("/players/id/:id", get(handlers::player_by_id))
        .route("/stats/season/id/:id", get(handlers::stats_by_player_id))
        .route("/stats/season/name", get(handlers::stats_by_player_name))
        .with_state(state)
}

impl IntoResponse for NhlError {
    fn into_response(self) -> Response {
        let status = match &self {
            NhlError::NotFound { .. } => StatusCode::NOT_FOUND,
            NhlError::InvalidSeason { .. } | NhlError::ParseInt(_) => StatusCode::BAD_REQUEST,
            NhlError::Http(_) | NhlError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
