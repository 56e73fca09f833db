//! Request handlers.
//!
//! Read handlers that can trigger a refresh do so before answering, so a
//! response never reflects data known to be stale. Lookup keys resolve
//! case-insensitively where they are names or abbreviations.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::error::{NhlError, Result};
use crate::refresh::{refresh_game_log, refresh_roster, refresh_teams};
use crate::storage::{GameStat, Player, PlayerWithHistory, Team};
use crate::types::{PlayerId, Season, TeamId};

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    season: Option<Season>,
}

impl SeasonQuery {
    fn season_or_current(&self) -> Season {
        self.season.unwrap_or_else(Season::current)
    }
}

#[derive(Debug, Deserialize)]
pub struct PlayerNameQuery {
    first_name: String,
    last_name: String,
    season: Option<Season>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>> {
    let mut db = state.db.lock().await;
    let teams = refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    Ok(Json(teams))
}

pub async fn team_by_id(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
) -> Result<Json<Team>> {
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    let team = db
        .team_by_id(id)?
        .ok_or_else(|| NhlError::not_found(format!("team {id}")))?;
    Ok(Json(team))
}

pub async fn team_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Team>> {
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    let team = db
        .team_by_name(&name)?
        .ok_or_else(|| NhlError::not_found(format!("team {name:?}")))?;
    Ok(Json(team))
}

pub async fn teams_by_conference_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Team>>> {
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    Ok(Json(db.teams_by_conference_id(id)?))
}

pub async fn teams_by_conference_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Team>>> {
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    Ok(Json(db.teams_by_conference_name(&name)?))
}

pub async fn teams_by_division_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Team>>> {
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    Ok(Json(db.teams_by_division_id(id)?))
}

pub async fn teams_by_division_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Team>>> {
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    Ok(Json(db.teams_by_division_name(&name)?))
}

pub async fn roster_by_team_id(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
    Query(query): Query<SeasonQuery>,
) -> Result<Json<Vec<Player>>> {
    let season = query.season_or_current();
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    let team = db
        .team_by_id(id)?
        .ok_or_else(|| NhlError::not_found(format!("team {id}")))?;
    let roster = refresh_roster(&mut db, state.api.as_ref(), &state.refresh, &team, season).await?;
    Ok(Json(roster))
}

pub async fn roster_by_team_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<SeasonQuery>,
) -> Result<Json<Vec<Player>>> {
    let season = query.season_or_current();
    let mut db = state.db.lock().await;
    refresh_teams(&mut db, state.api.as_ref(), &state.refresh).await?;
    let team = db
        .team_by_name(&name)?
        .ok_or_else(|| NhlError::not_found(format!("team {name:?}")))?;
    let roster = refresh_roster(&mut db, state.api.as_ref(), &state.refresh, &team, season).await?;
    Ok(Json(roster))
}

pub async fn player_by_id(
    State(state): State<AppState>,
    Path(id): Path<PlayerId>,
) -> Result<Json<PlayerWithHistory>> {
    let db = state.db.lock().await;
    let player = db
        .player_by_id(id)?
        .ok_or_else(|| NhlError::not_found(format!("player {id}")))?;
    let team_history = db.team_history(id)?;
    Ok(Json(PlayerWithHistory {
        player,
        team_history,
    }))
}

pub async fn stats_by_player_id(
    State(state): State<AppState>,
    Path(id): Path<PlayerId>,
    Query(query): Query<SeasonQuery>,
) -> Result<Json<Vec<GameStat>>> {
    let season = query.season_or_current();
    let mut db = state.db.lock().await;
    db.player_by_id(id)?
        .ok_or_else(|| NhlError::not_found(format!("player {id}")))?;
    let stats = refresh_game_log(&mut db, state.api.as_ref(), id, season).await?;
    Ok(Json(stats))
}

pub async fn stats_by_player_name(
    State(state): State<AppState>,
    Query(query): Query<PlayerNameQuery>,
) -> Result<Json<Vec<GameStat>>> {
    let season = query.season.unwrap_or_else(Season::current);
    let mut db = state.db.lock().await;
    let player = db
        .player_by_name(&query.first_name, &query.last_name)?
        .ok_or_else(|| {
            NhlError::not_found(format!(
                "player {} {}",
                query.first_name, query.last_name
            ))
        })?;
    let stats = refresh_game_log(&mut db, state.api.as_ref(), player.id, season).await?;
    Ok(Json(stats))
}
