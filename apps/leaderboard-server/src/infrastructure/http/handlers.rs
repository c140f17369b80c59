//! Competition HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::Utc;

use super::AppState;
use super::dto::{
    CompetitionsResponse, JoinRequest, JoinResponse, MyCompetitionsRequest,
    MyCompetitionsResponse,
};
use super::error::ApiError;
use crate::application::LeaderboardView;
use crate::domain::competition::StoreError;
use crate::infrastructure::metrics::{self, JoinResult};

/// `GET /competitions`
pub async fn list_competitions(State(state): State<Arc<AppState>>) -> Json<CompetitionsResponse> {
    Json(CompetitionsResponse {
        competitions: state.store.list_competitions(Utc::now()),
    })
}

/// `GET /competitions/{id}/leaderboard`
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Path(competition_id): Path<String>,
) -> Result<Json<LeaderboardView>, ApiError> {
    Ok(Json(state.store.leaderboard(&competition_id)?))
}

/// `POST /join`
pub async fn join(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<JoinResponse>, ApiError> {
    let Json(request) = payload?;
    let competition_id = request.competition_id.unwrap_or_default();
    let username = request.username.unwrap_or_default();

    let result = state.store.join(&competition_id, &username).await;
    metrics::record_join(JoinResult::of(&result));
    let outcome = result?;

    Ok(Json(JoinResponse {
        success: true,
        participants: outcome.participants,
    }))
}

/// `POST /my-competitions`
pub async fn my_competitions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MyCompetitionsRequest>, JsonRejection>,
) -> Result<Json<MyCompetitionsResponse>, ApiError> {
    let Json(request) = payload?;
    let username = request
        .username
        .filter(|u| !u.trim().is_empty())
        .ok_or(StoreError::Validation { field: "username" })?;

    Ok(Json(MyCompetitionsResponse {
        competition_ids: state.store.joined_competition_ids(&username),
    }))
}
