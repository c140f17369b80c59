//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::application::CompetitionSummary;

/// `POST /join` body. Missing fields are reported as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Competition to join.
    #[serde(default)]
    pub competition_id: Option<String>,
    /// Joining user.
    #[serde(default)]
    pub username: Option<String>,
}

/// `POST /join` response.
#[derive(Debug, Clone, Serialize)]
pub struct JoinResponse {
    /// Always `true`; failures use an error body.
    pub success: bool,
    /// Roster size after the join.
    pub participants: usize,
}

/// `POST /my-competitions` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyCompetitionsRequest {
    /// User to look up.
    #[serde(default)]
    pub username: Option<String>,
}

/// `POST /my-competitions` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyCompetitionsResponse {
    /// Competitions the user has joined.
    pub competition_ids: Vec<String>,
}

/// `GET /competitions` response.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitionsResponse {
    /// Every competition.
    pub competitions: Vec<CompetitionSummary>,
}
