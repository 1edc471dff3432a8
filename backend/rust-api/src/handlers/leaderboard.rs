use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    middlewares::identity::CallerIdentity,
    models::{GlobalLeaderboardView, QuizLeaderboardEntry, QuizLeaderboardView, TimeFilter},
    services::{store::StoreError, AppState},
};

pub(crate) async fn get_global_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<GlobalLeaderboardView>, ApiError> {
    let service = state.leaderboard_service();
    let view = service
        .global_leaderboard(&caller, query.time_filter)
        .await?;
    Ok(Json(view))
}

pub(crate) async fn get_quiz_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(quiz_id): Path<String>,
    Query(query): Query<QuizLeaderboardQuery>,
) -> Result<Json<QuizLeaderboardView>, ApiError> {
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(state.config.default_quiz_limit);

    let service = state.quiz_leaderboard_service();
    let view = service
        .quiz_leaderboard(&caller, &quiz_id, limit, query.time_filter)
        .await?;
    Ok(Json(view))
}

/// All of one user's attempts on one quiz. Whether the caller may see
/// another user's attempts is decided by the session layer in front of this
/// service, not here.
pub(crate) async fn get_user_attempts(
    State(state): State<Arc<AppState>>,
    Path((quiz_id, user_id)): Path<(String, String)>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<QuizLeaderboardEntry>>, ApiError> {
    let service = state.quiz_leaderboard_service();
    let attempts = service
        .user_attempts(&quiz_id, &user_id, query.time_filter)
        .await?;
    Ok(Json(attempts))
}

pub(crate) async fn get_user_rank(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(user_id): Path<String>,
) -> Result<Json<RankResponse>, ApiError> {
    let service = state.leaderboard_service();
    let rank = service.user_rank(&caller, &user_id).await?;
    Ok(Json(RankResponse { user_id, rank }))
}

pub(crate) async fn get_user_quiz_rank(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path((quiz_id, user_id)): Path<(String, String)>,
) -> Result<Json<QuizRankResponse>, ApiError> {
    let service = state.quiz_leaderboard_service();
    let rank = service.user_quiz_rank(&caller, &quiz_id, &user_id).await?;
    Ok(Json(QuizRankResponse {
        quiz_id,
        user_id,
        rank,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaderboardQuery {
    #[serde(default)]
    pub time_filter: TimeFilter,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizLeaderboardQuery {
    #[serde(default)]
    pub time_filter: TimeFilter,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankResponse {
    #[serde(rename = "userId")]
    user_id: String,
    rank: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizRankResponse {
    #[serde(rename = "quizId")]
    quiz_id: String,
    #[serde(rename = "userId")]
    user_id: String,
    rank: Option<u32>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthenticated,
    Forbidden(String),
    NotFound(String),
    BadGateway(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Reaches the handler only when the self-scoped fallback was
            // denied as well
            StoreError::AccessDenied(message) => ApiError::Forbidden(message),
            StoreError::NotFound(message) => ApiError::NotFound(message),
            StoreError::Unauthenticated => ApiError::Unauthenticated,
            StoreError::Upstream(source) => ApiError::BadGateway(source.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Unauthenticated".to_string())
            }
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
        };

        (status, Json(message)).into_response()
    }
}
