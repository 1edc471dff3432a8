#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use quizhub_api::{
    config::Config,
    middlewares::identity::CallerIdentity,
    models::{AccountStatus, AttemptRecord, UserProfile, UserRole},
    services::{
        store::{AttemptQuery, AttemptStore, ProfileStore, StoreError},
        AppState,
    },
    create_router,
};

/// Profile store over a fixed vector. `deny_list` simulates a caller whose
/// permission scope does not cover the broad user listing.
pub struct InMemoryProfileStore {
    profiles: Vec<UserProfile>,
    deny_list: bool,
}

impl InMemoryProfileStore {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles,
            deny_list: false,
        }
    }

    pub fn denying_list(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles,
            deny_list: true,
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn list_profiles(&self, limit: i64) -> Result<Vec<UserProfile>, StoreError> {
        if self.deny_list {
            return Err(StoreError::AccessDenied(
                "caller may not list user profiles".to_string(),
            ));
        }
        Ok(self
            .profiles
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profiles.iter().find(|p| p.id == id).cloned())
    }
}

/// Attempt store over a fixed vector. `deny_broad` rejects any query that is
/// not scoped to a single user, the way a permission-checked store would.
/// `deny_all` rejects everything, including self-scoped retries.
pub struct InMemoryAttemptStore {
    attempts: Vec<AttemptRecord>,
    deny_broad: bool,
    deny_all: bool,
}

impl InMemoryAttemptStore {
    pub fn new(attempts: Vec<AttemptRecord>) -> Self {
        Self {
            attempts,
            deny_broad: false,
            deny_all: false,
        }
    }

    pub fn denying_broad(attempts: Vec<AttemptRecord>) -> Self {
        Self {
            attempts,
            deny_broad: true,
            deny_all: false,
        }
    }

    pub fn denying_all() -> Self {
        Self {
            attempts: Vec::new(),
            deny_broad: true,
            deny_all: true,
        }
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn list_attempts(&self, query: AttemptQuery) -> Result<Vec<AttemptRecord>, StoreError> {
        if self.deny_all || (self.deny_broad && query.user_id.is_none()) {
            return Err(StoreError::AccessDenied(
                "caller may not query other users' attempts".to_string(),
            ));
        }

        let limit = query.limit.unwrap_or(i64::MAX) as usize;
        Ok(self
            .attempts
            .iter()
            .filter(|a| query.quiz_id.as_deref().is_none_or(|q| a.quiz_id == q))
            .filter(|a| query.user_id.as_deref().is_none_or(|u| a.user_id == u))
            .filter(|a| query.since.is_none_or(|since| a.date_taken >= since))
            .take(limit)
            .cloned()
            .collect())
    }
}

pub fn user(id: &str, nickname: Option<&str>) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        display_name: format!("{} Display", id),
        photo_url: None,
        email: format!("{}@test.com", id),
        role: UserRole::User,
        status: AccountStatus::Active,
        nickname: nickname.map(String::from),
        leaderboard_enabled: None,
    }
}

pub fn admin(id: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        display_name: format!("{} Admin", id),
        photo_url: None,
        email: format!("{}@test.com", id),
        role: UserRole::Admin,
        status: AccountStatus::Active,
        nickname: None,
        leaderboard_enabled: None,
    }
}

/// Fixed per-process "now" so that fixtures built at different moments still
/// form byte-identical snapshots.
static BASE_NOW: LazyLock<chrono::DateTime<Utc>> = LazyLock::new(Utc::now);

pub fn attempt(user_id: &str, quiz_id: &str, pct: f64, time: f64, days_ago: i64) -> AttemptRecord {
    AttemptRecord {
        user_id: user_id.to_string(),
        quiz_id: quiz_id.to_string(),
        score: pct,
        max_score: 100.0,
        percentage_score: Some(pct),
        time_taken: Some(time),
        date_taken: *BASE_NOW - Duration::days(days_ago),
    }
}

pub fn caller(user_id: &str) -> CallerIdentity {
    CallerIdentity {
        user_id: user_id.to_string(),
        role: UserRole::User,
    }
}

pub fn state(profiles: InMemoryProfileStore, attempts: InMemoryAttemptStore) -> Arc<AppState> {
    Arc::new(AppState::with_stores(
        Config::for_tests(),
        Arc::new(profiles),
        Arc::new(attempts),
    ))
}

pub fn app(state: Arc<AppState>) -> Router {
    create_router(state)
}

/// GET a route as `user_id` and return status plus parsed JSON body.
pub async fn get_json(
    app: &Router,
    uri: &str,
    user_id: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("x-user-id", user_id);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
