use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{AttemptRecord, UserProfile};

/// Error taxonomy for the record and profile stores.
///
/// `AccessDenied` is the one recoverable variant: the aggregators react to it
/// with a single full-to-self-only fallback transition. `Unauthenticated` is
/// fatal and propagated untouched, `NotFound` turns into empty results at the
/// engine layer, and `Upstream` is surfaced after at most one reduced-scope
/// attempt.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("upstream store failure: {0}")]
    Upstream(anyhow::Error),
}

impl StoreError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StoreError::AccessDenied(_))
    }
}

/// Filter for attempt queries. All fields optional; the stores apply whatever
/// is set, and `limit` keeps every broad fetch bounded.
#[derive(Debug, Clone, Default)]
pub struct AttemptQuery {
    pub quiz_id: Option<String>,
    pub user_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl AttemptQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn for_quiz(quiz_id: impl Into<String>) -> Self {
        Self {
            quiz_id: Some(quiz_id.into()),
            ..Self::default()
        }
    }

    pub fn since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Read-only capability over user profiles. Access control lives behind this
/// trait, not in the engine.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list_profiles(&self, limit: i64) -> Result<Vec<UserProfile>, StoreError>;

    async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError>;
}

/// Read-only capability over quiz attempts.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn list_attempts(&self, query: AttemptQuery) -> Result<Vec<AttemptRecord>, StoreError>;
}
