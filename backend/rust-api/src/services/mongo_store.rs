use anyhow::anyhow;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::ErrorKind,
    Collection, Database,
};

use crate::{
    models::{AttemptRecord, UserProfile},
    services::store::{AttemptQuery, AttemptStore, ProfileStore, StoreError},
    utils::time::chrono_to_bson,
};

// MongoDB "Unauthorized" command error.
const MONGO_UNAUTHORIZED: i32 = 13;

pub struct MongoProfileStore {
    collection: Collection<UserProfile>,
}

impl MongoProfileStore {
    pub fn new(mongo: &Database) -> Self {
        Self {
            collection: mongo.collection("users"),
        }
    }
}

#[async_trait]
impl ProfileStore for MongoProfileStore {
    async fn list_profiles(&self, limit: i64) -> Result<Vec<UserProfile>, StoreError> {
        let cursor = self
            .collection
            .find(Document::new())
            .limit(limit)
            .await
            .map_err(|e| map_mongo_err(e, "Failed to query users"))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| map_mongo_err(e, "Users cursor failure"))
    }

    async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| map_mongo_err(e, "Failed to load user profile"))
    }
}

pub struct MongoAttemptStore {
    collection: Collection<AttemptRecord>,
}

impl MongoAttemptStore {
    pub fn new(mongo: &Database) -> Self {
        Self {
            collection: mongo.collection("quiz_attempts"),
        }
    }
}

#[async_trait]
impl AttemptStore for MongoAttemptStore {
    async fn list_attempts(&self, query: AttemptQuery) -> Result<Vec<AttemptRecord>, StoreError> {
        let mut filter = Document::new();
        if let Some(quiz_id) = &query.quiz_id {
            filter.insert("quizId", quiz_id);
        }
        if let Some(user_id) = &query.user_id {
            filter.insert("userId", user_id);
        }
        if let Some(since) = query.since {
            filter.insert("dateTaken", doc! { "$gte": chrono_to_bson(since) });
        }

        let mut find = self.collection.find(filter);
        if let Some(limit) = query.limit {
            find = find.limit(limit);
        }

        let cursor = find
            .await
            .map_err(|e| map_mongo_err(e, "Failed to query quiz attempts"))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| map_mongo_err(e, "Quiz attempts cursor failure"))
    }
}

/// A denied server command becomes the recoverable `AccessDenied`; everything
/// else is an upstream failure.
fn map_mongo_err(err: mongodb::error::Error, context: &str) -> StoreError {
    if let ErrorKind::Command(command_err) = &*err.kind {
        if command_err.code == MONGO_UNAUTHORIZED {
            return StoreError::AccessDenied(command_err.message.clone());
        }
    }
    StoreError::Upstream(anyhow!("{}: {}", context, err))
}
