use std::sync::Arc;

use mongodb::Database;

use crate::config::Config;

pub mod leaderboard_service;
pub mod mongo_store;
pub mod quiz_leaderboard_service;
pub mod ranking;
pub mod store;

use leaderboard_service::LeaderboardService;
use mongo_store::{MongoAttemptStore, MongoProfileStore};
use quiz_leaderboard_service::QuizLeaderboardService;
use store::{AttemptStore, ProfileStore};

/// Shared application state: configuration plus the injected store
/// capabilities. The aggregators built from it hold no state of their own,
/// so concurrent requests never share anything mutable.
pub struct AppState {
    pub config: Config,
    pub profiles: Arc<dyn ProfileStore>,
    pub attempts: Arc<dyn AttemptStore>,
    /// Retained for the health check ping. `None` when the state was built
    /// over injected stores with no database behind them.
    pub mongo: Option<Database>,
}

impl AppState {
    pub fn new(config: Config, mongo_client: mongodb::Client) -> Self {
        let mongo: Database = mongo_client.database(&config.mongo_database);
        let profiles: Arc<dyn ProfileStore> = Arc::new(MongoProfileStore::new(&mongo));
        let attempts: Arc<dyn AttemptStore> = Arc::new(MongoAttemptStore::new(&mongo));
        Self {
            config,
            profiles,
            attempts,
            mongo: Some(mongo),
        }
    }

    /// Build state over arbitrary store implementations (tests inject
    /// in-memory stores here).
    pub fn with_stores(
        config: Config,
        profiles: Arc<dyn ProfileStore>,
        attempts: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            config,
            profiles,
            attempts,
            mongo: None,
        }
    }

    pub fn leaderboard_service(&self) -> LeaderboardService {
        LeaderboardService::new(
            self.profiles.clone(),
            self.attempts.clone(),
            self.config.fetch_limit,
        )
    }

    pub fn quiz_leaderboard_service(&self) -> QuizLeaderboardService {
        QuizLeaderboardService::new(
            self.profiles.clone(),
            self.attempts.clone(),
            self.config.fetch_limit,
        )
    }
}
