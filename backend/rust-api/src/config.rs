use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub bind_addr: String,
    /// Upper bound applied to every broad store fetch.
    pub fetch_limit: i64,
    /// Result-count limit for quiz leaderboards when the caller sends none.
    pub default_quiz_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017/quizhub".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "quizhub".to_string());

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let fetch_limit = settings
            .get_int("leaderboard.fetch_limit")
            .ok()
            .or_else(|| env::var("FETCH_LIMIT").ok().and_then(|v| v.parse().ok()))
            .filter(|v| *v > 0)
            .unwrap_or(1000);

        let default_quiz_limit = settings
            .get_int("leaderboard.default_quiz_limit")
            .ok()
            .or_else(|| {
                env::var("DEFAULT_QUIZ_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .filter(|v| *v > 0)
            .map(|v| v as usize)
            .unwrap_or(10);

        Ok(Config {
            mongo_uri,
            mongo_database,
            bind_addr,
            fetch_limit,
            default_quiz_limit,
        })
    }

    /// Fixed defaults without touching the environment; used by tests.
    pub fn for_tests() -> Self {
        Config {
            mongo_uri: "mongodb://localhost:27017/quizhub-test".to_string(),
            mongo_database: "quizhub-test".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            fetch_limit: 1000,
            default_quiz_limit: 10,
        }
    }
}
