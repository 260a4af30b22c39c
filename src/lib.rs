//! # Pulse
//!
//! A one-shot, synchronous query facility over a heart-rate dataset stored in
//! a relational database. It answers two questions:
//!
//! - which users of a given gender, older than some age, averaged a heart rate
//!   above a threshold inside a time window (`query_users`);
//! - which were a user's ten highest hourly average heart rates inside a time
//!   window, in chronological order (`query_for_user`).
//!
//! `HealthQueries` is the entry point. It loads settings, installs logging,
//! connects, makes sure the tables exist, and then serves blocking calls.

use chrono::NaiveDateTime;
use configuration::{LogGuard, Settings};
use database::QueryEngine;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

pub use configuration::error::ConfigError;
pub use core_types::{HeartRateSample, TimeWindow, User, UserFilter};
pub use database::{DbError, QueryError};

/// Startup failures. Without a configured, reachable database no query can run.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Failed to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Blocking handle to the query engine.
///
/// Each call blocks the current thread until its single statement finishes.
/// There is no statement timeout: a hung database blocks the caller.
pub struct HealthQueries {
    // Dropped before the runtime so pooled connections close inside it.
    engine: QueryEngine,
    runtime: Runtime,
    _log_guard: Option<LogGuard>,
}

impl HealthQueries {
    /// Loads settings from `pulse.toml` and the environment, installs the log
    /// subscriber, and connects.
    pub fn bootstrap() -> Result<Self, BootstrapError> {
        let settings = configuration::load_settings()?;
        let log_guard = configuration::init_tracing(&settings.logging);
        tracing::info!("Starting the heart-rate query facility.");

        let mut queries = Self::connect(&settings)?;
        queries._log_guard = log_guard;
        Ok(queries)
    }

    /// Connects with explicit settings and materializes the schema.
    ///
    /// Does not touch the global log subscriber; callers that want logs
    /// install one themselves (see `configuration::init_tracing`).
    pub fn connect(settings: &Settings) -> Result<Self, BootstrapError> {
        settings.validate()?;

        // One worker keeps sqlx's background tasks (returning connections to
        // the pool) moving between blocking calls.
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let pool = runtime.block_on(async {
            let pool = database::connect(&settings.database).await?;
            database::materialize_schema(&pool).await?;
            Ok::<_, DbError>(pool)
        })?;
        tracing::info!(dialect = ?pool.dialect(), "Heart-rate query facility is ready.");

        Ok(Self {
            engine: QueryEngine::new(pool),
            runtime,
            _log_guard: None,
        })
    }

    /// Users older than `min_age` with the given gender whose average heart
    /// rate between `date_from` and `date_to` (inclusive) exceeds
    /// `min_avg_heart_rate`.
    pub fn query_users(
        &self,
        min_age: i32,
        gender: &str,
        min_avg_heart_rate: f64,
        date_from: NaiveDateTime,
        date_to: NaiveDateTime,
    ) -> Result<Vec<User>, QueryError> {
        let filter = UserFilter::new(min_age, gender, min_avg_heart_rate);
        self.query_users_matching(&filter, &TimeWindow::new(date_from, date_to))
    }

    /// Same as `query_users`, with the thresholds and window passed as structs.
    pub fn query_users_matching(
        &self,
        filter: &UserFilter,
        window: &TimeWindow,
    ) -> Result<Vec<User>, QueryError> {
        self.runtime.block_on(self.engine.query_users(filter, window))
    }

    /// The user's ten highest hourly average heart rates between `date_from`
    /// and `date_to` (inclusive), oldest hour first.
    pub fn query_for_user(
        &self,
        user_id: i32,
        date_from: NaiveDateTime,
        date_to: NaiveDateTime,
    ) -> Result<Vec<f64>, QueryError> {
        let window = TimeWindow::new(date_from, date_to);
        self.runtime.block_on(self.engine.query_for_user(user_id, &window))
    }

    /// Closes the connection pool gracefully.
    pub fn close(self) {
        self.runtime.block_on(self.engine.pool().close());
        tracing::info!("Heart-rate query facility closed.");
    }
}
