use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::db::DatabaseProxy;
use crate::mastery::MasteryEngine;
use crate::services::retention::RetentionClient;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    engine: Arc<MasteryEngine>,
    retention: RetentionClient,
    db_proxy: Option<Arc<DatabaseProxy>>,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: MasteryEngine,
        db_proxy: Option<Arc<DatabaseProxy>>,
    ) -> Self {
        let retention = RetentionClient::new(config.retention.clone());
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            engine: Arc::new(engine),
            retention,
            db_proxy,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &MasteryEngine {
        &self.engine
    }

    pub fn retention(&self) -> &RetentionClient {
        &self.retention
    }

    pub fn db_proxy(&self) -> Option<Arc<DatabaseProxy>> {
        self.db_proxy.clone()
    }
}
