pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod mastery;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::config::{DbConfig, DbConfigError};
use crate::db::operations::{PgCatalog, PgEventStore};
use crate::db::{DatabaseProxy, DbInitError};
use crate::mastery::MasteryEngine;
use crate::state::AppState;
use crate::store::MemoryStore;

/// Builds the application. With `DATABASE_URL` set the event log and
/// catalog live in Postgres; otherwise an in-memory store seeded with the
/// starter vocabulary is used.
pub async fn create_app(config: Config) -> Result<axum::Router, DbInitError> {
    let state = match DbConfig::from_env() {
        Ok(db_config) => {
            let proxy = DatabaseProxy::connect(db_config).await?;
            if seed::seeding_enabled() {
                if let Err(err) = seed::seed_vocabulary(&proxy).await {
                    tracing::warn!(error = %err, "starter vocabulary seed rolled back");
                }
            }
            let engine = MasteryEngine::new(
                config.mastery.clone(),
                Arc::new(PgEventStore::new(proxy.clone())),
                Arc::new(PgCatalog::new(proxy.clone())),
            );
            AppState::new(config, engine, Some(Arc::new(proxy)))
        }
        Err(DbConfigError::Missing { key }) => {
            tracing::warn!(key, "database not configured, using in-memory store");
            let store = Arc::new(MemoryStore::with_items(seed::starter_vocabulary()));
            memory_state(config, store)
        }
    };

    Ok(build_router(state))
}

/// State over a single [`MemoryStore`] serving as both log and catalog.
pub fn memory_state(config: Config, store: Arc<MemoryStore>) -> AppState {
    let engine = MasteryEngine::new(config.mastery.clone(), store.clone(), store);
    AppState::new(config, engine, None)
}

pub fn build_router(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
