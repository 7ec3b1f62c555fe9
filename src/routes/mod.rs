//! HTTP route gateway
//!
//! Assembles the subrouters into the application router. Individual
//! endpoints live in sibling modules; the binary only ever sees this
//! gateway.

use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::query::QueryEngine;

mod health;
mod readings;

/// Shared state handed to every route
pub type AppState = (Arc<QueryEngine>, Config);

/// Build the application router
pub fn router(engine: Arc<QueryEngine>, config: Config) -> Router {
    Router::new()
        .merge(readings::router())
        .merge(health::router())
        .with_state((engine, config))
}
