use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::health::handlers;
use crate::features::scans::store::ScanStore;

pub fn routes(store: Arc<dyn ScanStore>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .with_state(store)
}
