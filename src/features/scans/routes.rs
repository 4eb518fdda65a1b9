//! Scan routes

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::scans::handlers::{self, ScanState};
use crate::features::scans::services::{ScanService, SyncService};

/// Create routes for the scans feature
///
/// All routes are public; the service has no authentication model.
pub fn routes(sync_service: Arc<SyncService>, scan_service: Arc<ScanService>) -> Router {
    let state = ScanState {
        sync_service,
        scan_service,
    };

    Router::new()
        .route("/api/sync", post(handlers::sync_scans))
        .route("/api/scans", get(handlers::list_scans))
        .route("/api/scans/{id}", delete(handlers::delete_scan))
        .with_state(state)
}
