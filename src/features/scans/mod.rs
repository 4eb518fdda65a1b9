//! Scan synchronization: batch sync, enrichment with reverse geocoding,
//! listing and deletion.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/sync` | Idempotently store a batch of client scans |
//! | GET | `/api/scans` | List scans, newest first (`limit`, `offset`) |
//! | DELETE | `/api/scans/{id}` | Delete a scan |
//!
//! Newly stored scans that carry both coordinates are reverse geocoded
//! (postal code and locality), either inline or on [`workers::EnrichmentWorker`].

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod workers;

pub use services::{EnrichmentDispatch, EnrichmentService, GeocodingService, ScanService, SyncService};
pub use store::{PgScanStore, ScanStore};
pub use workers::EnrichmentWorker;
