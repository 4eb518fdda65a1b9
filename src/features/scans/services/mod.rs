mod enrichment_service;
mod geocoding_service;
mod scan_service;
mod sync_service;

pub use enrichment_service::EnrichmentService;
pub use geocoding_service::{GeocodingService, ReverseGeocoder};
pub use scan_service::ScanService;
pub use sync_service::{EnrichmentDispatch, SyncService};
