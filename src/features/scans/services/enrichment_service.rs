use std::sync::Arc;

use crate::features::scans::models::GeoTarget;
use crate::features::scans::services::ReverseGeocoder;
use crate::features::scans::store::ScanStore;

/// Outcome counters for one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    /// Lookups that produced a postal code or locality and were stored
    pub resolved: usize,
    /// Lookups that produced nothing
    pub unresolved: usize,
    /// Resolved, but the record was gone or the update failed
    pub update_failed: usize,
}

/// Attaches reverse-geocoded postal code and locality to freshly inserted scans
pub struct EnrichmentService {
    store: Arc<dyn ScanStore>,
    geocoder: Arc<dyn ReverseGeocoder>,
}

impl EnrichmentService {
    pub fn new(store: Arc<dyn ScanStore>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Resolve and store geo data for each target, one at a time, in order.
    /// Never fails: every problem is logged and counted.
    pub async fn enrich(&self, targets: &[GeoTarget]) -> EnrichmentSummary {
        let mut summary = EnrichmentSummary::default();

        for target in targets {
            let meta = self
                .geocoder
                .resolve(target.latitude, target.longitude)
                .await;

            if meta.is_empty() {
                tracing::debug!(scan_id = %target.id, "No geo data resolved");
                summary.unresolved += 1;
                continue;
            }

            match self
                .store
                .update_geo_meta(&target.id, meta.plz.as_deref(), meta.ort.as_deref())
                .await
            {
                Ok(0) => {
                    tracing::warn!(scan_id = %target.id, "Scan disappeared before geo update");
                    summary.update_failed += 1;
                }
                Ok(_) => {
                    tracing::debug!(
                        scan_id = %target.id,
                        plz = ?meta.plz,
                        ort = ?meta.ort,
                        "Scan enriched"
                    );
                    summary.resolved += 1;
                }
                Err(e) => {
                    tracing::warn!(scan_id = %target.id, "Failed to store geo data: {}", e);
                    summary.update_failed += 1;
                }
            }
        }

        summary
    }
}
