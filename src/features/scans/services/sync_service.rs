use std::sync::Arc;

use serde_json::Value;

use crate::core::error::Result;
use crate::core::extractor::ClientMeta;
use crate::features::scans::dtos::{ScanItemDto, SyncResponseDto};
use crate::features::scans::models::{GeoTarget, NewScan};
use crate::features::scans::services::EnrichmentService;
use crate::features::scans::store::ScanStore;
use crate::features::scans::workers::EnrichmentQueue;

/// How freshly inserted, geolocated scans reach the geocoder
#[derive(Clone)]
pub enum EnrichmentDispatch {
    /// Geocode before the sync call returns
    Inline(Arc<EnrichmentService>),
    /// Hand the batch to the background worker
    Deferred(EnrichmentQueue),
}

/// Result of one item of a sync batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Inserted,
    /// A record with this id already existed; nothing was written
    Duplicate,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    /// Position in the request
    pub index: usize,
    pub id: Option<String>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub items: Vec<ItemOutcome>,
    /// Records newly persisted (sum of affected rows)
    pub synced: u64,
    /// Scans handed to enrichment
    pub enrichment_targets: usize,
}

impl SyncOutcome {
    pub fn duplicates(&self) -> u64 {
        self.count(|s| matches!(s, ItemStatus::Duplicate))
    }

    pub fn failed(&self) -> u64 {
        self.count(|s| matches!(s, ItemStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&ItemStatus) -> bool) -> u64 {
        self.items.iter().filter(|i| predicate(&i.status)).count() as u64
    }

    pub fn message(&self) -> String {
        if self.items.is_empty() {
            "No scans to sync".to_string()
        } else {
            format!("{} scans synced", self.synced)
        }
    }
}

impl From<SyncOutcome> for SyncResponseDto {
    fn from(outcome: SyncOutcome) -> Self {
        Self {
            synced: outcome.synced,
            message: outcome.message(),
            duplicates: outcome.duplicates(),
            failed: outcome.failed(),
        }
    }
}

/// Reconciles a client batch with the store and triggers enrichment
pub struct SyncService {
    store: Arc<dyn ScanStore>,
    enrichment: EnrichmentDispatch,
}

impl SyncService {
    pub fn new(store: Arc<dyn ScanStore>, enrichment: EnrichmentDispatch) -> Self {
        Self { store, enrichment }
    }

    /// Insert every new scan of the batch, then geocode the new ones that
    /// carry both coordinates.
    ///
    /// Bad items are reported in the outcome and never abort the batch. Only
    /// an unreachable store fails the whole call.
    pub async fn sync(&self, scans: Vec<Value>, meta: &ClientMeta) -> Result<SyncOutcome> {
        if scans.is_empty() {
            return Ok(SyncOutcome::default());
        }

        let mut outcome = SyncOutcome {
            items: Vec::with_capacity(scans.len()),
            ..Default::default()
        };
        let mut targets = Vec::new();

        for (index, raw) in scans.into_iter().enumerate() {
            let raw_id = raw.get("id").and_then(Value::as_str).map(str::to_string);

            let scan = match decode_item(raw, meta) {
                Ok(scan) => scan,
                Err(reason) => {
                    tracing::warn!(index, id = ?raw_id, %reason, "Rejected malformed scan");
                    outcome.items.push(ItemOutcome {
                        index,
                        id: raw_id,
                        status: ItemStatus::Failed { reason },
                    });
                    continue;
                }
            };

            let status = match self.store.insert_if_absent(&scan).await {
                Ok(0) => ItemStatus::Duplicate,
                Ok(inserted) => {
                    outcome.synced += inserted;
                    if let Some(target) = GeoTarget::from_scan(&scan) {
                        targets.push(target);
                    }
                    ItemStatus::Inserted
                }
                Err(e) if e.is_store_unavailable() => {
                    tracing::error!(index, id = %scan.id, "Store unavailable during sync: {}", e);
                    // Scans inserted before the outage are duplicates on retry,
                    // so they must be geocoded now or never.
                    if !targets.is_empty() {
                        self.dispatch_enrichment(targets).await;
                    }
                    return Err(e);
                }
                Err(e) => {
                    let reason = e.to_string();
                    tracing::warn!(index, id = %scan.id, %reason, "Failed to insert scan");
                    ItemStatus::Failed { reason }
                }
            };

            outcome.items.push(ItemOutcome {
                index,
                id: Some(scan.id),
                status,
            });
        }

        tracing::info!(
            received = outcome.items.len(),
            synced = outcome.synced,
            duplicates = outcome.duplicates(),
            failed = outcome.failed(),
            geolocated = targets.len(),
            "Sync batch processed"
        );

        outcome.enrichment_targets = targets.len();
        if !targets.is_empty() {
            self.dispatch_enrichment(targets).await;
        }

        Ok(outcome)
    }

    async fn dispatch_enrichment(&self, targets: Vec<GeoTarget>) {
        match &self.enrichment {
            EnrichmentDispatch::Inline(service) => {
                let summary = service.enrich(&targets).await;
                tracing::debug!(?summary, "Inline enrichment finished");
            }
            EnrichmentDispatch::Deferred(queue) => queue.enqueue(targets),
        }
    }
}

fn decode_item(raw: Value, meta: &ClientMeta) -> std::result::Result<NewScan, String> {
    let item: ScanItemDto =
        serde_json::from_value(raw).map_err(|e| format!("Invalid scan: {}", e))?;
    item.into_new_scan(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use serde_json::json;

    use crate::features::scans::workers::EnrichmentWorker;
    use crate::shared::test_helpers::{MemoryScanStore, ScriptedGeocoder};

    struct Harness {
        store: Arc<MemoryScanStore>,
        geocoder: Arc<ScriptedGeocoder>,
        service: SyncService,
    }

    fn harness(geocoder: ScriptedGeocoder) -> Harness {
        let store = Arc::new(MemoryScanStore::new());
        let geocoder = Arc::new(geocoder);
        let enrichment = Arc::new(EnrichmentService::new(store.clone(), geocoder.clone()));
        let service = SyncService::new(store.clone(), EnrichmentDispatch::Inline(enrichment));
        Harness {
            store,
            geocoder,
            service,
        }
    }

    fn scan(id: &str) -> Value {
        json!({
            "id": id,
            "content": Word().fake::<String>(),
            "code_type": "QR_CODE",
            "scanned_at": "2025-03-14T09:26:53Z",
        })
    }

    fn geo_scan(id: &str, lat: f64, lon: f64) -> Value {
        let mut value = scan(id);
        value["latitude"] = json!(lat);
        value["longitude"] = json!(lon);
        value
    }

    fn meta() -> ClientMeta {
        ClientMeta {
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("ScannerPWA/2.1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_touches_nothing() {
        let h = harness(ScriptedGeocoder::failing());

        let outcome = h.service.sync(vec![], &meta()).await.unwrap();

        assert_eq!(outcome.synced, 0);
        assert_eq!(outcome.message(), "No scans to sync");
        assert_eq!(h.store.operations(), 0);
    }

    #[tokio::test]
    async fn test_second_sync_of_same_batch_is_noop() {
        let h = harness(ScriptedGeocoder::failing());
        let batch = vec![scan("a"), scan("b"), scan("c")];

        let first = h.service.sync(batch.clone(), &meta()).await.unwrap();
        assert_eq!(first.synced, 3);
        assert_eq!(first.message(), "3 scans synced");

        let second = h.service.sync(batch, &meta()).await.unwrap();
        assert_eq!(second.synced, 0);
        assert_eq!(second.duplicates(), 3);
        assert_eq!(second.message(), "0 scans synced");
    }

    #[tokio::test]
    async fn test_malformed_item_is_isolated() {
        let h = harness(ScriptedGeocoder::failing());
        let mut broken = scan("b");
        broken["scanned_at"] = json!("last tuesday");

        let outcome = h
            .service
            .sync(vec![scan("a"), broken, scan("c")], &meta())
            .await
            .unwrap();

        assert_eq!(outcome.synced, 2);
        assert_eq!(outcome.failed(), 1);
        assert!(matches!(
            &outcome.items[1],
            ItemOutcome { index: 1, id: Some(id), status: ItemStatus::Failed { .. } } if id == "b"
        ));
        assert!(h.store.get("a").is_some());
        assert!(h.store.get("b").is_none());
        assert!(h.store.get("c").is_some());
    }

    #[tokio::test]
    async fn test_item_missing_fields_is_isolated() {
        let h = harness(ScriptedGeocoder::failing());

        let outcome = h
            .service
            .sync(vec![json!({ "content": "no id" }), scan("a")], &meta())
            .await
            .unwrap();

        assert_eq!(outcome.synced, 1);
        assert_eq!(outcome.items[0].id, None);
        assert_eq!(outcome.failed(), 1);
    }

    #[tokio::test]
    async fn test_insert_failure_is_isolated() {
        let h = harness(ScriptedGeocoder::failing());
        h.store.fail_inserts_for("b");

        let outcome = h
            .service
            .sync(vec![scan("a"), scan("b"), scan("c")], &meta())
            .await
            .unwrap();

        assert_eq!(outcome.synced, 2);
        assert_eq!(outcome.failed(), 1);
    }

    #[tokio::test]
    async fn test_store_unavailable_fails_request() {
        let h = harness(ScriptedGeocoder::failing());
        h.store.set_unavailable();

        let result = h.service.sync(vec![scan("a")], &meta()).await;

        assert!(matches!(result, Err(e) if e.is_store_unavailable()));
    }

    #[tokio::test]
    async fn test_outage_mid_batch_still_geocodes_inserted_scans() {
        let h = harness(ScriptedGeocoder::returning("80331", "München"));
        h.store.fail_inserts_after(1);
        let batch = vec![geo_scan("b", 48.137, 11.575), geo_scan("c", 48.14, 11.58)];

        let result = h.service.sync(batch.clone(), &meta()).await;

        assert!(matches!(result, Err(e) if e.is_store_unavailable()));
        assert_eq!(h.geocoder.calls(), vec![(48.137, 11.575)]);
        assert_eq!(h.store.get("b").unwrap().ort.as_deref(), Some("München"));
        assert!(h.store.get("c").is_none());

        // Retry after recovery: "b" is a duplicate but already enriched
        h.store.fail_inserts_after(usize::MAX);
        let retry = h.service.sync(batch, &meta()).await.unwrap();
        assert_eq!(retry.synced, 1);
        assert_eq!(retry.duplicates(), 1);
        assert_eq!(h.store.get("b").unwrap().plz.as_deref(), Some("80331"));
        assert_eq!(h.store.get("c").unwrap().ort.as_deref(), Some("München"));
    }

    #[tokio::test]
    async fn test_outage_mid_batch_queues_inserted_scans() {
        let store = Arc::new(MemoryScanStore::new());
        store.fail_inserts_after(1);
        let geocoder = Arc::new(ScriptedGeocoder::returning("20095", "Hamburg"));
        let enrichment = Arc::new(EnrichmentService::new(store.clone(), geocoder.clone()));
        let (queue, worker) = EnrichmentWorker::channel(enrichment);
        let service = SyncService::new(store.clone(), EnrichmentDispatch::Deferred(queue));

        let result = service
            .sync(
                vec![geo_scan("a", 53.55, 9.99), geo_scan("b", 53.56, 10.0)],
                &meta(),
            )
            .await;
        assert!(result.is_err());

        drop(service);
        worker.run().await;

        assert_eq!(geocoder.calls().len(), 1);
        assert_eq!(store.get("a").unwrap().ort.as_deref(), Some("Hamburg"));
    }

    #[tokio::test]
    async fn test_only_new_fully_geolocated_scans_are_geocoded() {
        let h = harness(ScriptedGeocoder::returning("80331", "München"));
        h.service
            .sync(vec![geo_scan("old", 1.0, 1.0)], &meta())
            .await
            .unwrap();

        let mut half = scan("half");
        half["latitude"] = json!(48.1);

        let outcome = h
            .service
            .sync(
                vec![
                    geo_scan("old", 1.0, 1.0),
                    half,
                    scan("plain"),
                    geo_scan("new", 48.137, 11.575),
                ],
                &meta(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.synced, 3);
        assert_eq!(outcome.enrichment_targets, 1);
        // first call came from the initial sync of "old"
        assert_eq!(h.geocoder.calls(), vec![(1.0, 1.0), (48.137, 11.575)]);
        assert_eq!(h.store.get("new").unwrap().plz.as_deref(), Some("80331"));
        assert!(h.store.get("half").unwrap().plz.is_none());
    }

    #[tokio::test]
    async fn test_failed_geocoding_leaves_scan_unenriched() {
        let h = harness(ScriptedGeocoder::failing());

        let outcome = h
            .service
            .sync(vec![geo_scan("a", 48.137, 11.575)], &meta())
            .await
            .unwrap();

        assert_eq!(outcome.synced, 1);
        assert_eq!(h.geocoder.calls().len(), 1);
        let record = h.store.get("a").unwrap();
        assert!(record.plz.is_none());
        assert!(record.ort.is_none());
    }

    #[tokio::test]
    async fn test_request_meta_reflects_first_sync() {
        let h = harness(ScriptedGeocoder::failing());
        h.service.sync(vec![scan("a")], &meta()).await.unwrap();

        let other = ClientMeta {
            ip_address: Some("198.51.100.1".to_string()),
            user_agent: Some("curl/8.5".to_string()),
        };
        h.service.sync(vec![scan("a")], &other).await.unwrap();

        let record = h.store.get("a").unwrap();
        assert_eq!(record.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(record.user_agent.as_deref(), Some("ScannerPWA/2.1"));
    }

    #[tokio::test]
    async fn test_deferred_enrichment_runs_on_worker() {
        let store = Arc::new(MemoryScanStore::new());
        let geocoder = Arc::new(ScriptedGeocoder::returning("20095", "Hamburg"));
        let enrichment = Arc::new(EnrichmentService::new(store.clone(), geocoder.clone()));
        let (queue, worker) = EnrichmentWorker::channel(enrichment);
        let service = SyncService::new(store.clone(), EnrichmentDispatch::Deferred(queue));

        let outcome = service
            .sync(vec![geo_scan("a", 53.55, 9.99)], &meta())
            .await
            .unwrap();
        assert_eq!(outcome.synced, 1);

        drop(service);
        worker.run().await;

        assert_eq!(store.get("a").unwrap().ort.as_deref(), Some("Hamburg"));
    }
}
