use std::sync::Arc;

use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::scans::dtos::{ListScansQuery, ScanResponseDto};
use crate::features::scans::store::ScanStore;

/// Read and delete access to stored scans
pub struct ScanService {
    store: Arc<dyn ScanStore>,
}

impl ScanService {
    pub fn new(store: Arc<dyn ScanStore>) -> Self {
        Self { store }
    }

    /// Page of scans, newest `scanned_at` first, plus the total count.
    /// Bounds are checked before the store is touched.
    pub async fn list(&self, query: &ListScansQuery) -> Result<(Vec<ScanResponseDto>, i64)> {
        query
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let scans = self.store.list(query.limit, query.offset).await?;
        let total = self.store.count().await?;

        Ok((scans.into_iter().map(Into::into).collect(), total))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete_by_id(id).await? == 0 {
            return Err(AppError::NotFound("Scan not found".to_string()));
        }

        tracing::info!("Scan deleted: id={}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::features::scans::models::NewScan;
    use crate::shared::test_helpers::MemoryScanStore;

    async fn seeded(count: i64) -> Arc<MemoryScanStore> {
        let store = Arc::new(MemoryScanStore::new());
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        for i in 0..count {
            let scan = NewScan {
                id: format!("scan-{:03}", i),
                content: format!("payload {}", i),
                code_type: "CODE_128".to_string(),
                scanned_at: start + Duration::minutes(i),
                device_name: None,
                latitude: None,
                longitude: None,
                ip_address: None,
                user_agent: None,
            };
            store.insert_if_absent(&scan).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_list_paginates_newest_first() {
        let store = seeded(150).await;
        let service = ScanService::new(store);

        let (first, total) = service.list(&ListScansQuery::default()).await.unwrap();
        assert_eq!(total, 150);
        assert_eq!(first.len(), 100);
        assert_eq!(first[0].id, "scan-149");
        assert!(first
            .windows(2)
            .all(|pair| pair[0].scanned_at >= pair[1].scanned_at));

        let (rest, _) = service
            .list(&ListScansQuery {
                limit: 100,
                offset: 100,
            })
            .await
            .unwrap();
        assert_eq!(rest.len(), 50);
        assert_eq!(rest.last().unwrap().id, "scan-000");
    }

    #[tokio::test]
    async fn test_list_rejects_bounds_before_store() {
        let store = Arc::new(MemoryScanStore::new());
        let service = ScanService::new(store.clone());

        for query in [
            ListScansQuery {
                limit: 0,
                offset: 0,
            },
            ListScansQuery {
                limit: 1001,
                offset: 0,
            },
            ListScansQuery {
                limit: 10,
                offset: -5,
            },
        ] {
            let result = service.list(&query).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert_eq!(store.operations(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let service = ScanService::new(seeded(1).await);

        assert!(service.delete("scan-000").await.is_ok());
        assert!(matches!(
            service.delete("scan-000").await,
            Err(AppError::NotFound(_))
        ));
    }
}
