//! In-memory doubles for the store and the geocoder.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::scans::models::{GeoMeta, NewScan, ScanRecord};
use crate::features::scans::services::ReverseGeocoder;
use crate::features::scans::store::ScanStore;

/// `ScanStore` backed by a map, with failure injection
#[derive(Default)]
pub struct MemoryScanStore {
    records: Mutex<HashMap<String, ScanRecord>>,
    failing_ids: Mutex<HashSet<String>>,
    unavailable: AtomicBool,
    insert_budget: Mutex<Option<usize>>,
    operations: AtomicUsize,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert of `id` fail with a statement-level error
    pub fn fail_inserts_for(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    /// Simulate pool exhaustion on every subsequent call
    pub fn set_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    /// Let `inserts` more inserts succeed, then time out every further insert.
    /// Other operations keep working.
    pub fn fail_inserts_after(&self, inserts: usize) {
        *self.insert_budget.lock().unwrap() = Some(inserts);
    }

    /// Number of store calls made so far
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &str) -> Option<ScanRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }

    fn begin(&self) -> Result<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn insert_if_absent(&self, scan: &NewScan) -> Result<u64> {
        self.begin()?;
        if let Some(left) = self.insert_budget.lock().unwrap().as_mut() {
            if *left == 0 {
                return Err(AppError::Database(sqlx::Error::PoolTimedOut));
            }
            *left -= 1;
        }
        if self.failing_ids.lock().unwrap().contains(&scan.id) {
            return Err(AppError::Database(sqlx::Error::Protocol(
                "injected insert failure".to_string(),
            )));
        }

        let mut records = self.records.lock().unwrap();
        if records.contains_key(&scan.id) {
            return Ok(0);
        }
        records.insert(
            scan.id.clone(),
            ScanRecord {
                id: scan.id.clone(),
                content: scan.content.clone(),
                code_type: scan.code_type.clone(),
                scanned_at: scan.scanned_at,
                device_name: scan.device_name.clone(),
                latitude: scan.latitude,
                longitude: scan.longitude,
                plz: None,
                ort: None,
                ip_address: scan.ip_address.clone(),
                user_agent: scan.user_agent.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(1)
    }

    async fn update_geo_meta(
        &self,
        id: &str,
        plz: Option<&str>,
        ort: Option<&str>,
    ) -> Result<u64> {
        self.begin()?;
        let mut records = self.records.lock().unwrap();
        match records.get_mut(id) {
            Some(record) => {
                if let Some(plz) = plz {
                    record.plz = Some(plz.to_string());
                }
                if let Some(ort) = ort {
                    record.ort = Some(ort.to_string());
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ScanRecord>> {
        self.begin()?;
        let mut records: Vec<ScanRecord> = self.records.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at).then(a.id.cmp(&b.id)));
        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        self.begin()?;
        Ok(self.records.lock().unwrap().len() as i64)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64> {
        self.begin()?;
        Ok(u64::from(self.records.lock().unwrap().remove(id).is_some()))
    }

    async fn ping(&self) -> Result<()> {
        self.begin()
    }
}

/// `ReverseGeocoder` returning a fixed answer and recording every lookup
#[derive(Default)]
pub struct ScriptedGeocoder {
    answer: GeoMeta,
    calls: Mutex<Vec<(f64, f64)>>,
}

impl ScriptedGeocoder {
    pub fn returning(plz: &str, ort: &str) -> Self {
        Self {
            answer: GeoMeta {
                plz: Some(plz.to_string()),
                ort: Some(ort.to_string()),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A geocoder whose lookups never resolve anything
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReverseGeocoder for ScriptedGeocoder {
    async fn resolve(&self, latitude: f64, longitude: f64) -> GeoMeta {
        self.calls.lock().unwrap().push((latitude, longitude));
        self.answer.clone()
    }
}
