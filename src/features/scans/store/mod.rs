//! Durable storage for scan records.
//!
//! `ScanStore` is the seam between the services and the database so the
//! reconciliation logic can be exercised without PostgreSQL.

mod pg_scan_store;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::scans::models::{NewScan, ScanRecord};

pub use pg_scan_store::PgScanStore;

#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Insert unless a record with the same id exists. Returns 1 when a row
    /// was created and 0 when the id was already taken.
    async fn insert_if_absent(&self, scan: &NewScan) -> Result<u64>;

    /// Fill in geocoding fields. `None` leaves the stored value untouched.
    /// Returns the number of rows updated (0 if the record is gone).
    async fn update_geo_meta(&self, id: &str, plz: Option<&str>, ort: Option<&str>)
        -> Result<u64>;

    /// Records ordered by `scanned_at` descending. Bounds are validated by the caller.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ScanRecord>>;

    async fn count(&self) -> Result<i64>;

    /// Returns 1 when the record was removed, 0 when it did not exist.
    async fn delete_by_id(&self, id: &str) -> Result<u64>;

    /// Trivial round-trip used by the health check
    async fn ping(&self) -> Result<()>;
}
