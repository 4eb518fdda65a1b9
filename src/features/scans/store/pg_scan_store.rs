use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::scans::models::{NewScan, ScanRecord};
use crate::features::scans::store::ScanStore;

/// PostgreSQL-backed scan store. Each call borrows a pooled connection for a
/// single statement, so nothing stays checked out between calls.
pub struct PgScanStore {
    pool: PgPool,
}

impl PgScanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close the underlying pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ScanStore for PgScanStore {
    async fn insert_if_absent(&self, scan: &NewScan) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO scans (
                id, content, code_type, scanned_at, device_name,
                latitude, longitude, ip_address, user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&scan.id)
        .bind(&scan.content)
        .bind(&scan.code_type)
        .bind(scan.scanned_at)
        .bind(&scan.device_name)
        .bind(scan.latitude)
        .bind(scan.longitude)
        .bind(&scan.ip_address)
        .bind(&scan.user_agent)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert scan {}: {:?}", scan.id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn update_geo_meta(
        &self,
        id: &str,
        plz: Option<&str>,
        ort: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE scans
            SET plz = COALESCE($2, plz), ort = COALESCE($3, ort)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(plz)
        .bind(ort)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update geo data of scan {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ScanRecord>> {
        sqlx::query_as::<_, ScanRecord>(
            r#"
            SELECT
                id, content, code_type, scanned_at, device_name,
                latitude, longitude, plz, ort, ip_address, user_agent, created_at
            FROM scans
            ORDER BY scanned_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list scans: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scans")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count scans: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM scans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete scan {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::warn!("Database ping failed: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
