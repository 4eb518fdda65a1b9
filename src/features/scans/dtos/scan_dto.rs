use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::extractor::ClientMeta;
use crate::features::scans::models::NewScan;
use crate::shared::constants::DEFAULT_SCAN_LIMIT;

/// A single scan as captured on the client device
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScanItemDto {
    /// Client-generated unique identifier
    #[validate(length(min = 1, max = 64, message = "id must be 1-64 characters"))]
    pub id: String,

    /// Decoded payload (barcode value, URL, ...)
    pub content: String,

    /// Symbology, e.g. "QR_CODE" or "EAN_13"
    #[validate(length(min = 1, max = 32, message = "code_type must be 1-32 characters"))]
    pub code_type: String,

    /// Capture time on the device (RFC 3339; naive timestamps are read as UTC)
    #[schema(value_type = String, format = DateTime)]
    pub scanned_at: String,

    #[validate(length(max = 128, message = "device_name must not exceed 128 characters"))]
    pub device_name: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be within [-180, 180]"
    ))]
    pub longitude: Option<f64>,
}

impl ScanItemDto {
    /// Validate the item and stamp it with the request metadata
    pub fn into_new_scan(self, meta: &ClientMeta) -> Result<NewScan, String> {
        self.validate().map_err(|e| e.to_string())?;
        let scanned_at = parse_scanned_at(&self.scanned_at)?;

        Ok(NewScan {
            id: self.id,
            content: self.content,
            code_type: self.code_type,
            scanned_at,
            device_name: self.device_name,
            latitude: self.latitude,
            longitude: self.longitude,
            ip_address: meta.ip_address.clone(),
            user_agent: meta.user_agent.clone(),
        })
    }
}

/// Parse a client timestamp. Offsets are honoured; naive values are UTC.
pub fn parse_scanned_at(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(format!("Invalid scanned_at timestamp: '{}'", raw))
}

/// Batch sync request.
///
/// Items are kept as raw JSON so that one malformed scan is rejected on its
/// own instead of failing the whole request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncRequestDto {
    #[schema(value_type = Vec<ScanItemDto>)]
    pub scans: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncResponseDto {
    /// Number of scans newly persisted by this request
    pub synced: u64,
    pub message: String,
    /// Items already stored by an earlier sync
    pub duplicates: u64,
    /// Items rejected (malformed or failed to insert)
    pub failed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanResponseDto {
    pub id: String,
    pub content: String,
    pub code_type: String,
    pub scanned_at: DateTime<Utc>,
    pub device_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Postal code from reverse geocoding
    pub plz: Option<String>,
    /// Locality from reverse geocoding
    pub ort: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Query params for listing scans (newest first)
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct ListScansQuery {
    /// Number of scans to return (default: 100)
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 1000)]
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: i64,

    /// Number of scans to skip (default: 0)
    #[serde(default)]
    #[param(minimum = 0)]
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_SCAN_LIMIT
}

impl Default for ListScansQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SCAN_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteScanResponseDto {
    pub deleted: String,
}
