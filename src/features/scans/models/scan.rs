use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::scans::dtos::ScanResponseDto;

/// Database model for a synchronized scan
#[derive(Debug, Clone, FromRow)]
pub struct ScanRecord {
    pub id: String,
    pub content: String,
    pub code_type: String,
    pub scanned_at: DateTime<Utc>,
    pub device_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub plz: Option<String>,
    pub ort: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload: a decoded client scan stamped with request metadata
#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    pub id: String,
    pub content: String,
    pub code_type: String,
    pub scanned_at: DateTime<Utc>,
    pub device_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A newly inserted scan that carries a full coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTarget {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoTarget {
    /// Returns `None` unless both latitude and longitude are present
    pub fn from_scan(scan: &NewScan) -> Option<Self> {
        match (scan.latitude, scan.longitude) {
            (Some(latitude), Some(longitude)) => Some(Self {
                id: scan.id.clone(),
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Reverse geocoding result. Both fields absent means nothing was resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoMeta {
    pub plz: Option<String>,
    pub ort: Option<String>,
}

impl GeoMeta {
    pub fn is_empty(&self) -> bool {
        self.plz.is_none() && self.ort.is_none()
    }
}

impl From<ScanRecord> for ScanResponseDto {
    fn from(s: ScanRecord) -> Self {
        Self {
            id: s.id,
            content: s.content,
            code_type: s.code_type,
            scanned_at: s.scanned_at,
            device_name: s.device_name,
            latitude: s.latitude,
            longitude: s.longitude,
            plz: s.plz,
            ort: s.ort,
            ip_address: s.ip_address,
            user_agent: s.user_agent,
            created_at: s.created_at,
        }
    }
}
