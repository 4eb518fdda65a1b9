use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::features::scans::models::GeoMeta;

/// Translates a coordinate pair into postal code and locality.
///
/// Implementations never fail: any lookup problem yields an empty `GeoMeta`.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn resolve(&self, latitude: f64, longitude: f64) -> GeoMeta;
}

/// Nominatim reverse API response structure
#[derive(Debug, Deserialize)]
pub struct NominatimReverseResponse {
    pub display_name: Option<String>,
    pub address: Option<NominatimAddress>,
    /// Present instead of an address when the point cannot be geocoded
    pub error: Option<String>,
}

/// Nominatim address components
#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub postcode: Option<String>,
}

impl NominatimAddress {
    /// City, falling back to town, village, then municipality
    pub fn get_locality(&self) -> Option<String> {
        [&self.city, &self.town, &self.village, &self.municipality]
            .into_iter()
            .find_map(|candidate| non_empty(candidate.as_deref()))
    }

    pub fn get_postcode(&self) -> Option<String> {
        non_empty(self.postcode.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<NominatimReverseResponse> for GeoMeta {
    fn from(response: NominatimReverseResponse) -> Self {
        match response.address {
            Some(address) => GeoMeta {
                plz: address.get_postcode(),
                ort: address.get_locality(),
            },
            None => GeoMeta::default(),
        }
    }
}

/// Reverse geocoding against a Nominatim instance
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Single reverse lookup. Errors are surfaced here and swallowed by `resolve`.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<NominatimReverseResponse> {
        let url = format!("{}/reverse", self.base_url);
        tracing::debug!("Reverse geocoding ({}, {}) -> {}", latitude, longitude, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body: NominatimReverseResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        if let Some(error) = &body.error {
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim could not geocode point: {}",
                error
            )));
        }

        tracing::debug!(
            "Reverse geocoded ({}, {}) -> {:?}",
            latitude,
            longitude,
            body.display_name
        );
        Ok(body)
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodingService {
    async fn resolve(&self, latitude: f64, longitude: f64) -> GeoMeta {
        match self.reverse(latitude, longitude).await {
            Ok(response) => response.into(),
            Err(e) => {
                tracing::warn!(
                    latitude,
                    longitude,
                    "Reverse geocoding failed, leaving scan unenriched: {}",
                    e
                );
                GeoMeta::default()
            }
        }
    }
}
