use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::health::dtos::HealthDto;
use crate::features::scans::store::ScanStore;
use crate::shared::types::ApiResponse;

/// Health check
///
/// Succeeds only when the database answers.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service and database are up", body = ApiResponse<HealthDto>),
        (status = 500, description = "Database unreachable")
    ),
    tag = "health"
)]
pub async fn health_check(
    State(store): State<Arc<dyn ScanStore>>,
) -> Result<Json<ApiResponse<HealthDto>>> {
    store.ping().await?;

    Ok(Json(ApiResponse::ok(HealthDto {
        status: "ok".to_string(),
    })))
}
