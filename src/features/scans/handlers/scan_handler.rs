use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery, ClientMeta};
use crate::features::scans::dtos::{
    DeleteScanResponseDto, ListScansQuery, ScanResponseDto, SyncRequestDto, SyncResponseDto,
};
use crate::features::scans::services::{ScanService, SyncService};
use crate::shared::types::ApiResponse;

#[derive(Clone)]
pub struct ScanState {
    pub sync_service: Arc<SyncService>,
    pub scan_service: Arc<ScanService>,
}

/// Sync a batch of scans
///
/// Scans whose id is already stored are ignored. Malformed scans are skipped
/// individually; the response counts only newly stored scans.
#[utoipa::path(
    post,
    path = "/api/sync",
    request_body = SyncRequestDto,
    responses(
        (status = 200, description = "Batch processed", body = ApiResponse<SyncResponseDto>),
        (status = 400, description = "Request body is not a scan batch"),
        (status = 500, description = "Store unavailable")
    ),
    tag = "scans"
)]
pub async fn sync_scans(
    State(state): State<ScanState>,
    meta: ClientMeta,
    AppJson(dto): AppJson<SyncRequestDto>,
) -> Result<Json<ApiResponse<SyncResponseDto>>> {
    let outcome = state.sync_service.sync(dto.scans, &meta).await?;
    let response = SyncResponseDto::from(outcome);
    let message = response.message.clone();

    Ok(Json(ApiResponse::ok_with_message(response, message)))
}

/// List scans, newest first
#[utoipa::path(
    get,
    path = "/api/scans",
    params(ListScansQuery),
    responses(
        (status = 200, description = "Page of scans", body = ApiResponse<Vec<ScanResponseDto>>),
        (status = 400, description = "limit or offset out of range")
    ),
    tag = "scans"
)]
pub async fn list_scans(
    State(state): State<ScanState>,
    AppQuery(query): AppQuery<ListScansQuery>,
) -> Result<Json<ApiResponse<Vec<ScanResponseDto>>>> {
    let (items, total) = state.scan_service.list(&query).await?;

    Ok(Json(ApiResponse::page(items, total)))
}

/// Delete a scan by id
#[utoipa::path(
    delete,
    path = "/api/scans/{id}",
    params(
        ("id" = String, Path, description = "Scan id")
    ),
    responses(
        (status = 200, description = "Scan deleted", body = ApiResponse<DeleteScanResponseDto>),
        (status = 404, description = "Scan not found")
    ),
    tag = "scans"
)]
pub async fn delete_scan(
    State(state): State<ScanState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteScanResponseDto>>> {
    state.scan_service.delete(&id).await?;

    Ok(Json(ApiResponse::ok_with_message(
        DeleteScanResponseDto { deleted: id },
        "Scan deleted",
    )))
}
