use utoipa::{Modify, OpenApi};

use crate::features::health::{dtos as health_dtos, handlers as health_handlers};
use crate::features::scans::{dtos as scans_dtos, handlers as scans_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Scans
        scans_handlers::sync_scans,
        scans_handlers::list_scans,
        scans_handlers::delete_scan,
        // Health
        health_handlers::health_check,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Scans
            scans_dtos::ScanItemDto,
            scans_dtos::SyncRequestDto,
            scans_dtos::SyncResponseDto,
            scans_dtos::ScanResponseDto,
            scans_dtos::DeleteScanResponseDto,
            ApiResponse<scans_dtos::SyncResponseDto>,
            ApiResponse<Vec<scans_dtos::ScanResponseDto>>,
            ApiResponse<scans_dtos::DeleteScanResponseDto>,
            // Health
            health_dtos::HealthDto,
            ApiResponse<health_dtos::HealthDto>,
        )
    ),
    tags(
        (name = "scans", description = "Scan synchronization, listing and deletion"),
        (name = "health", description = "Liveness check"),
    ),
    info(
        title = "artiqo-scan API",
        version = "0.1.0",
        description = "Scan synchronization backend",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
