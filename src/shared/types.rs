use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

/// Paging information for list responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    /// Total number of stored items, independent of limit/offset
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::success(Some(data), None, None)
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self::success(Some(data), Some(message.into()), None)
    }

    pub fn page(data: T, total: i64) -> Self {
        Self::success(Some(data), None, Some(Meta { total }))
    }

    fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            meta: None,
            errors,
        }
    }
}
