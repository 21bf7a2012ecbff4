// src/common/response.rs

use serde::Serialize;
use utoipa::ToSchema;

/// The `status` field every response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Plain acknowledgement: `{status, message}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: ApiStatus,
    #[schema(example = "Employee 'Alice' added/updated")]
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
        }
    }
}

/// Reply for endpoints that only enqueue a tracking job.
#[derive(Debug, Serialize, ToSchema)]
pub struct QueuedResponse {
    pub status: ApiStatus,
    pub queued: bool,
}

impl QueuedResponse {
    pub fn queued() -> Self {
        Self {
            status: ApiStatus::Success,
            queued: true,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: ApiStatus,
    #[schema(example = "employeeName is required")]
    pub message: String,
}

/// Bare `{status}` reply, used by the health check.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: ApiStatus,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: ApiStatus::Success,
        }
    }
}
