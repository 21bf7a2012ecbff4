// src/handlers/system.rs

use axum::{
    http::{Method, Uri},
    Json,
};
use utoipa::OpenApi;

use crate::{
    common::{error::AppError, response::StatusResponse},
    docs::ApiDoc,
};

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "System",
    responses((status = 200, description = "Server is up", body = StatusResponse))
)]
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::success())
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn endpoint_not_found(uri: Uri) -> AppError {
    AppError::EndpointNotFound(uri.path().to_string())
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
