// src/handlers/tracking.rs

// Tracking writes never touch the database here: they become a
// `TrackingJob` on the queue and the client only learns it was accepted.

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{JsonBody, QueryParams},
        response::{ApiStatus, ErrorResponse, QueuedResponse},
    },
    config::AppState,
    models::tracking::{
        ContainerMove, MoveContainerQuery, NextContainerIdResponse, TrackQuery, TrackingEvent,
        TrackingHistoryPayload, TrackingHistoryResponse, TrackingJob,
    },
};

#[utoipa::path(
    get,
    path = "/api/orderTrack",
    tag = "Tracking",
    params(TrackQuery),
    responses((status = 200, description = "Scanner stamp queued", body = QueuedResponse))
)]
pub async fn order_track(
    State(app_state): State<AppState>,
    QueryParams(query): QueryParams<TrackQuery>,
) -> Result<Json<QueuedResponse>, AppError> {
    let event = TrackingEvent::from(query);
    tracing::debug!(
        "orderTrack iso={:?} lead={:?} order={:?} container={:?} at '{}' by '{}'",
        event.iso_barcode,
        event.lead_barcode,
        event.order_number,
        event.container_id,
        event.workstation,
        event.employee_name
    );
    app_state
        .tracking_service
        .submit(TrackingJob::OrderTrack(event))?;
    Ok(Json(QueuedResponse::queued()))
}

#[utoipa::path(
    get,
    path = "/api/receivePrintData",
    tag = "Tracking",
    params(TrackQuery),
    responses((status = 200, description = "Print-station stamp queued", body = QueuedResponse))
)]
pub async fn receive_print_data(
    State(app_state): State<AppState>,
    QueryParams(query): QueryParams<TrackQuery>,
) -> Result<Json<QueuedResponse>, AppError> {
    let event = TrackingEvent::from(query);
    tracing::debug!(
        "receivePrintData iso={:?} order={:?} container={:?} item={:?}",
        event.iso_barcode,
        event.order_number,
        event.container_id,
        event.item_num
    );
    app_state
        .tracking_service
        .submit(TrackingJob::PrintData(event))?;
    Ok(Json(QueuedResponse::queued()))
}

#[utoipa::path(
    get,
    path = "/api/moveContainer",
    tag = "Tracking",
    params(MoveContainerQuery),
    responses((status = 200, description = "Container move queued", body = QueuedResponse))
)]
pub async fn move_container(
    State(app_state): State<AppState>,
    QueryParams(query): QueryParams<MoveContainerQuery>,
) -> Result<Json<QueuedResponse>, AppError> {
    let mv = ContainerMove::from(query);
    app_state
        .tracking_service
        .submit(TrackingJob::MoveContainer(mv))?;
    Ok(Json(QueuedResponse::queued()))
}

#[utoipa::path(
    get,
    path = "/api/nextContainerID",
    tag = "Tracking",
    responses(
        (status = 200, description = "Smallest unused container id", body = NextContainerIdResponse)
    )
)]
pub async fn next_container_id(
    State(app_state): State<AppState>,
) -> Result<Json<NextContainerIdResponse>, AppError> {
    let next_container_id = app_state.tracking_service.next_container_id().await?;
    Ok(Json(NextContainerIdResponse {
        status: ApiStatus::Success,
        next_container_id,
    }))
}

fn lookup_key(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/getTrackingHistory",
    tag = "Tracking",
    request_body = TrackingHistoryPayload,
    responses(
        (status = 200, description = "History per matching row", body = TrackingHistoryResponse),
        (status = 400, description = "No lookup key given", body = ErrorResponse)
    )
)]
pub async fn tracking_history(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<TrackingHistoryPayload>,
) -> Result<Json<TrackingHistoryResponse>, AppError> {
    payload.validate()?;

    let history = app_state
        .tracking_service
        .history(
            lookup_key(&payload.order_number),
            lookup_key(&payload.lead_barcode),
            lookup_key(&payload.iso_barcode),
        )
        .await?;
    Ok(Json(TrackingHistoryResponse {
        status: ApiStatus::Success,
        history,
    }))
}
