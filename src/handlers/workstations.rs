// src/handlers/workstations.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::JsonBody,
        response::{ErrorResponse, MessageResponse},
    },
    config::AppState,
    models::workstation::{
        AddOrUpdateWorkstationPayload, RemoveWorkstationPayload, WorkstationsResponse,
    },
};

#[utoipa::path(
    get,
    path = "/api/facilityWorkstations",
    tag = "Workstations",
    responses(
        (status = 200, description = "Index-aligned workstation, capacity and eligibility arrays", body = WorkstationsResponse)
    )
)]
pub async fn facility_workstations(
    State(app_state): State<AppState>,
) -> Result<Json<WorkstationsResponse>, AppError> {
    let rosters = app_state.workstation_service.rosters().await?;
    Ok(Json(WorkstationsResponse::from(rosters)))
}

#[utoipa::path(
    post,
    path = "/api/addOrUpdateWorkstation",
    tag = "Workstations",
    request_body = AddOrUpdateWorkstationPayload,
    responses(
        (status = 200, description = "Workstation stored", body = MessageResponse),
        (status = 400, description = "Missing workstationName", body = ErrorResponse)
    )
)]
pub async fn add_or_update_workstation(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<AddOrUpdateWorkstationPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let workstation = payload.workstation_name.unwrap_or_default();

    app_state
        .workstation_service
        .add_or_update(&workstation, payload.available_stations)
        .await?;
    Ok(Json(MessageResponse::success(format!(
        "Workstation '{workstation}' added/updated"
    ))))
}

#[utoipa::path(
    post,
    path = "/api/removeWorkstation",
    tag = "Workstations",
    request_body = RemoveWorkstationPayload,
    responses(
        (status = 200, description = "Employee taken off the workstation", body = MessageResponse),
        (status = 404, description = "Unknown workstation", body = ErrorResponse)
    )
)]
pub async fn remove_workstation(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<RemoveWorkstationPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let employee = payload.employee_name.unwrap_or_default();
    let workstation = payload.workstation_name.unwrap_or_default();

    let removed = app_state
        .workstation_service
        .remove_employee(&workstation, &employee)
        .await?;

    let message = if removed {
        format!("Employee '{employee}' removed from '{workstation}'")
    } else {
        format!("Employee '{employee}' was not assigned to '{workstation}'")
    };
    Ok(Json(MessageResponse::success(message)))
}
