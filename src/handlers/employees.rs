// src/handlers/employees.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::JsonBody,
        response::{ApiStatus, ErrorResponse, MessageResponse},
    },
    config::AppState,
    models::employee::{
        AddOrUpdateEmployeePayload, EmployeeNamePayload, EmployeesResponse, LogEmployeeTimePayload,
        LoginStateResponse, PulseEmployeesResponse, StartTimeResponse,
    },
    services::employee_service::EmployeeUpdate,
};

// ---
// Reads
// ---

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Every employee", body = EmployeesResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    )
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
) -> Result<Json<EmployeesResponse>, AppError> {
    let employees = app_state.employee_service.list().await?;
    Ok(Json(EmployeesResponse {
        status: ApiStatus::Success,
        employees,
    }))
}

#[utoipa::path(
    get,
    path = "/api/pulseEmployees",
    tag = "Employees",
    responses(
        (status = 200, description = "Employees with pulse access", body = PulseEmployeesResponse)
    )
)]
pub async fn pulse_employees(
    State(app_state): State<AppState>,
) -> Result<Json<PulseEmployeesResponse>, AppError> {
    let employees = app_state.employee_service.list_pulse().await?;
    Ok(Json(PulseEmployeesResponse {
        status: ApiStatus::Success,
        employees,
    }))
}

// ---
// Administration
// ---

#[utoipa::path(
    post,
    path = "/api/addOrUpdateEmployee",
    tag = "Employees",
    request_body = AddOrUpdateEmployeePayload,
    responses(
        (status = 200, description = "Employee stored", body = MessageResponse),
        (status = 400, description = "Missing employeeName", body = ErrorResponse)
    )
)]
pub async fn add_or_update_employee(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<AddOrUpdateEmployeePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();

    app_state
        .employee_service
        .add_or_update(
            &name,
            EmployeeUpdate {
                password: payload.password.as_deref(),
                hourly_rate: payload.hourly_rate,
                workstations: &payload.workstations,
                pulse_access: payload.pulse_access.as_deref(),
            },
        )
        .await?;

    Ok(Json(MessageResponse::success(format!(
        "Employee '{name}' added/updated"
    ))))
}

#[utoipa::path(
    post,
    path = "/api/removeEmployee",
    tag = "Employees",
    request_body = EmployeeNamePayload,
    responses(
        (status = 200, description = "Employee removed (or was absent)", body = MessageResponse)
    )
)]
pub async fn remove_employee(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<EmployeeNamePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();

    app_state.employee_service.remove(&name).await?;
    Ok(Json(MessageResponse::success(format!("Employee '{name}' removed"))))
}

// ---
// Shift state
// ---

#[utoipa::path(
    post,
    path = "/api/loggedin",
    tag = "Shifts",
    request_body = EmployeeNamePayload,
    responses(
        (status = 200, description = "Marked as logged in", body = MessageResponse),
        (status = 404, description = "Unknown employee", body = ErrorResponse)
    )
)]
pub async fn logged_in(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<EmployeeNamePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();

    app_state.employee_service.set_logged_in(&name, true).await?;
    Ok(Json(MessageResponse::success(format!(
        "Employee '{name}' logged in successfully"
    ))))
}

#[utoipa::path(
    post,
    path = "/api/loggedOut",
    tag = "Shifts",
    request_body = EmployeeNamePayload,
    responses(
        (status = 200, description = "Marked as logged out", body = MessageResponse),
        (status = 404, description = "Unknown employee", body = ErrorResponse)
    )
)]
pub async fn logged_out(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<EmployeeNamePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();

    app_state.employee_service.set_logged_in(&name, false).await?;
    Ok(Json(MessageResponse::success(format!(
        "Employee '{name}' logged out successfully"
    ))))
}

#[utoipa::path(
    post,
    path = "/api/getEmployeeLoginState",
    tag = "Shifts",
    request_body = EmployeeNamePayload,
    responses(
        (status = 200, description = "Current login flag", body = LoginStateResponse),
        (status = 404, description = "Unknown employee", body = ErrorResponse)
    )
)]
pub async fn login_state(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<EmployeeNamePayload>,
) -> Result<Json<LoginStateResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();

    let logged_in = app_state.employee_service.login_state(&name).await?;
    Ok(Json(LoginStateResponse {
        status: ApiStatus::Success,
        employee_name: name,
        logged_in,
    }))
}

#[utoipa::path(
    post,
    path = "/api/getEmployeeStartTime",
    tag = "Shifts",
    request_body = EmployeeNamePayload,
    responses(
        (status = 200, description = "Last logged start time, null if none", body = StartTimeResponse),
        (status = 404, description = "Unknown employee", body = ErrorResponse)
    )
)]
pub async fn start_time(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<EmployeeNamePayload>,
) -> Result<Json<StartTimeResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();

    let start_time = app_state.employee_service.start_time(&name).await?;
    Ok(Json(StartTimeResponse {
        status: ApiStatus::Success,
        start_time,
    }))
}

#[utoipa::path(
    post,
    path = "/api/logEmployeeTime",
    tag = "Shifts",
    request_body = LogEmployeeTimePayload,
    responses(
        (status = 200, description = "Shift times stored", body = MessageResponse),
        (status = 400, description = "Missing field or bad time format", body = ErrorResponse),
        (status = 404, description = "Unknown employee", body = ErrorResponse)
    )
)]
pub async fn log_employee_time(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<LogEmployeeTimePayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let name = payload.employee_name.unwrap_or_default();
    let start = payload.start_time.unwrap_or_default();
    let end = payload.end_time.unwrap_or_default();

    app_state
        .employee_service
        .log_time(&name, &start, &end)
        .await?;
    Ok(Json(MessageResponse::success(format!(
        "Updated '{name}' start and end times"
    ))))
}
