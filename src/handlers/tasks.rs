// src/handlers/tasks.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::JsonBody,
        response::{ApiStatus, ErrorResponse, MessageResponse},
    },
    config::AppState,
    models::task::{
        EditTasksPayload, EmployeeTasksResponse, ManualTasksResponse, UpdateEmployeeTaskPayload,
    },
    services::task_service::TaskChange,
};

#[utoipa::path(
    get,
    path = "/api/manualTasks",
    tag = "Tasks",
    responses((status = 200, description = "Manual task names", body = ManualTasksResponse))
)]
pub async fn manual_tasks(
    State(app_state): State<AppState>,
) -> Result<Json<ManualTasksResponse>, AppError> {
    let tasks = app_state.task_service.manual_tasks().await?;
    Ok(Json(ManualTasksResponse {
        status: ApiStatus::Success,
        tasks,
    }))
}

#[utoipa::path(
    get,
    path = "/api/employeesTasks",
    tag = "Tasks",
    responses(
        (status = 200, description = "Live tasks as [employeeName, liveTask, status, isobarcode]", body = EmployeeTasksResponse)
    )
)]
pub async fn employees_tasks(
    State(app_state): State<AppState>,
) -> Result<Json<EmployeeTasksResponse>, AppError> {
    let tasks = app_state.task_service.employee_tasks().await?;
    Ok(Json(EmployeeTasksResponse {
        status: ApiStatus::Success,
        tasks: tasks.into_iter().map(|t| t.into_row()).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/updateEmployeeTask",
    tag = "Tasks",
    request_body = UpdateEmployeeTaskPayload,
    responses(
        (status = 200, description = "Task inserted, updated or erased", body = MessageResponse),
        (status = 400, description = "Missing employeeName", body = ErrorResponse)
    )
)]
pub async fn update_employee_task(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<UpdateEmployeeTaskPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let employee = payload.employee_name.unwrap_or_default();

    let message = app_state
        .task_service
        .update_employee_task(TaskChange {
            employee_name: &employee,
            live_task: payload.live_task.as_deref().filter(|t| !t.is_empty()),
            status: payload.status.as_deref(),
            isobarcode: payload.isobarcode.as_deref().filter(|b| !b.is_empty()),
            erase: payload.erase,
        })
        .await?;
    Ok(Json(MessageResponse::success(message)))
}

#[utoipa::path(
    post,
    path = "/api/editTasks",
    tag = "Tasks",
    request_body = EditTasksPayload,
    responses(
        (status = 200, description = "Manual task added or deleted", body = MessageResponse),
        (status = 400, description = "Missing taskName or editFlag", body = ErrorResponse)
    )
)]
pub async fn edit_tasks(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<EditTasksPayload>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let task = payload.task_name.unwrap_or_default();
    let add = payload.edit_flag.unwrap_or_default();

    app_state.task_service.edit_manual(&task, add).await?;
    let verb = if add { "added" } else { "deleted" };
    Ok(Json(MessageResponse::success(format!(
        "Task '{task}' {verb} successfully"
    ))))
}
