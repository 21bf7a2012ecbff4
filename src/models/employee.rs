// src/models/employee.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::response::ApiStatus;

// Row of `employee_info` as the clients see it. The password is plaintext
// and is returned on purpose: the desktop login popups compare locally.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i64,

    #[serde(rename = "employeeName")]
    #[sqlx(rename = "employeeName")]
    #[schema(example = "Alice")]
    pub employee_name: String,

    pub password: Option<String>,

    #[serde(rename = "hourlyRate")]
    #[sqlx(rename = "hourlyRate")]
    #[schema(example = 15.0)]
    pub hourly_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PulseEmployee {
    pub id: i64,
    #[serde(rename = "employeeName")]
    pub employee_name: String,
    pub password: Option<String>,
    #[serde(rename = "pulseAccess")]
    pub pulse_access: Vec<String>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOrUpdateEmployeePayload {
    #[validate(
        required(message = "employeeName is required"),
        length(min = 1, message = "employeeName is required")
    )]
    #[schema(example = "Alice")]
    pub employee_name: Option<String>,

    pub password: Option<String>,

    #[schema(example = 15.0)]
    pub hourly_rate: Option<f64>,

    // Workstations this employee becomes eligible for.
    #[serde(default)]
    pub workstations: Vec<String>,

    // Replaces the app-access list when present.
    pub pulse_access: Option<Vec<String>>,
}

/// Body shared by every endpoint that only needs `employeeName`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeNamePayload {
    #[validate(
        required(message = "employeeName is required"),
        length(min = 1, message = "employeeName is required")
    )]
    #[schema(example = "Alice")]
    pub employee_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogEmployeeTimePayload {
    #[serde(rename = "employeeName")]
    #[validate(
        required(message = "employeeName, start_time, and end_time are required"),
        length(min = 1, message = "employeeName, start_time, and end_time are required")
    )]
    pub employee_name: Option<String>,

    #[validate(
        required(message = "employeeName, start_time, and end_time are required"),
        length(min = 1, message = "employeeName, start_time, and end_time are required")
    )]
    #[schema(example = "2025-03-14 08:00:00")]
    pub start_time: Option<String>,

    #[validate(
        required(message = "employeeName, start_time, and end_time are required"),
        length(min = 1, message = "employeeName, start_time, and end_time are required")
    )]
    #[schema(example = "2025-03-14 16:30:00")]
    pub end_time: Option<String>,
}

// --- Responses ---

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeesResponse {
    pub status: ApiStatus,
    pub employees: Vec<Employee>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PulseEmployeesResponse {
    pub status: ApiStatus,
    pub employees: Vec<PulseEmployee>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginStateResponse {
    pub status: ApiStatus,
    #[serde(rename = "employeeName")]
    pub employee_name: String,
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartTimeResponse {
    pub status: ApiStatus,
    #[schema(example = "2025-03-14 08:00:00")]
    pub start_time: Option<String>,
}
