// src/models/task.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::response::ApiStatus;

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeTask {
    #[sqlx(rename = "employeeName")]
    pub employee_name: String,
    #[sqlx(rename = "liveTask")]
    pub live_task: Option<String>,
    pub status: Option<String>,
    pub isobarcode: Option<String>,
}

impl EmployeeTask {
    // [employeeName, liveTask, status, isobarcode]
    pub fn into_row(self) -> Vec<Option<String>> {
        vec![
            Some(self.employee_name),
            self.live_task,
            self.status,
            self.isobarcode,
        ]
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeTaskPayload {
    #[validate(
        required(message = "employeeName is required"),
        length(min = 1, message = "employeeName is required")
    )]
    pub employee_name: Option<String>,

    #[schema(example = "Cutting")]
    pub live_task: Option<String>,

    #[schema(example = "in progress")]
    pub status: Option<String>,

    // Lower-case on the wire, as the scanner clients send it.
    #[serde(rename = "isobarcode")]
    #[schema(example = "o1234567890")]
    pub isobarcode: Option<String>,

    #[serde(default)]
    pub erase: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditTasksPayload {
    #[validate(
        required(message = "taskName (string) and editFlag (boolean) are required"),
        length(min = 1, message = "taskName (string) and editFlag (boolean) are required")
    )]
    #[schema(example = "Sweep floor")]
    pub task_name: Option<String>,

    #[validate(required(message = "taskName (string) and editFlag (boolean) are required"))]
    pub edit_flag: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ManualTasksResponse {
    pub status: ApiStatus,
    pub tasks: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeTasksResponse {
    pub status: ApiStatus,
    pub tasks: Vec<Vec<Option<String>>>,
}
