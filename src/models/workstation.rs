// src/models/workstation.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::response::ApiStatus;

#[derive(Debug, Clone, FromRow)]
pub struct FacilityWorkstation {
    pub id: i64,
    pub workstation: String,
    #[sqlx(rename = "availableStations")]
    pub available_stations: Option<i64>,
}

/// A workstation together with the ordered names eligible to work it.
#[derive(Debug, Clone)]
pub struct WorkstationRoster {
    pub workstation: FacilityWorkstation,
    pub eligible: Vec<String>,
}

// Three index-aligned arrays, the shape the admin GUI consumes.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkstationsResponse {
    pub status: ApiStatus,
    #[schema(example = json!(["Scan1", "Cutting"]))]
    pub workstations: Vec<String>,
    #[serde(rename = "availableStations")]
    pub available_stations: Vec<Option<i64>>,
    #[serde(rename = "eligibleList")]
    pub eligible_list: Vec<Vec<String>>,
}

impl From<Vec<WorkstationRoster>> for WorkstationsResponse {
    fn from(rosters: Vec<WorkstationRoster>) -> Self {
        let mut workstations = Vec::with_capacity(rosters.len());
        let mut available_stations = Vec::with_capacity(rosters.len());
        let mut eligible_list = Vec::with_capacity(rosters.len());

        for roster in rosters {
            workstations.push(roster.workstation.workstation);
            available_stations.push(roster.workstation.available_stations);
            eligible_list.push(roster.eligible);
        }

        Self {
            status: ApiStatus::Success,
            workstations,
            available_stations,
            eligible_list,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveWorkstationPayload {
    #[validate(
        required(message = "Both employeeName and workstationName are required"),
        length(min = 1, message = "Both employeeName and workstationName are required")
    )]
    pub employee_name: Option<String>,

    #[validate(
        required(message = "Both employeeName and workstationName are required"),
        length(min = 1, message = "Both employeeName and workstationName are required")
    )]
    #[schema(example = "Scan1")]
    pub workstation_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOrUpdateWorkstationPayload {
    #[validate(
        required(message = "workstationName is required"),
        length(min = 1, message = "workstationName is required")
    )]
    #[schema(example = "Scan1")]
    pub workstation_name: Option<String>,

    #[validate(range(min = 0, message = "availableStations cannot be negative"))]
    #[schema(example = 2)]
    pub available_stations: Option<i64>,
}
