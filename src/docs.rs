// src/docs.rs

use utoipa::OpenApi;

use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ally production tracking API",
        description = "Shop-floor staff, workstations, tasks and barcode tracking"
    ),
    paths(
        // --- Employees ---
        handlers::employees::list_employees,
        handlers::employees::pulse_employees,
        handlers::employees::add_or_update_employee,
        handlers::employees::remove_employee,

        // --- Shifts ---
        handlers::employees::logged_in,
        handlers::employees::logged_out,
        handlers::employees::login_state,
        handlers::employees::start_time,
        handlers::employees::log_employee_time,

        // --- Workstations ---
        handlers::workstations::facility_workstations,
        handlers::workstations::add_or_update_workstation,
        handlers::workstations::remove_workstation,

        // --- Tasks ---
        handlers::tasks::manual_tasks,
        handlers::tasks::employees_tasks,
        handlers::tasks::update_employee_task,
        handlers::tasks::edit_tasks,

        // --- Product codes ---
        handlers::product_codes::fetch_prod_codes,
        handlers::product_codes::add_prod_code,

        // --- Tracking ---
        handlers::tracking::order_track,
        handlers::tracking::receive_print_data,
        handlers::tracking::move_container,
        handlers::tracking::next_container_id,
        handlers::tracking::tracking_history,

        // --- System ---
        handlers::system::health,
    ),
    components(
        schemas(
            // --- Envelopes ---
            common::response::ApiStatus,
            common::response::MessageResponse,
            common::response::QueuedResponse,
            common::response::ErrorResponse,
            common::response::StatusResponse,

            // --- Employees ---
            models::employee::Employee,
            models::employee::PulseEmployee,
            models::employee::AddOrUpdateEmployeePayload,
            models::employee::EmployeeNamePayload,
            models::employee::LogEmployeeTimePayload,
            models::employee::EmployeesResponse,
            models::employee::PulseEmployeesResponse,
            models::employee::LoginStateResponse,
            models::employee::StartTimeResponse,

            // --- Workstations ---
            models::workstation::WorkstationsResponse,
            models::workstation::AddOrUpdateWorkstationPayload,
            models::workstation::RemoveWorkstationPayload,

            // --- Tasks ---
            models::task::UpdateEmployeeTaskPayload,
            models::task::EditTasksPayload,
            models::task::ManualTasksResponse,
            models::task::EmployeeTasksResponse,

            // --- Product codes ---
            models::product_code::ProdCodesResponse,
            models::product_code::AddProdCodePayload,

            // --- Tracking ---
            models::tracking::TrackingHistoryPayload,
            models::tracking::TrackingHistoryResponse,
            models::tracking::NextContainerIdResponse,
        )
    ),
    tags(
        (name = "Employees", description = "Staff records and app access"),
        (name = "Shifts", description = "Login state and worked time"),
        (name = "Workstations", description = "Facility workstations and eligibility"),
        (name = "Tasks", description = "Manual tasks and live employee tasks"),
        (name = "Product codes", description = "prodType to worksheet mapping"),
        (name = "Tracking", description = "Barcode scans, print data and container history"),
        (name = "System", description = "Health and API description")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/employees",
            "/api/logEmployeeTime",
            "/api/facilityWorkstations",
            "/api/updateEmployeeTask",
            "/api/addProdCode",
            "/api/orderTrack",
            "/api/getTrackingHistory",
            "/api/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
