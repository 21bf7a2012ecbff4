// src/lib.rs

use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

use crate::config::AppState;

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ORIGIN '{origin}' is not a valid header value"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(CORS_MAX_AGE))
}

/// Every HTTP route of the server, wrapped in CORS and request tracing.
pub fn build_router(app_state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&app_state.settings.cors_origin)?;

    let employee_routes = Router::new()
        .route("/api/employees", get(handlers::employees::list_employees))
        .route("/api/pulseEmployees", get(handlers::employees::pulse_employees))
        .route(
            "/api/addOrUpdateEmployee",
            post(handlers::employees::add_or_update_employee),
        )
        .route("/api/removeEmployee", post(handlers::employees::remove_employee))
        .route("/api/loggedin", post(handlers::employees::logged_in))
        .route("/api/loggedOut", post(handlers::employees::logged_out))
        .route(
            "/api/getEmployeeLoginState",
            post(handlers::employees::login_state),
        )
        .route(
            "/api/getEmployeeStartTime",
            post(handlers::employees::start_time),
        )
        .route(
            "/api/logEmployeeTime",
            post(handlers::employees::log_employee_time),
        );

    let workstation_routes = Router::new()
        .route(
            "/api/facilityWorkstations",
            get(handlers::workstations::facility_workstations),
        )
        .route(
            "/api/addOrUpdateWorkstation",
            post(handlers::workstations::add_or_update_workstation),
        )
        .route(
            "/api/removeWorkstation",
            post(handlers::workstations::remove_workstation),
        );

    let task_routes = Router::new()
        .route("/api/manualTasks", get(handlers::tasks::manual_tasks))
        .route("/api/employeesTasks", get(handlers::tasks::employees_tasks))
        .route(
            "/api/updateEmployeeTask",
            post(handlers::tasks::update_employee_task),
        )
        .route("/api/editTasks", post(handlers::tasks::edit_tasks));

    let product_code_routes = Router::new()
        .route(
            "/api/fetchProdCodes",
            get(handlers::product_codes::fetch_prod_codes),
        )
        .route("/api/addProdCode", post(handlers::product_codes::add_prod_code));

    let tracking_routes = Router::new()
        .route("/api/orderTrack", get(handlers::tracking::order_track))
        .route(
            "/api/receivePrintData",
            get(handlers::tracking::receive_print_data),
        )
        .route("/api/moveContainer", get(handlers::tracking::move_container))
        .route(
            "/api/nextContainerID",
            get(handlers::tracking::next_container_id),
        )
        .route(
            "/api/getTrackingHistory",
            post(handlers::tracking::tracking_history),
        );

    // Paths stay flat (no nest) so the 405 fallback reaches every route.
    Ok(Router::new()
        .route("/api/health", get(handlers::system::health))
        .route("/api-docs/openapi.json", get(handlers::system::openapi_json))
        .merge(employee_routes)
        .merge(workstation_routes)
        .merge(task_routes)
        .merge(product_code_routes)
        .merge(tracking_routes)
        .fallback(handlers::system::endpoint_not_found)
        .method_not_allowed_fallback(handlers::system::method_not_allowed)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
