// src/services.rs

pub mod history;
pub mod prod_type;
pub mod tracking_engine;
pub mod tracking_queue;
pub mod maintenance;

pub mod employee_service;
pub use employee_service::EmployeeService;
pub mod workstation_service;
pub use workstation_service::WorkstationService;
pub mod task_service;
pub use task_service::TaskService;
pub mod product_code_service;
pub use product_code_service::ProductCodeService;
pub mod tracking_service;
pub use tracking_service::TrackingService;
