// src/handlers.rs

pub mod employees;
pub mod product_codes;
pub mod system;
pub mod tasks;
pub mod tracking;
pub mod workstations;
