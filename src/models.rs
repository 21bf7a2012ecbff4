// src/models.rs

pub mod employee;
pub mod product_code;
pub mod task;
pub mod tracking;
pub mod workstation;
