// src/common.rs

pub mod error;
pub mod extract;
pub mod response;
