//! # IO Module
//!
//! Boundary between the UI and the domain: DTO mappers plus the API
//! functions each screen calls.

pub mod mappers;
pub mod pos_api;

pub use pos_api::*;
