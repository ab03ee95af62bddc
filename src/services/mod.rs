// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod place_service;
pub mod response;

pub use place_service::*;
pub use response::*;
