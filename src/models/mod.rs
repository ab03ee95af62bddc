// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod content;
pub mod place;
pub mod user;

pub use content::*;
pub use place::*;
pub use user::*;
