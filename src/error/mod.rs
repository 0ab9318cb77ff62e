//! Error handling
//!
//! Defines error types and handling for the storage core.

pub mod handlers;
pub mod types;

pub use types::*;
