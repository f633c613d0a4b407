//! Error handling
//!
//! Defines error types and handling for the storage node.

pub mod handlers;
pub mod types;

pub use types::*;
