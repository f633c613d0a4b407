//! Storage node wire protocol
//!
//! Handles command parsing, dispatch, and response framing.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, parse_command};
pub use handlers::handle_command;
pub use responses::Response;
