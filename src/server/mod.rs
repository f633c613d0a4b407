//! Node server
//!
//! Accepts remote callers and serves the node's operation table over TCP.

pub mod core;

pub use core::Server;
