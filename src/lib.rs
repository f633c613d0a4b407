//! RAX storage node
//!
//! One node of a distributed file-storage fleet: stores owner-scoped files
//! under a local base path and serves them to remote callers.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod service;
pub mod storage;
pub mod utils;

pub use client::NodeClient;
pub use config::{CliOverrides, NodeConfig};
pub use error::NodeError;
pub use server::Server;
pub use service::NodeFileService;
