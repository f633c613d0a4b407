//! Node file service
//!
//! The operation table a storage node exposes to remote callers.

pub mod inert;
pub mod node;

pub use inert::InertOperation;
pub use node::NodeFileService;
