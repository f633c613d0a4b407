//! File system storage management
//!
//! Path derivation for file identifiers, the blocking file operations, and
//! the bounded executor that runs them.

pub mod executor;
pub mod operations;
pub mod paths;

pub use executor::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT, StorageExecutor, UnitHandle};
pub use paths::{FilePath, file_path, owner_directory, resolve_owner};
