//! Error types
//!
//! Defines domain-specific error types for each layer of the storage node.

use std::fmt;
use std::io;

/// Path resolver errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Identifier does not follow the `<ownerId>-<suffix>` convention
    MalformedIdentifier(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MalformedIdentifier(id) => write!(f, "Malformed file identifier: {}", id),
        }
    }
}

impl std::error::Error for PathError {}

/// Storage unit errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    DirectoryCreationFailed(String, io::Error),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::DirectoryCreationFailed(p, e) => {
                write!(f, "Could not create directory {}: {}", p, e)
            }
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Storage executor errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The pool no longer accepts work
    ShutDown,
    /// The unit was accepted but its result never came back
    WorkerLost,
    /// The unit panicked while running
    UnitPanicked(String),
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::ShutDown => write!(f, "Storage executor is shut down"),
            ExecutorError::WorkerLost => write!(f, "Unit of work was cancelled before finishing"),
            ExecutorError::UnitPanicked(msg) => write!(f, "Unit of work panicked: {}", msg),
        }
    }
}

impl std::error::Error for ExecutorError {}

/// Wire protocol errors
#[derive(Debug)]
pub enum ProtocolError {
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidLength(String),
    PayloadTooLarge { size: usize, max: usize },
    CommandTooLong(usize),
    InvalidArgument(String),
    UnexpectedResponse(String),
    Remote { code: u16, message: String },
    ConnectionClosed,
    IoError(io::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownCommand(c) => write!(f, "Unknown command: {}", c),
            ProtocolError::MissingArgument(a) => write!(f, "Missing argument: {}", a),
            ProtocolError::InvalidLength(l) => write!(f, "Invalid payload length: {}", l),
            ProtocolError::PayloadTooLarge { size, max } => {
                write!(f, "Payload of {} bytes exceeds limit of {} bytes", size, max)
            }
            ProtocolError::CommandTooLong(len) => write!(f, "Command too long: {} bytes", len),
            ProtocolError::InvalidArgument(a) => write!(f, "Invalid argument: {}", a),
            ProtocolError::UnexpectedResponse(r) => write!(f, "Unexpected response: {}", r),
            ProtocolError::Remote { code, message } => {
                write!(f, "Node replied {} {}", code, message)
            }
            ProtocolError::ConnectionClosed => write!(f, "Connection closed by peer"),
            ProtocolError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<io::Error> for ProtocolError {
    fn from(error: io::Error) -> Self {
        ProtocolError::IoError(error)
    }
}

/// General storage node error that encompasses all error types
#[derive(Debug)]
pub enum NodeError {
    Executor(ExecutorError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Executor(e) => write!(f, "Executor error: {}", e),
            NodeError::Config(e) => write!(f, "Configuration error: {}", e),
            NodeError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<ExecutorError> for NodeError {
    fn from(error: ExecutorError) -> Self {
        NodeError::Executor(error)
    }
}

impl From<config::ConfigError> for NodeError {
    fn from(error: config::ConfigError) -> Self {
        NodeError::Config(error)
    }
}

impl From<io::Error> for NodeError {
    fn from(error: io::Error) -> Self {
        NodeError::IoError(error)
    }
}
