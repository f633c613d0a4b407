//! Error handlers
//!
//! Maps errors to wire response codes and logs them.

use crate::error::types::{NodeError, ProtocolError};
use log::error;

/// Log a storage node error
pub fn handle_error(err: &NodeError) {
    error!("Storage node error: {}", err);
}

/// Convert error to a wire response code
pub fn error_to_response_code(err: &NodeError) -> u16 {
    match err {
        NodeError::Executor(_) => 451,
        NodeError::Config(_) => 500,
        NodeError::IoError(_) => 451,
    }
}

/// Convert a protocol error to a wire response code
pub fn protocol_error_code(err: &ProtocolError) -> u16 {
    match err {
        ProtocolError::UnknownCommand(_) => 500,
        ProtocolError::CommandTooLong(_) => 500,
        ProtocolError::MissingArgument(_)
        | ProtocolError::InvalidArgument(_)
        | ProtocolError::InvalidLength(_) => 501,
        ProtocolError::PayloadTooLarge { .. } => 552,
        ProtocolError::Remote { code, .. } => *code,
        ProtocolError::UnexpectedResponse(_)
        | ProtocolError::ConnectionClosed
        | ProtocolError::IoError(_) => 421,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::ExecutorError;

    #[test]
    fn test_executor_failure_maps_to_local_error() {
        for e in [ExecutorError::ShutDown, ExecutorError::WorkerLost] {
            assert_eq!(error_to_response_code(&NodeError::from(e)), 451);
        }
    }

    #[test]
    fn test_protocol_codes() {
        let err = ProtocolError::PayloadTooLarge { size: 10, max: 5 };
        assert_eq!(protocol_error_code(&err), 552);
        assert_eq!(protocol_error_code(&ProtocolError::UnknownCommand("FOO".into())), 500);
        assert_eq!(protocol_error_code(&ProtocolError::InvalidArgument("x".into())), 501);
        assert_eq!(protocol_error_code(&ProtocolError::ConnectionClosed), 421);
    }
}
