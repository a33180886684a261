//! Client error types.

use lockstep_wire::{ErrorCode, RequestId, WireError};
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error on the underlying stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire protocol error.
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// The server reported an operation failure.
    #[error("server error ({code}): {message}")]
    Server { code: ErrorCode, message: String },

    /// The server closed the connection mid-response.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// No response arrived within the configured read timeout.
    #[error("timed out waiting for a response")]
    Timeout,

    /// The response id does not match the request that was sent.
    #[error("response id {actual} does not match request id {expected}")]
    RequestIdMismatch {
        expected: RequestId,
        actual: RequestId,
    },

    /// The response payload shape does not fit the operation.
    #[error("unexpected response payload for {operation}")]
    UnexpectedResponse { operation: &'static str },
}
