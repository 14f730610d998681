//! Errors of the scatter-gather engine.
//!
//! There are two levels:
//! - [GatherError] fails a whole call, and is only returned for caller misuse
//!   (malformed arguments, a server set that is not one-to-one) before any request is sent.
//! - [FailureReason] describes why a single server is missing from a result.
//!   It never fails the call; it is recorded in the result and logged.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatherError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate server id: {0}")]
    DuplicateId(String),

    #[error("Duplicate address {address} for servers {first} and {second}")]
    DuplicateAddress {
        address: String,
        first: String,
        second: String,
    },

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Unable to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, GatherError>;

/// Why a server did not contribute to a result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Connect error, reset connection, error while reading the body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status outside of 2xx.
    #[error("http status {0}")]
    Status(u16),

    #[error("decode error: {0}")]
    Decode(String),

    /// No outcome arrived before the deadline.
    #[error("no response before deadline")]
    Timeout,
}
