//! The structs
//!
use std::time::Duration;
use crate::error::FailureReason;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issue a GET request that completes, fails or gives up within `timeout`.
///
/// Implementations are shared between the worker threads of a call.
/// Any resources held for a request (such as a pooled connection) must be released
/// when the function returns, whether it succeeded, failed or timed out.
pub trait Transport: Send + Sync + 'static {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<RawResponse, FailureReason>;
}

/// [Transport] over http, using a blocking reqwest client with a connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    pub(super) client: reqwest::blocking::Client,
}
