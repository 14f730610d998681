//! The impls and functions
//!
use std::time::Duration;
use log::*;
use anyhow::{Context, Result};
use crate::error::FailureReason;
use crate::transport::{HttpTransport, RawResponse, Transport};

impl HttpTransport {
    /// Create the client with its connection pool.
    ///
    /// Please mind a blocking reqwest client must not be created or dropped on a thread that runs async code.
    pub fn new(
        connect_timeout: Duration,
        max_idle_per_host: usize,
    ) -> Result<Self>
    {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(max_idle_per_host)
            .build()
            .with_context(|| "Unable to create http client")?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<RawResponse, FailureReason>
    {
        // the request timeout covers connecting, sending and reading the body.
        let response = self.client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(failure_reason)?;
        let status = response.status();
        if !status.is_success() {
            // the response is dropped unread, which closes the connection.
            debug!("Non success response: {} = {}", url, status);
            return Ok(RawResponse { status: status.as_u16(), body: String::new() });
        }
        debug!("Success response: {} = {}", url, status);
        let body = response.text().map_err(failure_reason)?;
        Ok(RawResponse { status: status.as_u16(), body })
    }
}

fn failure_reason(error: reqwest::Error) -> FailureReason {
    if error.is_timeout() {
        FailureReason::Timeout
    } else {
        FailureReason::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn unit_refused_connection_is_a_transport_failure() {
        // bind to get a free port, then close it again, so the connect is refused.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(Duration::from_millis(500), 4).unwrap();
        let result = transport.get(&format!("http://127.0.0.1:{}/table/t1/size", port), Duration::from_secs(2));
        assert!(matches!(result, Err(FailureReason::Transport(_))), "{:?}", result);
    }

    #[test]
    fn unit_silent_server_times_out() {
        // the listener accepts in the backlog, but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = HttpTransport::new(Duration::from_millis(500), 4).unwrap();
        let result = transport.get(&format!("http://127.0.0.1:{}/table/t1/size", port), Duration::from_millis(200));
        assert_eq!(result, Err(FailureReason::Timeout));
        drop(listener);
    }
}
