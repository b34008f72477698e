//! Error types for the hub client.

use thiserror::Error;

/// Errors that can occur when talking to the monitoring hub.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("Request timed out")]
    Timeout,

    /// The hub returned a non-success status.
    #[error("Hub returned status {status}: {message}")]
    Http { status: u16, message: String },

    /// Unknown device or register id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failed to parse a response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether the error is a transport-level failure (as opposed to the hub
    /// rejecting the request).
    ///
    /// Callers distinguishing "retry manually later" from "fix the request"
    /// branch on this.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Connection(_) | ClientError::Timeout)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_classification() {
        assert!(ClientError::Timeout.is_network());
        assert!(ClientError::Connection("refused".to_string()).is_network());
        assert!(!ClientError::NotFound("plc 9".to_string()).is_network());
        assert!(!ClientError::Parse("bad json".to_string()).is_network());
    }
}
