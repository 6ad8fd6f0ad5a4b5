use std::time::Duration;

use thiserror::Error;

/// Crate-wide error type for roster fetches, candidate mutations and resume intake.
///
/// Nothing in the crate retries automatically: every failure is returned to the
/// caller, which decides whether the user repeats the action.
#[derive(Debug, Clone, Error)]
pub enum RosterError {
    /// Transport failure, non-2xx response or an undecodable body.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Credential missing or rejected. Terminal for the current session.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Input rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Request cancelled")]
    Cancelled,
}

pub type Result<T, E = RosterError> = std::result::Result<T, E>;

impl RosterError {
    /// True for the recoverable class the UI reports as "try again".
    pub fn is_network(&self) -> bool {
        matches!(self, RosterError::Network(_) | RosterError::Timeout(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, RosterError::Auth(_))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        RosterError::Validation(msg.into())
    }
}

impl From<reqwest::Error> for RosterError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            tracing::warn!("HTTP transport timeout: {e}");
        }
        RosterError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(e: serde_json::Error) -> Self {
        RosterError::Network(format!("Malformed response body: {e}"))
    }
}
