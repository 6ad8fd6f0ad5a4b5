use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::api_client::SessionProvider;
use crate::errors::{Result, RosterError};

/// Bounds every backend call: a deadline, a cancellation token, and session
/// teardown when the backend rejects the credential.
#[derive(Clone)]
pub struct RequestGuard {
    session: Arc<dyn SessionProvider>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl RequestGuard {
    pub fn new(session: Arc<dyn SessionProvider>, timeout: Duration) -> Self {
        Self {
            session,
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// A guard sharing this one's session and deadline whose token is cancelled
    /// together with this one's.
    pub fn child(&self) -> Self {
        Self {
            session: self.session.clone(),
            timeout: self.timeout,
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn run<T, F>(&self, what: &str, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(RosterError::Cancelled);
        }

        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => Err(RosterError::Cancelled),
            res = tokio::time::timeout(self.timeout, request) => {
                res.unwrap_or(Err(RosterError::Timeout(self.timeout)))
            }
        };

        match &outcome {
            Err(RosterError::Auth(reason)) => {
                warn!("{what}: credential rejected, ending session");
                self.session.terminate(reason);
            }
            Err(e) => warn!("{what} failed: {e}"),
            Ok(_) => {}
        }
        outcome
    }
}
