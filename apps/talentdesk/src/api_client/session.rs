use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tracing::warn;

/// Supplies the bearer credential and owns session teardown.
///
/// The roster never stores credentials itself; it asks for one per request and
/// calls `terminate` when the backend rejects it, leaving the redirect to login
/// to whoever implements this trait.
pub trait SessionProvider: Send + Sync {
    fn credential(&self) -> Option<String>;

    fn terminate(&self, reason: &str);
}

/// A session holding a single token, cleared on termination.
#[derive(Debug, Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
    terminated: AtomicBool,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            terminated: AtomicBool::new(false),
        }
    }

    /// A session that never had a credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl SessionProvider for StaticSession {
    fn credential(&self) -> Option<String> {
        match self.token.read() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn terminate(&self, reason: &str) {
        warn!("Session terminated: {reason}");
        self.terminated.store(true, Ordering::SeqCst);
        match self.token.write() {
            Ok(mut token) => *token = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}
