//! Seams to the host environment: editor navigation, command execution and
//! popup dismissal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::CandidateItem;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait NavigationHost: Send + Sync {
    async fn go_to_file(&self, item: &CandidateItem) -> Result<(), HostError>;
    async fn go_to_symbol(&self, item: &CandidateItem) -> Result<(), HostError>;
}

#[async_trait]
pub trait CommandHost: Send + Sync {
    async fn execute(&self, invocation_token: &str) -> Result<(), HostError>;
}

/// Told when the popup must go away.
pub trait DismissalHost: Send + Sync {
    fn dismiss(&self, reason: CloseReason);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Committed,
    Cancelled,
    FocusLost,
}

/// Shared flag tripped by whoever wants the session gone (e.g. a focus-loss
/// watcher). Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Host that accepts everything and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

#[async_trait]
impl NavigationHost for NoopHost {
    async fn go_to_file(&self, _item: &CandidateItem) -> Result<(), HostError> {
        Ok(())
    }

    async fn go_to_symbol(&self, _item: &CandidateItem) -> Result<(), HostError> {
        Ok(())
    }
}

#[async_trait]
impl CommandHost for NoopHost {
    async fn execute(&self, _invocation_token: &str) -> Result<(), HostError> {
        Ok(())
    }
}

impl DismissalHost for NoopHost {
    fn dismiss(&self, _reason: CloseReason) {}
}

/// The three collaborators a session talks to.
#[derive(Clone)]
pub struct Hosts {
    pub navigation: Arc<dyn NavigationHost>,
    pub commands: Arc<dyn CommandHost>,
    pub dismissal: Arc<dyn DismissalHost>,
}

impl Hosts {
    pub fn new(
        navigation: Arc<dyn NavigationHost>,
        commands: Arc<dyn CommandHost>,
        dismissal: Arc<dyn DismissalHost>,
    ) -> Self {
        Self {
            navigation,
            commands,
            dismissal,
        }
    }

    /// One object playing every role.
    pub fn shared<H>(host: Arc<H>) -> Self
    where
        H: NavigationHost + CommandHost + DismissalHost + 'static,
    {
        Self {
            navigation: host.clone(),
            commands: host.clone(),
            dismissal: host,
        }
    }

    pub fn noop() -> Self {
        Self::shared(Arc::new(NoopHost))
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let watcher = token.clone();
        assert!(!watcher.is_cancelled());
        token.cancel();
        assert!(watcher.is_cancelled());
    }
}
