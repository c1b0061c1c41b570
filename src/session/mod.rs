//! Browser automation session used by the extraction engine.
//!
//! The engine only talks to a live page through the [`Session`] trait, so the
//! same loop runs against Chrome ([`ChromeSession`]) or a scripted fake in
//! tests. Probe scripts are JavaScript function declarations; node arguments
//! are passed positionally and the first one is also bound to `this`.

mod chrome;
mod config;

pub use chrome::ChromeSession;
pub use config::BrowserSettings;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::app::Result;

/// Opaque reference to a rendered element, valid only until the document
/// re-renders. Never keep one past the cycle in which it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle(String);

impl NodeHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Operations the engine needs from a browser automation session.
///
/// Implementations map driver failures to [`EddyError::Session`], invalidated
/// handles to [`EddyError::StaleNode`] and page-side exceptions to
/// [`EddyError::Script`].
///
/// [`EddyError::Session`]: crate::app::EddyError::Session
/// [`EddyError::StaleNode`]: crate::app::EddyError::StaleNode
/// [`EddyError::Script`]: crate::app::EddyError::Script
#[async_trait]
pub trait Session: Send + Sync {
    /// Navigate the page to `target` and wait for the load to settle.
    async fn navigate(&self, target: &str) -> Result<()>;

    /// URL the page currently shows.
    async fn current_location(&self) -> Result<String>;

    /// All elements currently matching a CSS selector, in document order.
    async fn find_nodes(&self, selector: &str) -> Result<Vec<NodeHandle>>;

    /// Call a function declaration in the page and return its JSON result.
    async fn evaluate_script(&self, script: &str, args: &[NodeHandle]) -> Result<serde_json::Value>;

    /// Call a function declaration that returns an element (or null).
    async fn evaluate_for_node(&self, script: &str, args: &[NodeHandle]) -> Result<Option<NodeHandle>>;
}

/// Poll `predicate` until it holds or `timeout` elapses.
///
/// Returns `Ok(false)` on timeout. Recoverable errors count as "not yet";
/// session-level errors are returned.
pub async fn wait_until<F, Fut>(timeout: Duration, poll: Duration, mut predicate: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let polling = async {
        loop {
            match predicate().await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) if e.is_recoverable() => debug!("wait predicate failed, retrying: {}", e),
                Err(e) => return Err(e),
            }
            tokio::time::sleep(poll).await;
        }
    };

    match tokio::time::timeout(timeout, polling).await {
        Ok(result) => result,
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EddyError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_succeeds_after_polls() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let ok = wait_until(Duration::from_secs(5), Duration::from_millis(100), move || async move {
            Ok::<_, EddyError>(counter.fetch_add(1, Ordering::SeqCst) >= 3)
        })
        .await
        .unwrap();
        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_times_out_without_error() {
        let ok = wait_until(Duration::from_secs(1), Duration::from_millis(100), || async {
            Ok::<_, EddyError>(false)
        })
        .await
        .unwrap();
        assert!(!ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_retries_recoverable_errors() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let ok = wait_until(Duration::from_secs(5), Duration::from_millis(100), move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(EddyError::StaleNode("re-rendered".into()))
            } else {
                Ok(true)
            }
        })
        .await
        .unwrap();
        assert!(ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_propagates_session_errors() {
        let result = wait_until(Duration::from_secs(5), Duration::from_millis(100), || async {
            Err::<bool, _>(EddyError::Session("disconnected".into()))
        })
        .await;
        assert!(matches!(result, Err(EddyError::Session(_))));
    }

    #[test]
    fn test_node_handle_id() {
        let node = NodeHandle::new("obj-1");
        assert_eq!(node.id(), "obj-1");
    }
}
