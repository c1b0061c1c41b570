use tracing::{debug, warn};

use crate::app::Result;
use crate::extractor::scripts;
use crate::session::{NodeHandle, Session};

/// Finds the single scrollable region holding the comment list.
pub struct ContainerLocator {
    script: String,
}

impl Default for ContainerLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLocator {
    pub fn new() -> Self {
        Self {
            script: scripts::locate_container(),
        }
    }

    /// Returns `Ok(None)` when nothing scrolls; callers skip scrolling for
    /// the cycle. Page-side failures degrade to `None`, session failures
    /// propagate.
    pub async fn find_scrollable_container(
        &self,
        session: &dyn Session,
    ) -> Result<Option<NodeHandle>> {
        match session.evaluate_for_node(&self.script, &[]).await {
            Ok(Some(node)) => {
                debug!("Located scrollable comments container");
                Ok(Some(node))
            }
            Ok(None) => Ok(None),
            Err(e) if e.is_recoverable() => {
                warn!("Scroll container probe failed: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
