use async_trait::async_trait;
use serde::Deserialize;

use crate::app::{EddyError, Result};
use crate::extractor::scripts;
use crate::session::{NodeHandle, Session};

/// Outcome of classifying one rendered comment node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// A comment on the post itself, with its raw text.
    TopLevel { text: String },
    /// A reply nested under another comment.
    Reply,
    /// The node has not rendered its text yet; try again next pass.
    Unclassifiable,
}

impl Classification {
    pub fn is_top_level(&self) -> bool {
        matches!(self, Classification::TopLevel { .. })
    }
}

/// Policy deciding whether a rendered comment node is top-level.
///
/// The rule depends on the feed's current rendering internals, so the engine
/// only sees this trait and the policy can be replaced independently.
#[async_trait]
pub trait NodeClassifier: Send + Sync {
    async fn classify(&self, session: &dyn Session, node: &NodeHandle) -> Result<Classification>;
}

/// Replies render their target's username as a link around or next to the
/// text, so a link ancestor of the innermost text element marks a reply.
pub struct LinkAncestorClassifier {
    script: String,
}

impl LinkAncestorClassifier {
    pub fn new(text_selector: &str) -> Self {
        Self {
            script: scripts::classify_node(text_selector),
        }
    }
}

#[async_trait]
impl NodeClassifier for LinkAncestorClassifier {
    async fn classify(&self, session: &dyn Session, node: &NodeHandle) -> Result<Classification> {
        let value = session
            .evaluate_script(&self.script, std::slice::from_ref(node))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| EddyError::Script(format!("unexpected classification result: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_top_level() {
        let c: Classification =
            serde_json::from_value(json!({ "kind": "top_level", "text": "nice" })).unwrap();
        assert_eq!(c, Classification::TopLevel { text: "nice".into() });
        assert!(c.is_top_level());
    }

    #[test]
    fn test_deserialize_reply_and_unclassifiable() {
        let reply: Classification = serde_json::from_value(json!({ "kind": "reply" })).unwrap();
        let pending: Classification =
            serde_json::from_value(json!({ "kind": "unclassifiable" })).unwrap();
        assert_eq!(reply, Classification::Reply);
        assert_eq!(pending, Classification::Unclassifiable);
        assert!(!reply.is_top_level());
        assert!(!pending.is_top_level());
    }
}
