//! Scripted in-memory feed that answers the engine's probes.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use eddy::app::{EddyError, Result};
use eddy::extractor::{scripts, ExtractionConfig};
use eddy::session::{NodeHandle, Session};

#[derive(Debug, Clone)]
pub struct FakeNode {
    pub text: Option<String>,
    pub reply: bool,
    pub stale: bool,
}

pub fn top(text: &str) -> FakeNode {
    FakeNode {
        text: Some(text.to_string()),
        reply: false,
        stale: false,
    }
}

pub fn reply(text: &str) -> FakeNode {
    FakeNode {
        text: Some(text.to_string()),
        reply: true,
        stale: false,
    }
}

pub fn pending() -> FakeNode {
    FakeNode {
        text: None,
        reply: false,
        stale: false,
    }
}

pub fn stale(text: &str) -> FakeNode {
    FakeNode {
        text: Some(text.to_string()),
        reply: false,
        stale: true,
    }
}

#[derive(Debug, Default)]
struct Feed {
    location: String,
    rendered: Vec<FakeNode>,
    /// Batches revealed by the first scroll pulse of a cycle.
    on_scroll: VecDeque<Vec<FakeNode>>,
    /// Batches revealed by "load more" clicks, one per click.
    on_click: VecDeque<Vec<FakeNode>>,
    has_container: bool,
    armed: bool,
    has_comment_icon: bool,
    fail_on_pass: Option<usize>,
    stale_on_pass: Option<usize>,
    navigations: Vec<String>,
    collect_passes: usize,
    locate_calls: usize,
    pulses: usize,
    clicks: usize,
}

pub struct FakeSession {
    feed: Mutex<Feed>,
}

impl FakeSession {
    pub fn new(first_paint: Vec<FakeNode>) -> Self {
        Self {
            feed: Mutex::new(Feed {
                location: "about:blank".into(),
                rendered: first_paint,
                has_container: true,
                has_comment_icon: true,
                ..Default::default()
            }),
        }
    }

    pub fn reveal_on_scroll(self, batch: Vec<FakeNode>) -> Self {
        self.feed.lock().unwrap().on_scroll.push_back(batch);
        self
    }

    pub fn reveal_on_click(self, batch: Vec<FakeNode>) -> Self {
        self.feed.lock().unwrap().on_click.push_back(batch);
        self
    }

    pub fn without_container(self) -> Self {
        self.feed.lock().unwrap().has_container = false;
        self
    }

    pub fn without_comment_icon(self) -> Self {
        self.feed.lock().unwrap().has_comment_icon = false;
        self
    }

    /// Fail `find_nodes` with a session error on the given collecting pass (1-based).
    pub fn disconnect_on_pass(self, pass: usize) -> Self {
        self.feed.lock().unwrap().fail_on_pass = Some(pass);
        self
    }

    /// Fail `find_nodes` with a stale-node error on the given collecting pass (1-based).
    pub fn rerender_on_pass(self, pass: usize) -> Self {
        self.feed.lock().unwrap().stale_on_pass = Some(pass);
        self
    }

    pub fn collect_passes(&self) -> usize {
        self.feed.lock().unwrap().collect_passes
    }

    pub fn locate_calls(&self) -> usize {
        self.feed.lock().unwrap().locate_calls
    }

    pub fn pulses(&self) -> usize {
        self.feed.lock().unwrap().pulses
    }

    pub fn clicks(&self) -> usize {
        self.feed.lock().unwrap().clicks
    }

    pub fn navigations(&self) -> Vec<String> {
        self.feed.lock().unwrap().navigations.clone()
    }

    fn node_index(node: &NodeHandle) -> usize {
        node.id()
            .strip_prefix("node-")
            .and_then(|i| i.parse().ok())
            .unwrap_or(usize::MAX)
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&self, target: &str) -> Result<()> {
        let mut feed = self.feed.lock().unwrap();
        feed.location = target.to_string();
        feed.navigations.push(target.to_string());
        Ok(())
    }

    async fn current_location(&self) -> Result<String> {
        Ok(self.feed.lock().unwrap().location.clone())
    }

    async fn find_nodes(&self, _selector: &str) -> Result<Vec<NodeHandle>> {
        let mut feed = self.feed.lock().unwrap();
        feed.collect_passes += 1;
        if feed.fail_on_pass == Some(feed.collect_passes) {
            return Err(EddyError::Session("browser disconnected".into()));
        }
        if feed.stale_on_pass == Some(feed.collect_passes) {
            return Err(EddyError::StaleNode(
                "Cannot find context with specified id".into(),
            ));
        }
        Ok((0..feed.rendered.len())
            .map(|i| NodeHandle::new(format!("node-{i}")))
            .collect())
    }

    async fn evaluate_script(&self, script: &str, args: &[NodeHandle]) -> Result<Value> {
        let mut feed = self.feed.lock().unwrap();

        if script.contains(scripts::COUNT_NODES) {
            return Ok(json!(feed.rendered.len()));
        }
        if script.contains(scripts::CLASSIFY_NODE) {
            let index = Self::node_index(&args[0]);
            let node = feed
                .rendered
                .get(index)
                .ok_or_else(|| EddyError::StaleNode(args[0].id().to_string()))?;
            if node.stale {
                return Err(EddyError::StaleNode(args[0].id().to_string()));
            }
            return Ok(match (&node.text, node.reply) {
                (None, _) => json!({ "kind": "unclassifiable" }),
                (Some(_), true) => json!({ "kind": "reply" }),
                (Some(text), false) => json!({ "kind": "top_level", "text": text }),
            });
        }
        if script.contains(scripts::SCROLL_PULSE) {
            feed.pulses += 1;
            if feed.armed {
                feed.armed = false;
                if let Some(batch) = feed.on_scroll.pop_front() {
                    feed.rendered.extend(batch);
                }
            }
            return Ok(json!(1000));
        }
        if script.contains(scripts::CLICK_LOAD_MORE) {
            return Ok(match feed.on_click.pop_front() {
                Some(batch) => {
                    feed.clicks += 1;
                    feed.rendered.extend(batch);
                    json!("View more comments")
                }
                None => Value::Null,
            });
        }
        if script.contains(scripts::DISMISS_POPUP) {
            return Ok(json!(false));
        }
        if script.contains(scripts::OPEN_COMMENT_VIEW) {
            if !feed.has_comment_icon {
                return Ok(json!(false));
            }
            let location = format!("{}comments/", feed.location);
            feed.location = location;
            return Ok(json!(true));
        }

        Err(EddyError::Script(format!("unexpected script: {script}")))
    }

    async fn evaluate_for_node(&self, script: &str, _args: &[NodeHandle]) -> Result<Option<NodeHandle>> {
        let mut feed = self.feed.lock().unwrap();
        if script.contains(scripts::LOCATE_CONTAINER) {
            feed.locate_calls += 1;
            if feed.has_container {
                feed.armed = true;
                return Ok(Some(NodeHandle::new("container")));
            }
            return Ok(None);
        }
        Err(EddyError::Script(format!("unexpected script: {script}")))
    }
}

/// Short timings so tests run instantly under paused time.
pub fn test_config() -> ExtractionConfig {
    ExtractionConfig {
        discovery_timeout_secs: 1,
        growth_timeout_secs: 1,
        navigation_timeout_secs: 1,
        scroll_pulses: 3,
        pulse_delay_ms: 10,
        settle_delay_ms: 0,
        poll_interval_ms: 10,
        click_pause_min_ms: 0,
        click_pause_max_ms: 0,
        comment_view_marker: String::new(),
        ..Default::default()
    }
}
