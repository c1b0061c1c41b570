use std::slice;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::app::{EddyError, Result};
use crate::domain::{CommentSet, Extraction, PostRef, Progress, StopReason};
use crate::extractor::classifier::{Classification, LinkAncestorClassifier, NodeClassifier};
use crate::extractor::config::ExtractionConfig;
use crate::extractor::container::ContainerLocator;
use crate::extractor::pagination::PaginationTrigger;
use crate::extractor::scripts;
use crate::normalizer::normalize;
use crate::session::{wait_until, NodeHandle, Session};

/// A session-level failure, carrying whatever was collected before it.
#[derive(Debug, thiserror::Error)]
#[error("Extraction of {post} failed after collecting {} comments: {source}", .partial.len())]
pub struct ExtractionFailure {
    pub post: PostRef,
    /// Comments collected before the failure, caption excluded.
    pub partial: Vec<String>,
    #[source]
    pub source: EddyError,
}

enum Phase {
    Discovering,
    Collecting,
    Scrolling,
    Done(StopReason),
}

/// Mutable state of one post's extraction. Created per run, never shared.
struct ExtractionState {
    collected: CommentSet,
    consecutive_stall_cycles: usize,
    total_scroll_cycles: usize,
    /// Comment nodes rendered at the last collecting pass.
    rendered_nodes: usize,
    deadline: Option<Instant>,
    started_at: DateTime<Utc>,
}

impl ExtractionState {
    fn new(deadline: Option<Instant>) -> Self {
        Self {
            collected: CommentSet::new(),
            consecutive_stall_cycles: 0,
            total_scroll_cycles: 0,
            rendered_nodes: 0,
            deadline,
            started_at: Utc::now(),
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// The scroll-collect loop: discovers the comment list, then alternates
/// between collecting rendered top-level comments and scrolling for more
/// until the set stops growing.
pub struct Extractor {
    config: ExtractionConfig,
    classifier: Box<dyn NodeClassifier>,
    locator: ContainerLocator,
    trigger: PaginationTrigger,
    count_script: String,
    pulse_script: String,
    progress: Option<UnboundedSender<Progress>>,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let classifier = Box::new(LinkAncestorClassifier::new(&config.text_selector));
        let trigger = PaginationTrigger::new(&config);
        let count_script = scripts::count_nodes(&config.comment_selector);
        Self {
            config,
            classifier,
            locator: ContainerLocator::new(),
            trigger,
            count_script,
            pulse_script: scripts::scroll_pulse(),
            progress: None,
        }
    }

    /// Replace the top-level/reply policy.
    pub fn with_classifier(mut self, classifier: Box<dyn NodeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Send a [`Progress`] after every collecting pass.
    pub fn with_progress(mut self, tx: UnboundedSender<Progress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract all top-level comments of `post`.
    ///
    /// The session must already be authenticated; it is left open.
    pub async fn extract(
        &self,
        session: &dyn Session,
        post: &PostRef,
    ) -> std::result::Result<Extraction, ExtractionFailure> {
        self.run(session, post, None).await
    }

    /// Like [`extract`](Self::extract) but stops at `deadline`, keeping what
    /// was collected so far.
    pub async fn extract_until(
        &self,
        session: &dyn Session,
        post: &PostRef,
        deadline: Instant,
    ) -> std::result::Result<Extraction, ExtractionFailure> {
        self.run(session, post, Some(deadline)).await
    }

    async fn run(
        &self,
        session: &dyn Session,
        post: &PostRef,
        deadline: Option<Instant>,
    ) -> std::result::Result<Extraction, ExtractionFailure> {
        let mut state = ExtractionState::new(deadline);

        match self.drive(session, post, &mut state).await {
            Ok(reason) => {
                let extraction = Extraction::from_collected(
                    post.clone(),
                    state.collected,
                    state.total_scroll_cycles,
                    reason,
                    state.started_at,
                );
                info!(
                    post = %post,
                    comments = extraction.len(),
                    cycles = extraction.scroll_cycles,
                    reason = ?reason,
                    "Finished extracting top-level comments (caption excluded)"
                );
                Ok(extraction)
            }
            Err(source) => {
                let (_, partial) = state.collected.into_caption_and_comments();
                Err(ExtractionFailure {
                    post: post.clone(),
                    partial,
                    source,
                })
            }
        }
    }

    async fn drive(
        &self,
        session: &dyn Session,
        post: &PostRef,
        state: &mut ExtractionState,
    ) -> Result<StopReason> {
        if !self.open_comment_view(session, post).await? {
            return Ok(StopReason::CommentViewUnavailable);
        }

        let mut phase = Phase::Discovering;
        loop {
            phase = match phase {
                Phase::Discovering => self.discover(session).await?,
                Phase::Collecting => self.collect(session, state).await?,
                Phase::Scrolling => self.scroll(session, state).await?,
                Phase::Done(reason) => return Ok(reason),
            };
        }
    }

    /// Navigate to the post and make sure its comment view is showing.
    async fn open_comment_view(&self, session: &dyn Session, post: &PostRef) -> Result<bool> {
        session.navigate(post.as_str()).await?;

        let marker = self.config.comment_view_marker.as_str();
        if marker.is_empty() {
            return Ok(true);
        }
        if session.current_location().await?.contains(marker) {
            info!("Already on the comment view");
            return Ok(true);
        }

        if !self.config.dismiss_selectors.is_empty() {
            let dismiss = scripts::dismiss_popup(&self.config.dismiss_selectors);
            match session.evaluate_script(&dismiss, &[]).await {
                Ok(serde_json::Value::Bool(true)) => info!("Popup dismissed"),
                Ok(_) => debug!("No popup detected"),
                Err(e) if e.is_recoverable() => debug!("Popup dismissal failed: {}", e),
                Err(e) => return Err(e),
            }
        }

        let open = scripts::open_comment_view(&self.config.comment_icon_selector);
        let open = open.as_str();
        let timeout = self.config.navigation_timeout();
        let poll = self.config.poll_interval();

        if !wait_until(timeout, poll, move || script_is_true(session, open)).await? {
            warn!("Could not find the comments icon");
            return Ok(false);
        }
        if !wait_until(timeout, poll, move || location_contains(session, marker)).await? {
            warn!("Comment view did not open within {:?}", timeout);
            return Ok(false);
        }

        info!("Navigated to the comment view");
        Ok(true)
    }

    async fn discover(&self, session: &dyn Session) -> Result<Phase> {
        let script = self.count_script.as_str();
        let found = wait_until(
            self.config.discovery_timeout(),
            self.config.poll_interval(),
            move || count_exceeds(session, script, 0),
        )
        .await?;

        if found {
            info!("Comment containers detected, starting scroll-collect loop");
            Ok(Phase::Collecting)
        } else {
            info!(
                "No comment nodes within {:?}, treating post as having no comments",
                self.config.discovery_timeout()
            );
            Ok(Phase::Done(StopReason::NoComments))
        }
    }

    async fn collect(&self, session: &dyn Session, state: &mut ExtractionState) -> Result<Phase> {
        let nodes = match session.find_nodes(&self.config.comment_selector).await {
            Ok(nodes) => nodes,
            Err(e) if e.is_recoverable() => {
                debug!("Document re-rendered during lookup, counting an empty pass: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let before = state.collected.len();
        let mut skipped = 0;

        for node in &nodes {
            match self.classifier.classify(session, node).await {
                Ok(Classification::TopLevel { text }) => {
                    state.collected.insert(normalize(&text));
                }
                Ok(Classification::Reply) => {}
                Ok(Classification::Unclassifiable) => skipped += 1,
                Err(e) if e.is_recoverable() => {
                    debug!("Skipping node for this pass: {}", e);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        // An empty pass keeps the previous growth baseline
        if !nodes.is_empty() {
            state.rendered_nodes = nodes.len();
        }

        let collected = state.collected.len();
        info!(
            nodes = nodes.len(),
            skipped,
            "After scanning visible content, found {} unique comments",
            collected
        );

        if collected == before {
            state.consecutive_stall_cycles += 1;
            info!(
                "No new unique comments. Stall count: {}/{}",
                state.consecutive_stall_cycles, self.config.stall_threshold
            );
        } else {
            state.consecutive_stall_cycles = 0;
        }

        if let Some(tx) = &self.progress {
            let _ = tx.send(Progress {
                cycle: state.total_scroll_cycles,
                collected,
                stalls: state.consecutive_stall_cycles,
            });
        }

        if state.consecutive_stall_cycles >= self.config.stall_threshold.max(1) {
            info!("Reached max stall count, ending scroll");
            return Ok(Phase::Done(StopReason::Stalled));
        }
        if state.total_scroll_cycles >= self.config.max_scroll_cycles {
            info!("Reached scroll cycle limit of {}", self.config.max_scroll_cycles);
            return Ok(Phase::Done(StopReason::CycleLimit));
        }
        if state.deadline_passed() {
            warn!("Deadline reached, returning what was collected");
            return Ok(Phase::Done(StopReason::Deadline));
        }
        Ok(Phase::Scrolling)
    }

    async fn scroll(&self, session: &dyn Session, state: &mut ExtractionState) -> Result<Phase> {
        match self.locator.find_scrollable_container(session).await? {
            Some(container) => self.pulse(session, &container).await?,
            None => warn!("Could not find a scrollable container, relying on pagination this cycle"),
        }

        let script = self.count_script.as_str();
        let baseline = state.rendered_nodes;
        let grew = wait_until(
            self.config.growth_timeout(),
            self.config.poll_interval(),
            move || count_exceeds(session, script, baseline),
        )
        .await?;
        if grew {
            info!("New comments loaded after scroll");
        } else {
            info!(
                "Waited {:?} after scroll, no new comments loaded",
                self.config.growth_timeout()
            );
        }
        tokio::time::sleep(self.config.settle_delay()).await;

        self.trigger
            .click_load_more(session, state.total_scroll_cycles + 1)
            .await?;

        state.total_scroll_cycles += 1;
        info!("Performed {} scroll cycles", state.total_scroll_cycles);
        Ok(Phase::Collecting)
    }

    /// Jump the container to its bottom repeatedly to coax lazy content out.
    async fn pulse(&self, session: &dyn Session, container: &NodeHandle) -> Result<()> {
        for _ in 0..self.config.scroll_pulses {
            match session
                .evaluate_script(&self.pulse_script, slice::from_ref(container))
                .await
            {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    debug!("Scroll container went stale: {}", e);
                    break;
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(self.config.pulse_delay()).await;
        }
        Ok(())
    }
}

async fn count_exceeds(session: &dyn Session, script: &str, baseline: usize) -> Result<bool> {
    let count = session.evaluate_script(script, &[]).await?;
    let count = count
        .as_u64()
        .or_else(|| count.as_f64().map(|n| n as u64))
        .unwrap_or(0);
    Ok(count > baseline as u64)
}

async fn script_is_true(session: &dyn Session, script: &str) -> Result<bool> {
    Ok(session.evaluate_script(script, &[]).await? == serde_json::Value::Bool(true))
}

async fn location_contains(session: &dyn Session, marker: &str) -> Result<bool> {
    Ok(session.current_location().await?.contains(marker))
}
