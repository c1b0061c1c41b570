use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CommentSet, PostRef};

/// Why an extraction run reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No comment node appeared within the discovery timeout.
    NoComments,
    /// The stall threshold of consecutive no-growth passes was reached.
    Stalled,
    /// The configured maximum number of scroll cycles was performed.
    CycleLimit,
    /// The caller-supplied deadline passed.
    Deadline,
    /// The post's comment view could not be opened.
    CommentViewUnavailable,
}

/// Per-cycle progress signal, emitted after every collecting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub cycle: usize,
    pub collected: usize,
    pub stalls: usize,
}

/// Final result of extracting one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub post: PostRef,
    /// Top-level comments in first-seen order, caption excluded.
    pub comments: Vec<String>,
    /// The first collected item, assumed to be the post caption.
    pub caption: Option<String>,
    pub scroll_cycles: usize,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Extraction {
    pub fn from_collected(
        post: PostRef,
        collected: CommentSet,
        scroll_cycles: usize,
        stop_reason: StopReason,
        started_at: DateTime<Utc>,
    ) -> Self {
        let (caption, comments) = collected.into_caption_and_comments();
        Self {
            post,
            comments,
            caption,
            scroll_cycles,
            stop_reason,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}
