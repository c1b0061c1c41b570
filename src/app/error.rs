use thiserror::Error;

#[derive(Error, Debug)]
pub enum EddyError {
    /// The browser session itself failed: navigation error, disconnect, CDP failure.
    #[error("Session error: {0}")]
    Session(String),

    /// A node handle no longer refers to a live element.
    #[error("Stale node: {0}")]
    StaleNode(String),

    /// A probe script threw inside the page.
    #[error("Script error: {0}")]
    Script(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid post reference: {0}")]
    InvalidPost(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EddyError {
    /// Errors that only invalidate the current node or probe, never the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EddyError::StaleNode(_) | EddyError::Script(_) | EddyError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EddyError>;
