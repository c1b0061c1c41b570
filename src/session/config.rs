use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for launching the Chrome session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Chrome profile directory. Point this at a profile that is already
    /// logged in to reuse its cookies.
    pub user_data_dir: Option<PathBuf>,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Window width in pixels (default: 430)
    pub window_width: u32,

    /// Window height in pixels (default: 930)
    pub window_height: u32,

    /// Timeout for a single CDP request in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Extra command-line switches passed to Chrome
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            user_data_dir: None,
            user_agent: Some(
                "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1"
                    .to_string(),
            ),
            window_width: 430,
            window_height: 930,
            request_timeout_secs: 30,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserSettings {
    /// Get the CDP request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
