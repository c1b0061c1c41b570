//! Configuration management for eddy.
//!
//! Configuration is read from `~/.config/eddy/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::extractor::ExtractionConfig;
use crate::session::BrowserSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserSettings,
    pub extraction: ExtractionConfig,
    pub output: OutputSettings,
}

/// How a batch of posts is paced and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Minimum random delay between posts in seconds (default: 15)
    pub post_delay_min_secs: u64,

    /// Maximum random delay between posts in seconds (default: 30)
    pub post_delay_max_secs: u64,

    /// Per-post time budget in seconds; 0 disables it (default: 600)
    pub post_timeout_secs: u64,

    /// Directory for per-post JSON files; stdout when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            post_delay_min_secs: 15,
            post_delay_max_secs: 30,
            post_timeout_secs: 600,
            output_dir: None,
        }
    }
}

impl OutputSettings {
    pub fn post_delay_range(&self) -> RangeInclusive<u64> {
        let min = self.post_delay_min_secs;
        min..=self.post_delay_max_secs.max(min)
    }

    pub fn post_timeout(&self) -> Option<std::time::Duration> {
        (self.post_timeout_secs > 0).then(|| std::time::Duration::from_secs(self.post_timeout_secs))
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            // Create default config with comments
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/eddy/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("eddy").join("config.toml"))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# eddy configuration
#
# Timings were tuned by hand against a UI that changes over time.
# Missing keys fall back to the built-in defaults.

[browser]
# Run browser in headless mode (no visible window)
headless = true

# Reuse a logged-in Chrome profile
# user_data_dir = "/home/me/.config/eddy/chrome-profile"

window_width = 430
window_height = 930
request_timeout_secs = 30

[extraction]
# One rendered comment node, and the text element inside it
comment_selector = "div.x1lliihq"
text_selector = "span._ap3a"

# Consecutive passes without new comments before giving up
stall_threshold = 3
max_scroll_cycles = 50

# Waits (seconds)
discovery_timeout_secs = 10
growth_timeout_secs = 10
navigation_timeout_secs = 10

# Scroll pulses per cycle and the pause between them (milliseconds)
scroll_pulses = 30
pulse_delay_ms = 700
settle_delay_ms = 1500
poll_interval_ms = 250

# "Load more" affordances
load_more_labels = ["View more comments", "Load more", "View more"]
click_pause_min_ms = 1000
click_pause_max_ms = 2000
max_clicks_per_cycle = 20

# Comment view navigation; set the marker to "" to disable
comment_view_marker = "/comments/"
comment_icon_selector = "svg[aria-label=\"Comment\"]"
dismiss_selectors = ["svg[aria-label=\"Close\"]"]

[output]
# Random pause between posts (seconds)
post_delay_min_secs = 15
post_delay_max_secs = 30

# Per-post time budget (seconds, 0 = unlimited)
post_timeout_secs = 600
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to render config: {0}")]
    Serialize(#[source] toml::ser::Error),
}
