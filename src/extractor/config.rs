use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Tunable parameters of the scroll-collect loop.
///
/// Every timing here was tuned by hand against a third-party UI that changes
/// over time, so none of it is hard-coded in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// CSS selector matching one rendered comment node (default: `div.x1lliihq`)
    pub comment_selector: String,

    /// CSS selector for the text-bearing element inside a comment node
    pub text_selector: String,

    /// Consecutive no-growth collecting passes that end the run (default: 3)
    pub stall_threshold: usize,

    /// Upper bound on scroll cycles per post (default: 50)
    pub max_scroll_cycles: usize,

    /// How long to wait for the first comment node, in seconds (default: 10)
    pub discovery_timeout_secs: u64,

    /// Scroll-to-bottom pulses per cycle (default: 30)
    pub scroll_pulses: usize,

    /// Pause between scroll pulses in milliseconds (default: 700)
    pub pulse_delay_ms: u64,

    /// How long to wait for the node count to grow after scrolling, in seconds (default: 10)
    pub growth_timeout_secs: u64,

    /// Pause after the growth wait in milliseconds (default: 1500)
    pub settle_delay_ms: u64,

    /// Poll interval for bounded waits in milliseconds (default: 250)
    pub poll_interval_ms: u64,

    /// Labels of "load more" affordances, matched against element text
    pub load_more_labels: Vec<String>,

    /// Minimum pause after activating a "load more" affordance in milliseconds (default: 1000)
    pub click_pause_min_ms: u64,

    /// Maximum pause after activating a "load more" affordance in milliseconds (default: 2000)
    pub click_pause_max_ms: u64,

    /// Maximum "load more" activations per cycle (default: 20)
    pub max_clicks_per_cycle: usize,

    /// Substring of the URL that identifies the comment view. Empty disables
    /// comment view navigation. (default: `/comments/`)
    pub comment_view_marker: String,

    /// Selector of the icon that opens the comment view
    pub comment_icon_selector: String,

    /// Selectors of popup close buttons dismissed before opening the comment view
    pub dismiss_selectors: Vec<String>,

    /// How long to wait for the comment view to open, in seconds (default: 10)
    pub navigation_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            comment_selector: "div.x1lliihq".to_string(),
            text_selector: "span._ap3a".to_string(),
            stall_threshold: 3,
            max_scroll_cycles: 50,
            discovery_timeout_secs: 10,
            scroll_pulses: 30,
            pulse_delay_ms: 700,
            growth_timeout_secs: 10,
            settle_delay_ms: 1500,
            poll_interval_ms: 250,
            load_more_labels: vec![
                "View more comments".to_string(),
                "Load more".to_string(),
                "View more".to_string(),
            ],
            click_pause_min_ms: 1000,
            click_pause_max_ms: 2000,
            max_clicks_per_cycle: 20,
            comment_view_marker: "/comments/".to_string(),
            comment_icon_selector: "svg[aria-label=\"Comment\"]".to_string(),
            dismiss_selectors: vec!["svg[aria-label=\"Close\"]".to_string()],
            navigation_timeout_secs: 10,
        }
    }
}

impl ExtractionConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn pulse_delay(&self) -> Duration {
        Duration::from_millis(self.pulse_delay_ms)
    }

    pub fn growth_timeout(&self) -> Duration {
        Duration::from_secs(self.growth_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Bounds of the randomized pause after a "load more" click, in
    /// milliseconds. A reversed pair is clamped to its lower value.
    pub fn click_pause_range(&self) -> RangeInclusive<u64> {
        let min = self.click_pause_min_ms;
        min..=self.click_pause_max_ms.max(min)
    }

    /// Fewer pulses and shorter waits; misses more on slow feeds.
    pub fn fast() -> Self {
        Self {
            scroll_pulses: 10,
            pulse_delay_ms: 300,
            growth_timeout_secs: 4,
            settle_delay_ms: 500,
            click_pause_min_ms: 500,
            click_pause_max_ms: 1000,
            ..Default::default()
        }
    }

    /// Longer waits and a higher stall threshold for slow feeds.
    pub fn thorough() -> Self {
        Self {
            stall_threshold: 5,
            max_scroll_cycles: 200,
            discovery_timeout_secs: 20,
            growth_timeout_secs: 20,
            settle_delay_ms: 3000,
            ..Default::default()
        }
    }
}
