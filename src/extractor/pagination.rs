use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::app::Result;
use crate::extractor::config::ExtractionConfig;
use crate::extractor::scripts;
use crate::session::Session;

/// Finds and activates visible "load more" affordances.
pub struct PaginationTrigger {
    labels: Vec<String>,
    pause_ms: std::ops::RangeInclusive<u64>,
    max_clicks: usize,
}

impl PaginationTrigger {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            labels: config.load_more_labels.clone(),
            pause_ms: config.click_pause_range(),
            max_clicks: config.max_clicks_per_cycle,
        }
    }

    /// Activate every matching affordance once, pausing a random interval
    /// after each so the requested comments can render. Returns how many
    /// were activated; zero means none is visible.
    pub async fn click_load_more(&self, session: &dyn Session, pass: usize) -> Result<usize> {
        if self.labels.is_empty() {
            return Ok(0);
        }

        let script = scripts::click_load_more(&self.labels, pass);
        let mut clicked = 0;

        while clicked < self.max_clicks {
            let label = match session.evaluate_script(&script, &[]).await {
                Ok(serde_json::Value::String(label)) => label,
                Ok(_) => break,
                Err(e) if e.is_recoverable() => {
                    debug!("Could not activate 'load more' affordance: {}", e);
                    break;
                }
                Err(e) => return Err(e),
            };

            clicked += 1;
            debug!("Activated '{}' affordance", label);
            tokio::time::sleep(self.random_pause()).await;
        }

        if clicked > 0 {
            info!("Clicked {} 'load more' affordances", clicked);
        }
        Ok(clicked)
    }

    fn random_pause(&self) -> Duration {
        Duration::from_millis(rand::rng().random_range(self.pause_ms.clone()))
    }
}
