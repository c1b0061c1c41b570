use std::path::PathBuf;

use crate::app::error::{EddyError, Result};
use crate::config::Config;
use crate::extractor::Extractor;
use crate::session::ChromeSession;

pub struct AppContext {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl AppContext {
    /// Load the config from `config_path`, or from the default location
    /// (creating it there on first run).
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(ref path) => Config::load_from(path),
            None => Config::load(),
        }
        .map_err(|e| EddyError::Config(e.to_string()))?;

        let config_path = match config_path {
            Some(path) => Some(path),
            None => Config::default_config_path().ok(),
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.config.extraction.clone())
    }

    pub async fn launch_session(&self) -> Result<ChromeSession> {
        ChromeSession::launch(&self.config.browser).await
    }
}
