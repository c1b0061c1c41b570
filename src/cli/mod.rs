pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::extractor::ExtractionConfig;

#[derive(Parser)]
#[command(name = "eddy")]
#[command(about = "Extract top-level comments from incrementally loading comment feeds", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/eddy/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log engine progress at debug level (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract comments from one or more posts
    Extract {
        /// Post URLs
        urls: Vec<String>,

        /// File with one post URL per line (# starts a comment)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write one JSON file per post plus all_comments.json here
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Consecutive no-growth passes before stopping
        #[arg(long)]
        stall_threshold: Option<usize>,

        /// Maximum scroll cycles per post
        #[arg(long)]
        max_cycles: Option<usize>,

        /// Skip the random pause between posts
        #[arg(long)]
        no_delay: bool,

        /// Timing preset applied over the configured selectors
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Fewer pulses and shorter waits
    Fast,
    /// Longer waits and a higher stall threshold
    Thorough,
}

impl Preset {
    /// The preset's timings, keeping the selectors and labels of `base`.
    pub fn apply(self, base: &ExtractionConfig) -> ExtractionConfig {
        let timings = match self {
            Preset::Fast => ExtractionConfig::fast(),
            Preset::Thorough => ExtractionConfig::thorough(),
        };
        ExtractionConfig {
            comment_selector: base.comment_selector.clone(),
            text_selector: base.text_selector.clone(),
            load_more_labels: base.load_more_labels.clone(),
            comment_view_marker: base.comment_view_marker.clone(),
            comment_icon_selector: base.comment_icon_selector.clone(),
            dismiss_selectors: base.dismiss_selectors.clone(),
            ..timings
        }
    }
}
