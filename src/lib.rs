//! # eddy
//!
//! Extracts the top-level comments of a social-media post from a comment
//! feed that renders incrementally while it is scrolled.
//!
//! ## Architecture
//!
//! ```text
//! PostRef → Session (Chrome) → Extractor loop → Extraction → CLI output
//! ```
//!
//! The hard part is not fetching but driving a stateful page to convergence:
//! deciding when no more content will appear, telling comments from replies
//! using structural cues only, deduplicating across re-renders and poking
//! "load more" affordances that come and go.
//!
//! ## Quick Start
//!
//! ```bash
//! # Extract one post, reusing a logged-in Chrome profile from the config
//! eddy extract https://www.instagram.com/p/abc123/
//!
//! # Extract a list of posts into a directory
//! eddy extract --input posts.txt --output-dir out/
//!
//! # Show the effective configuration
//! eddy config show
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct holds the loaded configuration
/// and builds the extractor and browser session from it.
pub mod app;

/// Command-line interface using clap.
///
/// - `extract <url>...` - Extract comments from posts
/// - `config path|show` - Inspect the configuration
pub mod cli;

/// Configuration loaded from `~/.config/eddy/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`PostRef`](domain::PostRef): A validated post URL
/// - [`CommentSet`](domain::CommentSet): Insertion-ordered dedup set
/// - [`Extraction`](domain::Extraction): Final per-post result
pub mod domain;

/// The scroll-collect extraction engine and its probes.
///
/// - [`Extractor`](extractor::Extractor): Stall-detecting scroll loop
/// - [`NodeClassifier`](extractor::NodeClassifier): Top-level vs reply policy
/// - [`ContainerLocator`](extractor::ContainerLocator): Scroll region discovery
/// - [`PaginationTrigger`](extractor::PaginationTrigger): "Load more" clicks
pub mod extractor;

/// Comment text cleanup.
pub mod normalizer;

/// Browser automation session.
///
/// - [`Session`](session::Session): Async trait the engine drives
/// - [`ChromeSession`](session::ChromeSession): chromiumoxide implementation
pub mod session;
