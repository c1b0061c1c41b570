//! Incremental scroll-collect extraction of top-level comments.
//!
//! # Architecture
//!
//! ```text
//! Discovering → { Collecting ⇄ Scrolling } → Done
//!                   │              │
//!            NodeClassifier   ContainerLocator
//!             + normalize     + PaginationTrigger
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use eddy::extractor::{ExtractionConfig, Extractor};
//! use eddy::session::{BrowserSettings, ChromeSession};
//!
//! let session = ChromeSession::launch(&BrowserSettings::default()).await?;
//! let extractor = Extractor::new(ExtractionConfig::default());
//! let extraction = extractor.extract(&session, &post).await?;
//! println!("{} comments", extraction.len());
//! session.close().await?;
//! ```

mod classifier;
mod config;
mod container;
mod engine;
mod pagination;
pub mod scripts;

pub use classifier::{Classification, LinkAncestorClassifier, NodeClassifier};
pub use config::ExtractionConfig;
pub use container::ContainerLocator;
pub use engine::{ExtractionFailure, Extractor};
pub use pagination::PaginationTrigger;
