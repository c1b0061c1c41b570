use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::app::{AppContext, EddyError, Result};
use crate::config::OutputSettings;
use crate::domain::{Extraction, PostRef, Progress};
use crate::extractor::Extractor;
use crate::session::Session;

/// A post whose extraction failed, with whatever was collected before.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedPost {
    pub post: PostRef,
    pub error: String,
    pub partial: Vec<String>,
}

/// Outcome of a batch of posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub extracted: Vec<Extraction>,
    pub failed: Vec<FailedPost>,
}

impl BatchReport {
    /// Every comment collected, partial results included, in post order.
    pub fn all_comments(&self) -> Vec<String> {
        self.extracted
            .iter()
            .flat_map(|e| e.comments.iter().cloned())
            .chain(self.failed.iter().flat_map(|f| f.partial.iter().cloned()))
            .collect()
    }
}

/// Launch Chrome, extract every post, and print or write the results.
pub async fn extract(ctx: &AppContext, posts: Vec<PostRef>, pace: bool) -> Result<()> {
    if posts.is_empty() {
        info!("No posts to extract");
        return Ok(());
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();
    let progress = tokio::spawn(async move {
        while let Some(p) = rx.recv().await {
            eprintln!(
                "  cycle {}: {} unique comments ({} stalls)",
                p.cycle, p.collected, p.stalls
            );
        }
    });

    let extractor = ctx.extractor().with_progress(tx);
    let session = ctx.launch_session().await?;
    let report = run_batch(&session, &extractor, &posts, &ctx.config.output, pace).await;
    drop(extractor);
    let _ = progress.await;

    if let Err(e) = session.close().await {
        error!("Failed to close browser: {}", e);
    }

    match ctx.config.output.output_dir {
        Some(ref dir) => {
            let written = write_report(dir, &report)?;
            for path in written {
                info!("Wrote {}", path.display());
            }
        }
        None => print_report(&mut std::io::stdout().lock(), &report)?,
    }

    info!(
        "Extraction complete: {} posts, {} comments, {} errors",
        report.extracted.len(),
        report.all_comments().len(),
        report.failed.len()
    );
    Ok(())
}

/// Extract posts one after another against a single session.
///
/// A failing post is recorded and the batch moves on; the session is left
/// open for the caller.
pub async fn run_batch(
    session: &dyn Session,
    extractor: &Extractor,
    posts: &[PostRef],
    output: &OutputSettings,
    pace: bool,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (i, post) in posts.iter().enumerate() {
        info!("Extracting comments from: {}", post);

        let result = match output.post_timeout() {
            Some(budget) => {
                let deadline = tokio::time::Instant::now() + budget;
                extractor.extract_until(session, post, deadline).await
            }
            None => extractor.extract(session, post).await,
        };

        match result {
            Ok(extraction) => {
                info!("{}: {} comments", post, extraction.len());
                report.extracted.push(extraction);
            }
            Err(failure) => {
                eprintln!("  Failed to extract {}: {}", post, failure.source);
                error!("{}", failure);
                report.failed.push(FailedPost {
                    post: failure.post,
                    error: failure.source.to_string(),
                    partial: failure.partial,
                });
            }
        }

        // Pace requests between posts
        if pace && i + 1 < posts.len() {
            let secs = rand::rng().random_range(output.post_delay_range());
            info!("Waiting {}s before next post", secs);
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }

    report
}

/// Write the report as JSON. Status lines go to the log so `out` stays
/// machine-readable.
pub fn print_report(out: &mut impl Write, report: &BatchReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Write one file per post plus `all_comments.json` into `dir`.
pub fn write_report(dir: &Path, report: &BatchReport) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for extraction in &report.extracted {
        let path = dir.join(format!("comments_{}.json", extraction.post.file_stem()));
        std::fs::write(&path, serde_json::to_string_pretty(extraction)?)?;
        written.push(path);
    }
    for failed in &report.failed {
        let path = dir.join(format!("comments_{}.failed.json", failed.post.file_stem()));
        std::fs::write(&path, serde_json::to_string_pretty(failed)?)?;
        written.push(path);
    }

    let all_path = dir.join("all_comments.json");
    std::fs::write(&all_path, serde_json::to_string_pretty(&report.all_comments())?)?;
    written.push(all_path);

    Ok(written)
}

/// Parse post URLs from arguments and an optional list file.
pub fn collect_posts(urls: &[String], input: Option<&Path>) -> Result<Vec<PostRef>> {
    let mut posts = Vec::new();
    for url in urls {
        posts.push(PostRef::parse(url)?);
    }

    if let Some(path) = input {
        let content = std::fs::read_to_string(path)?;
        posts.extend(parse_post_list(&content)?);
    }

    Ok(posts)
}

/// One URL per line; blank lines and `#` comments are ignored.
fn parse_post_list(content: &str) -> Result<Vec<PostRef>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PostRef::parse)
        .collect()
}

pub fn show_config_path(ctx: &AppContext) -> Result<()> {
    match ctx.config_path {
        Some(ref path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => Err(EddyError::Config("Could not determine config path".into())),
    }
}

pub fn show_config(ctx: &AppContext) -> Result<()> {
    let rendered = ctx
        .config
        .to_toml()
        .map_err(|e| EddyError::Config(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
