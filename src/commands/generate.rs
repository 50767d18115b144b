//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::client::ContentSource;
use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Precompute the listing page and every article page
pub async fn run(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, source)?;
    let report = generator.precompute().await?;

    if !report.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} posts: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} of {} posts in {:.2}s",
        report.articles,
        report.listed,
        duration.as_secs_f64()
    );

    Ok(report)
}
