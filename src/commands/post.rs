//! Show a single article

use anyhow::{Context, Result};

use crate::client::ContentSource;
use crate::content::{self, normalize_article, Article};
use crate::helpers;
use crate::Blog;

/// Fetch one article by uid and print its metadata and reading time
pub async fn run(blog: &Blog, source: &dyn ContentSource, uid: &str) -> Result<()> {
    let doc = source
        .get_by_uid(&blog.config.cms.document_type, uid)
        .await
        .with_context(|| format!("Failed to fetch post {}", uid))?;
    let article = normalize_article(&doc)?;

    print!("{}", describe(blog, &article));
    Ok(())
}

/// Human-readable summary of an article
pub fn describe(blog: &Blog, article: &Article) -> String {
    let config = &blog.config;
    let post = &article.post;
    let estimate = content::estimate(&article.content, config.reading_speed());
    let date = helpers::display_date(
        post.publication_date.as_ref(),
        config.date_format.as_deref(),
        &config.language,
    );

    let mut out = String::new();
    out.push_str(&format!("{}\n", post.title));
    if !post.subtitle.is_empty() {
        out.push_str(&format!("  {}\n", post.subtitle));
    }
    out.push_str(&format!("  uid:          {}\n", post.id));
    out.push_str(&format!("  author:       {}\n", post.author));
    out.push_str(&format!(
        "  published:    {}\n",
        if date.is_empty() { "-" } else { date.as_str() }
    ));
    if let Some(banner) = &article.banner_url {
        out.push_str(&format!("  banner:       {}\n", banner));
    }
    out.push_str(&format!("  sections:     {}\n", article.content.len()));
    out.push_str(&format!("  reading time: {}\n", estimate));
    out.push_str(&format!(
        "  url:          {}\n",
        helpers::full_url_for(config, &helpers::post_path(&post.id))
    ));
    out
}
