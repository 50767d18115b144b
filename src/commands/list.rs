//! List the posts published in the CMS

use anyhow::{Context, Result};

use crate::client::{ContentSource, QueryOptions};
use crate::content::{self, normalize_article, normalize_page, Post, ReadingTimeEstimate};
use crate::pagination::PostsPagination;
use crate::Blog;

/// Walk every listing page and print the posts
pub async fn run(blog: &Blog, source: &dyn ContentSource, reading_time: bool) -> Result<()> {
    let posts = collect(blog, source).await?;

    println!("Posts ({}):", posts.len());
    for post in &posts {
        let date = post
            .publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unpublished".to_string());

        let minutes = if reading_time {
            match estimate_for(blog, source, &post.id).await {
                Ok(estimate) => format!(" ({})", estimate),
                Err(e) => {
                    tracing::warn!("Cannot estimate reading time for {}: {}", post.id, e);
                    String::new()
                }
            }
        } else {
            String::new()
        };

        println!(
            "  {} - {} [{}] by {}{}",
            date, post.title, post.id, post.author, minutes
        );
    }

    Ok(())
}

/// All posts, following the listing cursor to the last page
pub async fn collect(blog: &Blog, source: &dyn ContentSource) -> Result<Vec<Post>> {
    let cms = &blog.config.cms;
    let first = source
        .get_by_type(&cms.document_type, &QueryOptions::listing(cms))
        .await
        .with_context(|| format!("Failed to fetch {} documents", cms.document_type))?;

    let mut walker = PostsPagination::initialize(normalize_page(first)?);
    walker.load_all(source).await?;
    Ok(walker.into_posts())
}

async fn estimate_for(
    blog: &Blog,
    source: &dyn ContentSource,
    uid: &str,
) -> Result<ReadingTimeEstimate> {
    let doc = source.get_by_uid(&blog.config.cms.document_type, uid).await?;
    let article = normalize_article(&doc)?;
    Ok(content::estimate(&article.content, blog.config.reading_speed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemorySource;
    use crate::content::RawDocument;
    use serde_json::json;

    #[tokio::test]
    async fn test_collect_walks_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.cms.page_size = 2;

        let docs = ["x", "y", "z", "w", "v"]
            .iter()
            .map(|uid| RawDocument::new(json!({ "uid": uid, "data": { "title": uid } })))
            .collect();
        let source = MemorySource::new(docs, 20);

        let posts = collect(&blog, &source).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z", "w", "v"]);
    }

    #[tokio::test]
    async fn test_estimate_for() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let words = vec!["lorem"; 450].join(" ");
        let doc = RawDocument::new(json!({
            "uid": "long",
            "data": { "content": [{ "heading": "", "body": [{ "type": "paragraph", "text": words }] }] }
        }));
        let source = MemorySource::new(vec![doc], 20);

        let estimate = estimate_for(&blog, &source, "long").await.unwrap();
        assert_eq!(estimate.minutes, 3);
        assert!(estimate_for(&blog, &source, "missing").await.is_err());
    }
}
