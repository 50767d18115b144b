//! Generator module - renders the listing and article pages to static HTML
//!
//! Pages are produced in one of two modes: [`RenderMode::Precompute`] for
//! everything known at build time, and [`RenderMode::OnDemand`] when the
//! server meets an article that was published after the last build.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::client::{ContentSource, QueryOptions};
use crate::content::{normalize_article, normalize_page, PostPage};
use crate::error::Error;
use crate::helpers;
use crate::pagination::PostsPagination;
use crate::templates::{
    ArticleData, ConfigData, ListingData, PostSummaryData, TemplateRenderer, LOGO_SVG, STYLESHEET,
};
use crate::Blog;

/// Site-relative path of the load-more endpoint
pub const POSTS_API_PATH: &str = "api/posts";

/// Why a page is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Build time, once per known identifier
    Precompute,
    /// Request time, for identifiers unknown at build time
    OnDemand,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Precompute => write!(f, "precompute"),
            RenderMode::OnDemand => write!(f, "on-demand"),
        }
    }
}

/// Outcome of a precompute run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Posts found by walking every listing page
    pub listed: usize,
    /// Article pages written
    pub articles: usize,
    /// Uids skipped because their document was malformed or vanished
    pub skipped: Vec<String>,
}

/// Static page generator
pub struct Generator {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    config_data: ConfigData,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            source,
            renderer: TemplateRenderer::new()?,
            config_data: ConfigData::from_config(&blog.config),
        })
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    /// Generate the listing page and every article page
    pub async fn precompute(&self) -> Result<GenerateReport> {
        let start = Instant::now();

        fs::create_dir_all(&self.blog.public_dir)?;
        self.write_assets()?;

        let first = self.first_page().await?;
        let index_html = self.render_index(&first)?;
        self.write_page("index.html", &index_html)?;
        tracing::info!(
            "Rendered listing page with {} posts (more pages: {})",
            first.posts.len(),
            first.has_next()
        );

        let mut walker = PostsPagination::initialize(first);
        walker
            .load_all(self.source())
            .await
            .context("Failed to walk listing pages")?;

        let mut report = GenerateReport {
            listed: walker.posts().len(),
            ..GenerateReport::default()
        };

        let mut seen = HashSet::new();
        for post in walker.posts() {
            if !seen.insert(post.id.as_str()) {
                tracing::debug!("Post {} listed more than once", post.id);
                continue;
            }

            match self.generate_article(&post.id, RenderMode::Precompute).await {
                Ok(Some(_)) => report.articles += 1,
                Ok(None) => {
                    tracing::warn!("Post {} disappeared while generating, skipping", post.id);
                    report.skipped.push(post.id.clone());
                }
                Err(e) if is_malformed(&e) => {
                    tracing::warn!("Skipping post {}: {}", post.id, e);
                    report.skipped.push(post.id.clone());
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Generated {} article pages in {:.2}s",
            report.articles,
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Fetch and normalize the first listing page
    pub async fn first_page(&self) -> Result<PostPage> {
        let cms = &self.blog.config.cms;
        let raw = self
            .source
            .get_by_type(&cms.document_type, &QueryOptions::listing(cms))
            .await
            .with_context(|| format!("Failed to fetch {} documents", cms.document_type))?;
        Ok(normalize_page(raw)?)
    }


    /// Render one article page and write it to the public directory.
    ///
    /// Returns `None` when the CMS has no document with this uid.
    pub async fn generate_article(&self, uid: &str, mode: RenderMode) -> Result<Option<String>> {
        let cms = &self.blog.config.cms;
        let doc = match self.source.get_by_uid(&cms.document_type, uid).await {
            Ok(doc) => doc,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to fetch post {}", uid));
            }
        };

        let article = normalize_article(&doc)?;
        let data = ArticleData::from_article(&article, &self.blog.config);
        let html = self.renderer.render_post(&self.config_data, &data)?;

        let path = helpers::post_path(&article.post.id);
        self.write_page(&format!("{}index.html", path), &html)?;
        tracing::debug!(
            "Rendered {} ({}, {}) [{}]",
            path,
            data.title,
            data.reading_time,
            mode
        );

        Ok(Some(html))
    }

    /// Render the listing page for a normalized first page
    pub fn render_index(&self, page: &PostPage) -> Result<String> {
        let listing = ListingData {
            posts: self.summaries(page),
            next_page: page.next_page.clone(),
            api_url: helpers::url_for(&self.blog.config, POSTS_API_PATH),
        };
        self.renderer.render_index(&self.config_data, &listing)
    }

    /// Listing entries as rendered on the page and returned by the API
    pub fn summaries(&self, page: &PostPage) -> Vec<PostSummaryData> {
        page.posts
            .iter()
            .map(|post| PostSummaryData::from_post(post, &self.blog.config))
            .collect()
    }

    /// Location of a generated page inside the public directory
    pub fn output_path(&self, relative: &str) -> PathBuf {
        self.blog.public_dir.join(relative.trim_start_matches('/'))
    }

    fn write_page(&self, relative: &str, html: &str) -> Result<()> {
        let path = self.output_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// Copy the embedded stylesheet and logo
    pub fn write_assets(&self) -> Result<()> {
        self.write_page("styles.css", STYLESHEET)?;
        self.write_page("images/logo.svg", LOGO_SVG)?;
        Ok(())
    }
}

fn is_malformed(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MalformedDocument { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemorySource;
    use crate::content::RawDocument;
    use crate::error::FetchError;
    use serde_json::json;

    fn doc(uid: &str, title: &str) -> RawDocument {
        RawDocument::new(json!({
            "uid": uid,
            "type": "posts",
            "first_publication_date": "2021-03-25T19:25:28+0000",
            "data": {
                "title": title,
                "subtitle": "subtitle",
                "author": "Joseph Oliveira",
                "banner": { "url": "https://images.prismic.io/banner.png" },
                "content": [
                    { "heading": "Hello world", "body": [{ "type": "paragraph", "text": "foo bar baz", "spans": [] }] }
                ]
            }
        }))
    }

    fn blog(dir: &std::path::Path, page_size: usize) -> Blog {
        let mut blog = Blog::new(dir).unwrap();
        blog.config.cms.page_size = page_size;
        blog
    }

    #[tokio::test]
    async fn test_precompute_writes_listing_and_articles() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path(), 2);
        let source = MemorySource::new(vec![doc("a", "A"), doc("b", "B"), doc("c", "C")], 20);
        let generator = Generator::new(&blog, Arc::new(source)).unwrap();

        let report = generator.precompute().await.unwrap();
        assert_eq!(report.listed, 3);
        assert_eq!(report.articles, 3);
        assert!(report.skipped.is_empty());

        let index = fs::read_to_string(blog.public_dir.join("index.html")).unwrap();
        assert!(index.contains(r#"href="/post/a/""#));
        assert!(index.contains(r#"href="/post/b/""#));
        assert!(!index.contains(r#"href="/post/c/""#));
        assert!(index.contains("load-more"));

        let article = fs::read_to_string(blog.public_dir.join("post/c/index.html")).unwrap();
        assert!(article.contains("<h1>C</h1>"));
        assert!(article.contains("1 min"));
        assert!(blog.public_dir.join("styles.css").exists());
        assert!(blog.public_dir.join("images/logo.svg").exists());
    }

    #[tokio::test]
    async fn test_precompute_aborts_on_malformed_listing() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path(), 20);
        let broken = RawDocument::new(json!({ "type": "posts", "data": { "title": "No uid" } }));
        let source = MemorySource::new(vec![doc("a", "A"), broken], 20);
        let generator = Generator::new(&blog, Arc::new(source)).unwrap();

        let err = generator.precompute().await.unwrap_err();
        assert!(is_malformed(&err));
        assert!(!blog.public_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_generate_article_unknown_uid() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path(), 20);
        let generator =
            Generator::new(&blog, Arc::new(MemorySource::new(vec![doc("a", "A")], 20))).unwrap();

        let missing = generator
            .generate_article("nope", RenderMode::OnDemand)
            .await
            .unwrap();
        assert!(missing.is_none());

        let html = generator
            .generate_article("a", RenderMode::OnDemand)
            .await
            .unwrap()
            .unwrap();
        assert!(html.contains("<h1>A</h1>"));
        assert!(generator.output_path("post/a/index.html").exists());
    }

    #[test]
    fn test_is_malformed() {
        let malformed = anyhow::Error::from(Error::MalformedDocument {
            index: 0,
            reason: "uid is missing".to_string(),
        });
        assert!(is_malformed(&malformed));

        let fetch = anyhow::Error::from(Error::PageFetchFailed(FetchError::NoMasterRef));
        assert!(!is_malformed(&fetch));
    }
}
