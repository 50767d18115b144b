//! Built-in site templates using the Tera template engine
//!
//! Templates and static assets are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{self, Article, Post};
use crate::helpers;

/// Stylesheet written to `<public>/styles.css`
pub const STYLESHEET: &str = include_str!("assets/styles.css");

/// Logo written to `<public>/images/logo.svg`
pub const LOGO_SVG: &str = include_str!("assets/logo.svg");

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Values are escaped explicitly with the `esc` filter; rendered
        // article bodies are inserted as-is
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
        ])?;

        tera.register_filter("esc", esc_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render the listing page
    pub fn render_index(&self, config: &ConfigData, listing: &ListingData) -> Result<String> {
        let mut context = Context::new();
        context.insert("config", config);
        context.insert("posts", &listing.posts);
        context.insert("next_page", &listing.next_page);
        context.insert("api_url", &listing.api_url);
        context.insert("load_more_label", load_more_label(&config.language));
        self.render("index.html", &context)
    }

    /// Render an article page
    pub fn render_post(&self, config: &ConfigData, article: &ArticleData) -> Result<String> {
        let mut context = Context::new();
        context.insert("config", config);
        context.insert("article", article);
        self.render("post.html", &context)
    }
}

fn load_more_label(language: &str) -> &'static str {
    if language.to_ascii_lowercase().starts_with("pt") {
        "Carregar mais posts"
    } else {
        "Load more posts"
    }
}

/// Tera filter: HTML-escape a value
fn esc_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = match value {
        tera::Value::String(s) => s.clone(),
        tera::Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(tera::Value::String(content::richtext::html_escape(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub url: String,
}

impl ConfigData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            root: helpers::url_for(config, ""),
            url: config.url.clone(),
        }
    }
}

/// A post as shown in the listing (also the load-more API payload)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummaryData {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Display date, empty for unpublished posts
    pub date: String,
    /// ISO date for `<time datetime>`
    pub datetime: String,
    pub path: String,
}

impl PostSummaryData {
    pub fn from_post(post: &Post, config: &SiteConfig) -> Self {
        let (date, datetime) = post_dates(post, config);
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date,
            datetime,
            path: helpers::url_for(config, &helpers::post_path(&post.id)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub posts: Vec<PostSummaryData>,
    pub next_page: Option<String>,
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub id: String,
    pub title: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
    pub banner_url: Option<String>,
    pub reading_time: String,
    pub reading_minutes: u32,
    pub blocks: Vec<BlockData>,
}

impl ArticleData {
    /// Build the article view; the reading time is computed here, every time
    pub fn from_article(article: &Article, config: &SiteConfig) -> Self {
        let (date, datetime) = post_dates(&article.post, config);
        let reading_time = content::estimate(&article.content, config.reading_speed());

        Self {
            id: article.post.id.clone(),
            title: article.post.title.clone(),
            author: article.post.author.clone(),
            date,
            datetime,
            banner_url: article.banner_url.clone(),
            reading_time: reading_time.to_string(),
            reading_minutes: reading_time.minutes,
            blocks: article
                .content
                .iter()
                .map(|block| BlockData {
                    heading: block.heading.clone(),
                    html: content::richtext::as_html(&block.body),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    pub html: String,
}

fn post_dates(post: &Post, config: &SiteConfig) -> (String, String) {
    let date = helpers::display_date(
        post.publication_date.as_ref(),
        config.date_format.as_deref(),
        &config.language,
    );
    let datetime = post
        .publication_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    (date, datetime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentBlock, RichTextSpan};
    use chrono::NaiveDate;

    fn post(id: &str, title: &str) -> Post {
        Post {
            id: id.to_string(),
            publication_date: NaiveDate::from_ymd_opt(2021, 3, 25),
            title: title.to_string(),
            subtitle: "Tudo sobre como criar a sua primeira aplicação".to_string(),
            author: "Danilo Vieira".to_string(),
        }
    }

    #[test]
    fn test_render_index_with_more_pages() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let listing = ListingData {
            posts: vec![PostSummaryData::from_post(&post("a", "Tom & Jerry"), &config)],
            next_page: Some("https://x/search?page=2&ref=1".to_string()),
            api_url: "/api/posts".to_string(),
        };

        let html = renderer
            .render_index(&ConfigData::from_config(&config), &listing)
            .unwrap();
        assert!(html.contains(r#"<a href="/post/a/">"#));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(html.contains("25 de março de 2021"));
        assert!(html.contains("Carregar mais posts"));
        assert!(html.contains(r#"data-next="https://x/search?page=2&amp;ref=1""#));
    }

    #[test]
    fn test_render_index_last_page_has_no_button() {
        let mut config = SiteConfig::default();
        config.language = "en".to_string();
        let renderer = TemplateRenderer::new().unwrap();
        let listing = ListingData {
            posts: Vec::new(),
            next_page: None,
            api_url: "/api/posts".to_string(),
        };
        let html = renderer
            .render_index(&ConfigData::from_config(&config), &listing)
            .unwrap();
        assert!(!html.contains("load-more"));
        assert!(html.contains(r#"<html lang="en">"#));
    }

    #[test]
    fn test_render_post() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let article = Article {
            post: post("hooks", "Como utilizar Hooks"),
            banner_url: Some("https://images.prismic.io/banner.png".to_string()),
            content: vec![ContentBlock::new(
                "Hello world",
                vec![RichTextSpan::paragraph("foo bar <baz>")],
            )],
        };

        let data = ArticleData::from_article(&article, &config);
        assert_eq!(data.reading_minutes, 1);
        assert_eq!(data.reading_time, "1 min");

        let html = renderer
            .render_post(&ConfigData::from_config(&config), &data)
            .unwrap();
        assert!(html.contains("<h1>Como utilizar Hooks</h1>"));
        assert!(html.contains(r#"src="https://images.prismic.io/banner.png""#));
        assert!(html.contains("<h2>Hello world</h2>"));
        assert!(html.contains("<p>foo bar &lt;baz&gt;</p>"));
        assert!(html.contains("1 min"));
    }

    #[test]
    fn test_summary_for_unpublished_post() {
        let config = SiteConfig::default();
        let mut draft = post("draft", "Draft");
        draft.publication_date = None;
        let summary = PostSummaryData::from_post(&draft, &config);
        assert_eq!(summary.date, "");
        assert_eq!(summary.datetime, "");
        assert_eq!(summary.path, "/post/draft/");
    }
}
