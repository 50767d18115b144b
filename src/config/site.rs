//! Site configuration (_config.yml)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use crate::content::DEFAULT_WORDS_PER_MINUTE;

/// Environment variable overriding `cms.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable overriding `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Date format (Moment.js style); long locale form when unset
    pub date_format: Option<String>,

    // Article pages
    pub words_per_minute: u32,

    // Content API
    #[serde(default)]
    pub cms: CmsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            date_format: None,

            words_per_minute: DEFAULT_WORDS_PER_MINUTE.get(),

            cms: CmsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the site unusable
    pub fn validate(&self) -> Result<()> {
        if self.words_per_minute == 0 {
            bail!("words_per_minute must be a positive integer");
        }
        if self.cms.page_size == 0 {
            bail!("cms.page_size must be a positive integer");
        }
        if self.cms.document_type.trim().is_empty() {
            bail!("cms.document_type must not be empty");
        }
        Ok(())
    }

    /// Reading speed used for article reading-time estimates
    pub fn reading_speed(&self) -> NonZeroU32 {
        NonZeroU32::new(self.words_per_minute).unwrap_or(DEFAULT_WORDS_PER_MINUTE)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("Using content API endpoint from {}", ENDPOINT_ENV);
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            tracing::debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            self.cms.access_token = Some(token);
        }
    }
}

/// Headless CMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding the blog posts
    pub document_type: String,
    pub page_size: usize,
    /// Prismic orderings expression, e.g. `[document.first_publication_date desc]`
    pub orderings: Option<String>,
    /// Fields returned on listing pages, e.g. `posts.title`; all when empty
    pub fetch: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 20,
            orderings: None,
            fetch: Vec::new(),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en
words_per_minute: 250
cms:
  endpoint: https://blog.cdn.prismic.io/api/v2
  page_size: 5
  fetch: [posts.title, posts.subtitle, posts.author]
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, "en");
        assert_eq!(config.reading_speed().get(), 250);
        assert_eq!(config.cms.endpoint, "https://blog.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 5);
        assert_eq!(config.cms.fetch, vec!["posts.title", "posts.subtitle", "posts.author"]);
        // untouched keys keep their defaults
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.public_dir, "public");
    }

    #[test]
    fn test_rejects_zero_words_per_minute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "words_per_minute: 0\n").unwrap();
        assert!(SiteConfig::load(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SiteConfig::default();
        config.apply_overrides(
            Some("https://other.cdn.prismic.io/api/v2".to_string()),
            Some("secret".to_string()),
        );
        assert_eq!(config.cms.endpoint, "https://other.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));

        config.apply_overrides(Some("  ".to_string()), None);
        assert_eq!(config.cms.endpoint, "https://other.cdn.prismic.io/api/v2");
    }
}
