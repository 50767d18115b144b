//! spacetraveling: a statically generated blog backed by a headless CMS
//!
//! Posts are fetched from a Prismic-style content API, normalized into
//! [`content::Post`] records and rendered into a paginated listing page
//! and one page per article, each with a reading-time estimate.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod pagination;
pub mod server;
pub mod templates;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use client::{ContentSource, MemorySource, PrismicClient};

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// Pick the content source: a JSON dump when given, the CMS otherwise
    pub fn content_source(&self, fixtures: Option<&Path>) -> Result<Arc<dyn ContentSource>> {
        if let Some(path) = fixtures {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base_dir.join(path)
            };
            tracing::info!("Reading content from {:?}", path);
            let source = MemorySource::load(&path, self.config.cms.page_size)?;
            if source.is_empty() {
                tracing::warn!("{:?} holds no documents", path);
            }
            return Ok(Arc::new(source));
        }

        if self.config.cms.endpoint.trim().is_empty() {
            bail!(
                "No content API configured: set cms.endpoint in _config.yml, \
                 export {}, or pass --fixtures",
                config::ENDPOINT_ENV
            );
        }

        tracing::debug!("Using content API at {}", self.config.cms.endpoint);
        Ok(Arc::new(PrismicClient::new(&self.config.cms)?))
    }

    /// Precompute the static site
    pub async fn generate(&self, source: Arc<dyn ContentSource>) -> Result<generator::GenerateReport> {
        commands::generate::run(self, source).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
