//! In-memory content source backed by a JSON dump

use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{ContentSource, QueryOptions};
use crate::content::{RawDocument, RawPage};
use crate::error::FetchError;

const TOKEN_PREFIX: &str = "memory:";

/// Serves documents from memory, paginated like the real API
#[derive(Debug, Clone)]
pub struct MemorySource {
    documents: Vec<RawDocument>,
    page_size: usize,
}

impl MemorySource {
    /// Create a source; `page_size` is the default when queries don't set one
    pub fn new(documents: Vec<RawDocument>, page_size: usize) -> Self {
        Self {
            documents,
            page_size: page_size.max(1),
        }
    }

    /// Load documents from a JSON file holding either an array of documents
    /// or a search response (`{ "results": [...] }`)
    pub fn load<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FetchError::Fixture(format!("cannot read {:?}: {}", path, e)))?;
        let value: Value = serde_json::from_str(&content)?;

        let documents = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(FetchError::Fixture(format!(
                        "{:?} has no results array",
                        path
                    )))
                }
            },
            _ => {
                return Err(FetchError::Fixture(format!(
                    "{:?} must hold an array of documents",
                    path
                )))
            }
        };

        tracing::debug!("Loaded {} documents from {:?}", documents.len(), path);
        Ok(Self::new(
            documents.into_iter().map(RawDocument::new).collect(),
            page_size,
        ))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn of_type<'a>(&'a self, document_type: &'a str) -> impl Iterator<Item = &'a RawDocument> {
        self.documents.iter().filter(move |doc| {
            match doc.0.get("type").and_then(Value::as_str) {
                Some(t) => t == document_type,
                None => true,
            }
        })
    }

    fn page(&self, document_type: &str, offset: usize, page_size: usize) -> RawPage {
        let matching: Vec<_> = self.of_type(document_type).collect();
        let results = matching
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|doc| (*doc).clone())
            .collect();
        let end = offset.saturating_add(page_size);
        let next_page = (end < matching.len())
            .then(|| format!("{}{}:{}:{}", TOKEN_PREFIX, document_type, end, page_size));
        RawPage::new(results, next_page)
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn get_by_type(
        &self,
        document_type: &str,
        options: &QueryOptions,
    ) -> Result<RawPage, FetchError> {
        let page_size = options.page_size.unwrap_or(self.page_size).max(1);
        Ok(self.page(document_type, 0, page_size))
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<RawDocument, FetchError> {
        self.of_type(document_type)
            .find(|doc| doc.uid() == Some(uid))
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                document_type: document_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, token: &str) -> Result<RawPage, FetchError> {
        let invalid = || FetchError::InvalidToken(token.to_string());

        let rest = token.strip_prefix(TOKEN_PREFIX).ok_or_else(invalid)?;
        let mut parts = rest.rsplitn(3, ':');
        let page_size: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
        let offset: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
        let document_type = parts.next().ok_or_else(invalid)?;
        if page_size == 0 || offset.checked_add(page_size).is_none() {
            return Err(invalid());
        }

        Ok(self.page(document_type, offset, page_size))
    }
}
