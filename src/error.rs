//! Error types shared by the content pipeline

use thiserror::Error;

/// Errors surfaced by the normalizer and the pagination walker
#[derive(Debug, Error)]
pub enum Error {
    /// A raw document violates the required-field contract
    #[error("malformed document at position {index}: {reason}")]
    MalformedDocument { index: usize, reason: String },

    /// `load_next` was called after the last page was reached
    #[error("no more pages to load")]
    NoMorePages,

    /// The content collaborator failed to deliver the next page
    #[error("failed to fetch page: {0}")]
    PageFetchFailed(#[source] FetchError),
}

impl Error {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            index,
            reason: reason.into(),
        }
    }
}

/// Errors raised by a content source
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("no {document_type} document with uid {uid:?}")]
    NotFound { document_type: String, uid: String },

    #[error("page token {0:?} was not issued by this content source")]
    InvalidToken(String),

    #[error("content API did not advertise a master ref")]
    NoMasterRef,

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fixture error: {0}")]
    Fixture(String),
}

impl FetchError {
    /// Whether the error means the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
            || matches!(self, FetchError::Status { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
