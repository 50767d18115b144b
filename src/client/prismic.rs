//! Prismic REST API v2 client

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{ContentSource, QueryOptions};
use crate::config::CmsConfig;
use crate::content::{RawDocument, RawPage};
use crate::error::FetchError;
use crate::helpers;

/// How long a resolved master ref is reused before asking the API again
const REF_TTL: Duration = Duration::from_secs(30);

/// API root response (only the fields we use)
#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// HTTP client for a Prismic repository
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: Mutex<Option<(Instant, String)>>,
}

impl PrismicClient {
    /// Create a client from the `cms` section of the site config
    pub fn new(config: &CmsConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            master_ref: Mutex::new(None),
        })
    }

    /// Current master ref, refreshed every [`REF_TTL`]
    async fn master_ref(&self) -> Result<String, FetchError> {
        let mut cached = self.master_ref.lock().await;
        if let Some((at, reference)) = cached.as_ref() {
            if at.elapsed() < REF_TTL {
                return Ok(reference.clone());
            }
        }

        let url = with_access_token(self.endpoint.clone(), self.access_token.as_deref());
        let api: ApiRoot = self.get_json(&url).await?;
        let reference = api
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(FetchError::NoMasterRef)?;

        tracing::debug!("Resolved master ref {}", reference);
        *cached = Some((Instant::now(), reference.clone()));
        Ok(reference)
    }

    async fn search(&self, predicate: &str, options: &QueryOptions) -> Result<RawPage, FetchError> {
        let reference = self.master_ref().await?;
        let url = search_url(
            &self.endpoint,
            &reference,
            predicate,
            options,
            self.access_token.as_deref(),
        );
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", redact(url));
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: redact(url),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn get_by_type(
        &self,
        document_type: &str,
        options: &QueryOptions,
    ) -> Result<RawPage, FetchError> {
        let predicate = format!(r#"[[at(document.type,"{}")]]"#, document_type);
        self.search(&predicate, options).await
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<RawDocument, FetchError> {
        let not_found = || FetchError::NotFound {
            document_type: document_type.to_string(),
            uid: uid.to_string(),
        };
        // uids are slugs; anything else would be spliced into the predicate
        if !helpers::is_slug(uid) {
            return Err(not_found());
        }

        let predicate = format!(r#"[[at(my.{}.uid,"{}")]]"#, document_type, uid);
        let options = QueryOptions::default().with_page_size(1);
        let page = self.search(&predicate, &options).await?;
        page.results.into_iter().next().ok_or_else(not_found)
    }

    async fn fetch_page(&self, token: &str) -> Result<RawPage, FetchError> {
        if !is_own_page(&self.endpoint, token) {
            return Err(FetchError::InvalidToken(token.to_string()));
        }
        // next_page URLs already carry ref and query; only the token may be missing
        let url = if token.contains("access_token=") {
            token.to_string()
        } else {
            with_access_token(token.to_string(), self.access_token.as_deref())
        };
        self.get_json(&url).await
    }
}

/// Tokens are `next_page` URLs of this repository's search endpoint
fn is_own_page(endpoint: &str, token: &str) -> bool {
    token
        .strip_prefix(endpoint)
        .map(|rest| rest.starts_with("/documents/search?"))
        .unwrap_or(false)
}

/// Build a `documents/search` URL
fn search_url(
    endpoint: &str,
    reference: &str,
    predicate: &str,
    options: &QueryOptions,
    access_token: Option<&str>,
) -> String {
    let mut url = format!(
        "{}/documents/search?ref={}&q={}",
        endpoint,
        encode(reference),
        encode(predicate)
    );
    if let Some(page_size) = options.page_size {
        url.push_str(&format!("&pageSize={}", page_size));
    }
    if let Some(orderings) = &options.orderings {
        url.push_str(&format!("&orderings={}", encode(orderings)));
    }
    if !options.fetch.is_empty() {
        url.push_str(&format!("&fetch={}", encode(&options.fetch.join(","))));
    }
    with_access_token(url, access_token)
}

fn with_access_token(url: String, access_token: Option<&str>) -> String {
    match access_token {
        Some(token) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}access_token={}", url, sep, encode(token))
        }
        None => url,
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Hide the access token when a URL ends up in logs or errors
fn redact(url: &str) -> String {
    match url.find("access_token=") {
        Some(pos) => {
            let start = pos + "access_token=".len();
            let end = url[start..].find('&').map(|i| start + i).unwrap_or(url.len());
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}
