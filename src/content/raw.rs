//! Wire shapes returned by the content API
//!
//! Documents are kept as untyped JSON until the normalizer validates them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A CMS document exactly as it arrived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDocument(pub Value);

impl RawDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The document's route identifier, if it is a string
    pub fn uid(&self) -> Option<&str> {
        self.0.get("uid").and_then(Value::as_str)
    }

    pub fn first_publication_date(&self) -> Option<&str> {
        self.0.get("first_publication_date").and_then(Value::as_str)
    }

    /// The nested `data` object, or `Value::Null` when missing
    pub fn data(&self) -> &Value {
        self.0.get("data").unwrap_or(&Value::Null)
    }

    /// Look up a field of `data`
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data().get(name).filter(|v| !v.is_null())
    }
}

impl From<Value> for RawDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One page of a search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub results: Vec<RawDocument>,

    /// Locator of the following page; empty strings are read as absent
    #[serde(default, deserialize_with = "non_empty_token")]
    pub next_page: Option<String>,
}

impl RawPage {
    pub fn new(results: Vec<RawDocument>, next_page: Option<String>) -> Self {
        Self {
            results,
            next_page: next_page.filter(|t| !t.is_empty()),
        }
    }
}

fn non_empty_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(token.filter(|t| !t.is_empty()))
}
