//! Post and Article models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A normalized article summary, as shown on the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Document uid; also the article route slug
    pub id: String,

    /// First publication date (absent for unpublished entries)
    pub publication_date: Option<NaiveDate>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl Post {
    /// Create a post with only its identifier set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            publication_date: None,
            title: String::new(),
            subtitle: String::new(),
            author: String::new(),
        }
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    /// Posts in the order the CMS returned them
    pub posts: Vec<Post>,

    /// Locator of the following page, `None` on the last page
    pub next_page: Option<String>,
}

impl PostPage {
    pub fn new(posts: Vec<Post>, next_page: Option<String>) -> Self {
        Self {
            posts,
            next_page: next_page.filter(|t| !t.is_empty()),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

/// A full article, as shown on its own page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub post: Post,
    pub banner_url: Option<String>,
    pub content: Vec<ContentBlock>,
}

/// One section of an article body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<RichTextSpan>,
}

impl ContentBlock {
    pub fn new(heading: impl Into<String>, body: Vec<RichTextSpan>) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }
}

/// One structured-text element (paragraph, heading, list item, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextSpan {
    /// Element type, e.g. `paragraph`, `heading2`, `list-item`
    pub kind: String,
    pub text: String,
    /// Inline formatting, as character ranges into `text`
    pub marks: Vec<InlineMark>,
}

impl RichTextSpan {
    /// A plain paragraph without formatting
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.into(),
            marks: Vec::new(),
        }
    }
}

/// Inline formatting applied to a character range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineMark {
    pub start: usize,
    pub end: usize,
    /// `strong`, `em` or `hyperlink`
    pub kind: String,
    /// Target for hyperlinks
    pub url: Option<String>,
}
