//! Normalization of raw CMS documents
//!
//! Raw documents are untrusted: the identifier is required and must be a
//! slug, since it doubles as the article route. Every other field falls
//! back to an empty value when it is missing or oddly shaped.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::richtext::as_plain_text;
use super::{Article, ContentBlock, InlineMark, Post, PostPage, RawDocument, RawPage, RichTextSpan};
use crate::error::{Error, Result};
use crate::helpers;

/// Normalize a sequence of documents, preserving their order.
///
/// Fails on the first document without a usable identifier; no partial
/// result is returned.
pub fn normalize(documents: &[RawDocument]) -> Result<Vec<Post>> {
    documents
        .iter()
        .enumerate()
        .map(|(index, doc)| normalize_document(index, doc))
        .collect()
}

/// Normalize a single listing entry. `index` is reported on failure.
pub fn normalize_document(index: usize, doc: &RawDocument) -> Result<Post> {
    let id = match doc.0.get("uid") {
        Some(Value::String(uid)) if helpers::is_slug(uid) => uid.clone(),
        Some(Value::String(uid)) if uid.trim().is_empty() => {
            return Err(Error::malformed(index, "uid is empty"))
        }
        Some(Value::String(uid)) => {
            return Err(Error::malformed(index, format!("uid {:?} is not a slug", uid)))
        }
        None | Some(Value::Null) => return Err(Error::malformed(index, "uid is missing")),
        Some(_) => return Err(Error::malformed(index, "uid is not a string")),
    };

    Ok(Post {
        id,
        publication_date: doc.first_publication_date().and_then(parse_publication_date),
        title: text_field(doc.field("title")),
        subtitle: text_field(doc.field("subtitle")),
        author: text_field(doc.field("author")),
    })
}

/// Normalize a search response page
pub fn normalize_page(page: RawPage) -> Result<PostPage> {
    let posts = normalize(&page.results)?;
    Ok(PostPage::new(posts, page.next_page))
}

/// Normalize a document fetched for its article page
pub fn normalize_article(doc: &RawDocument) -> Result<Article> {
    let post = normalize_document(0, doc)?;

    let banner_url = doc
        .field("banner")
        .and_then(|b| b.get("url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let content = match doc.field("content") {
        Some(Value::Array(items)) => items.iter().map(content_block).collect(),
        _ => Vec::new(),
    };

    Ok(Article {
        post,
        banner_url,
        content,
    })
}

/// Parse the CMS timestamp (`2021-03-25T19:25:28+0000`) into a calendar date
pub fn parse_publication_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|e| tracing::debug!("Ignoring unparseable publication date {:?}: {}", raw, e))
        .ok()
}

/// A display string from either a plain string or a structured-text array
fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v @ Value::Array(_)) => as_plain_text(&rich_text(Some(v))),
        _ => String::new(),
    }
}

fn content_block(item: &Value) -> ContentBlock {
    if !item.is_object() {
        return ContentBlock::default();
    }
    ContentBlock {
        heading: text_field(item.get("heading")),
        body: rich_text(item.get("body")),
    }
}

/// Parse a structured-text array, skipping elements that are not objects
fn rich_text(value: Option<&Value>) -> Vec<RichTextSpan> {
    let Some(Value::Array(elements)) = value else {
        return Vec::new();
    };

    elements
        .iter()
        .filter(|e| e.is_object())
        .map(|e| RichTextSpan {
            kind: e
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("paragraph")
                .to_string(),
            text: e
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            marks: inline_marks(e.get("spans")),
        })
        .collect()
}

fn inline_marks(value: Option<&Value>) -> Vec<InlineMark> {
    let Some(Value::Array(spans)) = value else {
        return Vec::new();
    };

    spans
        .iter()
        .filter_map(|s| {
            let start = s.get("start")?.as_u64()? as usize;
            let end = s.get("end")?.as_u64()? as usize;
            let kind = s.get("type")?.as_str()?.to_string();
            let url = s
                .get("data")
                .and_then(|d| d.get("url"))
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(InlineMark {
                start,
                end,
                kind,
                url,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(uid: &str, title: &str) -> RawDocument {
        RawDocument::new(json!({
            "id": format!("id-{}", uid),
            "uid": uid,
            "first_publication_date": "2021-03-25T19:25:28+0000",
            "data": { "title": title, "subtitle": "sub", "author": "Ana" }
        }))
    }

    #[test]
    fn test_preserves_order() {
        let docs = vec![doc("c", "C"), doc("a", "A"), doc("b", "B")];
        let posts = normalize(&docs).unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(posts[1].title, "A");
    }

    #[test]
    fn test_full_document() {
        let post = normalize_document(0, &doc("hello-world", "Hello")).unwrap();
        assert_eq!(post.id, "hello-world");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.subtitle, "sub");
        assert_eq!(post.author, "Ana");
        assert_eq!(post.publication_date, NaiveDate::from_ymd_opt(2021, 3, 25));
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let raw = RawDocument::new(json!({
            "uid": "bare",
            "first_publication_date": null,
            "data": { "title": 42, "subtitle": null }
        }));
        let post = normalize_document(0, &raw).unwrap();
        assert_eq!(post, Post::new("bare"));

        let no_data = RawDocument::new(json!({ "uid": "no-data" }));
        assert_eq!(normalize_document(0, &no_data).unwrap(), Post::new("no-data"));
    }

    #[test]
    fn test_structured_text_title() {
        let raw = RawDocument::new(json!({
            "uid": "rich",
            "data": { "title": [{ "type": "heading1", "text": "Rich title", "spans": [] }] }
        }));
        assert_eq!(normalize_document(0, &raw).unwrap().title, "Rich title");
    }

    #[test]
    fn test_missing_uid_is_malformed() {
        let docs = vec![
            doc("a", "A"),
            RawDocument::new(json!({ "id": "X1", "data": { "title": "No uid" } })),
        ];
        match normalize(&docs) {
            Err(Error::MalformedDocument { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected MalformedDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_unusable_uid_is_malformed() {
        for uid in [json!(""), json!(null), json!(7), json!(["a"])] {
            let raw = RawDocument::new(json!({ "uid": uid, "data": {} }));
            assert!(matches!(
                normalize_document(3, &raw),
                Err(Error::MalformedDocument { index: 3, .. })
            ));
        }
        assert!(normalize_document(0, &RawDocument::new(json!("not an object"))).is_err());
    }

    #[test]
    fn test_uid_must_be_a_slug() {
        for uid in ["Hello", "hello world", "a\"b", "../x"] {
            let raw = RawDocument::new(json!({ "uid": uid, "data": {} }));
            match normalize_document(2, &raw) {
                Err(Error::MalformedDocument { index, reason }) => {
                    assert_eq!(index, 2);
                    assert!(reason.contains("not a slug"), "{}", reason);
                }
                other => panic!("expected MalformedDocument for {:?}, got {:?}", uid, other),
            }
        }
    }

    #[test]
    fn test_normalize_page_keeps_token() {
        let page = RawPage::new(vec![doc("a", "A")], Some("tok1".to_string()));
        let page = normalize_page(page).unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.next_page.as_deref(), Some("tok1"));
    }

    #[test]
    fn test_publication_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 25);
        assert_eq!(parse_publication_date("2021-03-25T19:25:28+0000"), expected);
        assert_eq!(parse_publication_date("2021-03-25T19:25:28Z"), expected);
        assert_eq!(parse_publication_date("2021-03-25"), expected);
        assert_eq!(parse_publication_date("yesterday"), None);
    }

    #[test]
    fn test_article_content() {
        let raw = RawDocument::new(json!({
            "uid": "como-utilizar-hooks",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": "Como utilizar Hooks",
                "author": "Joseph Oliveira",
                "banner": { "url": "https://images.prismic.io/banner.png" },
                "content": [
                    {
                        "heading": "Proin et varius",
                        "body": [
                            { "type": "paragraph", "text": "Lorem ipsum dolor", "spans": [
                                { "start": 0, "end": 5, "type": "strong" }
                            ] },
                            { "type": "list-item", "text": "item", "spans": [] }
                        ]
                    },
                    "garbage",
                    { "heading": null, "body": [] }
                ]
            }
        }));

        let article = normalize_article(&raw).unwrap();
        assert_eq!(article.post.id, "como-utilizar-hooks");
        assert_eq!(
            article.banner_url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(article.content.len(), 3);
        assert_eq!(article.content[0].heading, "Proin et varius");
        assert_eq!(article.content[0].body.len(), 2);
        assert_eq!(article.content[0].body[0].marks[0].kind, "strong");
        assert_eq!(article.content[0].body[1].kind, "list-item");
        assert_eq!(article.content[1], ContentBlock::default());
        assert_eq!(article.content[2], ContentBlock::default());
    }

    #[test]
    fn test_article_without_uid_is_malformed() {
        let raw = RawDocument::new(json!({ "data": { "content": [] } }));
        assert!(matches!(
            normalize_article(&raw),
            Err(Error::MalformedDocument { .. })
        ));
    }
}
