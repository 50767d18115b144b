//! Content module - CMS documents, normalization and article metrics

pub mod normalize;
mod post;
mod raw;
pub mod reading_time;
pub mod richtext;

pub use normalize::{normalize, normalize_article, normalize_page};
pub use post::{Article, ContentBlock, InlineMark, Post, PostPage, RichTextSpan};
pub use raw::{RawDocument, RawPage};
pub use reading_time::{estimate, ReadingTimeEstimate, DEFAULT_WORDS_PER_MINUTE};
