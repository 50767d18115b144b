//! Structured text rendering (plain text and HTML)

use super::{InlineMark, RichTextSpan};

/// Render structured text as plain text.
///
/// Inline formatting is dropped; elements are separated by newlines.
pub fn as_plain_text(spans: &[RichTextSpan]) -> String {
    spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render structured text as HTML
pub fn as_html(spans: &[RichTextSpan]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for span in spans {
        let list = match span.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        let tag = block_tag(&span.kind);
        html.push_str(&format!("<{}>{}</{}>", tag, render_inline(span), tag));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn block_tag(kind: &str) -> &'static str {
    match kind {
        "heading1" => "h1",
        "heading2" => "h2",
        "heading3" => "h3",
        "heading4" => "h4",
        "heading5" => "h5",
        "heading6" => "h6",
        "preformatted" => "pre",
        "list-item" | "o-list-item" => "li",
        _ => "p",
    }
}

/// Apply inline marks to the element text, keeping tags properly nested
fn render_inline(span: &RichTextSpan) -> String {
    let chars: Vec<char> = span.text.chars().collect();
    let len = chars.len();

    let mut marks: Vec<&InlineMark> = span
        .marks
        .iter()
        .filter(|m| m.start < m.end && m.start < len)
        .collect();
    // Wider marks open first so narrower ones nest inside them
    marks.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let ends_at = |m: &InlineMark, pos: usize| m.end.min(len) <= pos;

    let mut out = String::with_capacity(span.text.len());
    let mut open: Vec<&InlineMark> = Vec::new();
    let mut next = 0;

    for pos in 0..=len {
        if open.iter().any(|m| ends_at(m, pos)) {
            // Unwind to the innermost finished mark, then reopen survivors
            let mut reopen = Vec::new();
            while let Some(m) = open.pop() {
                out.push_str(&close_tag(m));
                if !ends_at(m, pos) {
                    reopen.push(m);
                }
                if !open.iter().any(|m| ends_at(m, pos)) {
                    break;
                }
            }
            for m in reopen.into_iter().rev() {
                out.push_str(&open_tag(m));
                open.push(m);
            }
        }

        while next < marks.len() && marks[next].start == pos {
            out.push_str(&open_tag(marks[next]));
            open.push(marks[next]);
            next += 1;
        }

        if pos < len {
            push_escaped(&mut out, chars[pos]);
        }
    }

    out
}

fn open_tag(mark: &InlineMark) -> String {
    match mark.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let href = mark.url.as_deref().filter(|url| is_safe_href(url)).unwrap_or("#");
            format!(r#"<a href="{}">"#, html_escape(href))
        }
        other => format!(r#"<span class="{}">"#, html_escape(other)),
    }
}

/// Only `http`, `https`, `mailto` and relative links are rendered
fn is_safe_href(url: &str) -> bool {
    let url = url.trim();
    let Some(colon) = url.find(':') else {
        return true;
    };
    // a colon after the path, query or fragment starts is not a scheme
    if url[..colon].contains(&['/', '?', '#'][..]) {
        return true;
    }

    // browsers ignore whitespace and control characters inside the scheme
    let scheme = url[..colon]
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(scheme.as_str(), "http" | "https" | "mailto")
}

fn close_tag(mark: &InlineMark) -> String {
    match mark.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
    .to_string()
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        push_escaped(&mut out, c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(start: usize, end: usize, kind: &str) -> InlineMark {
        InlineMark {
            start,
            end,
            kind: kind.to_string(),
            url: None,
        }
    }

    #[test]
    fn test_plain_text_joins_elements() {
        let spans = vec![
            RichTextSpan::paragraph("first paragraph"),
            RichTextSpan::paragraph("second"),
        ];
        assert_eq!(as_plain_text(&spans), "first paragraph\nsecond");
        assert_eq!(as_plain_text(&[]), "");
    }

    #[test]
    fn test_plain_text_drops_formatting() {
        let mut span = RichTextSpan::paragraph("bold move");
        span.marks.push(mark(0, 4, "strong"));
        assert_eq!(as_plain_text(&[span]), "bold move");
    }

    #[test]
    fn test_html_blocks_and_lists() {
        let spans = vec![
            RichTextSpan {
                kind: "heading2".to_string(),
                text: "Intro".to_string(),
                marks: Vec::new(),
            },
            RichTextSpan {
                kind: "list-item".to_string(),
                text: "one".to_string(),
                marks: Vec::new(),
            },
            RichTextSpan {
                kind: "list-item".to_string(),
                text: "two".to_string(),
                marks: Vec::new(),
            },
            RichTextSpan::paragraph("a < b"),
        ];
        assert_eq!(
            as_html(&spans),
            "<h2>Intro</h2><ul><li>one</li><li>two</li></ul><p>a &lt; b</p>"
        );
    }

    #[test]
    fn test_html_inline_marks() {
        let mut span = RichTextSpan::paragraph("read the docs now");
        span.marks.push(mark(0, 4, "strong"));
        span.marks.push(InlineMark {
            start: 9,
            end: 13,
            kind: "hyperlink".to_string(),
            url: Some("https://example.com".to_string()),
        });
        assert_eq!(
            as_html(&[span]),
            r#"<p><strong>read</strong> the <a href="https://example.com">docs</a> now</p>"#
        );
    }

    #[test]
    fn test_html_overlapping_marks_stay_nested() {
        let mut span = RichTextSpan::paragraph("abcdef");
        span.marks.push(mark(0, 4, "strong"));
        span.marks.push(mark(2, 6, "em"));
        assert_eq!(
            as_html(&[span]),
            "<p><strong>ab<em>cd</em></strong><em>ef</em></p>"
        );
    }

    #[test]
    fn test_unsafe_link_schemes_are_dropped() {
        for url in ["javascript:alert(1)", " JavaScript:alert(1)", "java\tscript:x", "data:text/html,x"] {
            let mut span = RichTextSpan::paragraph("click");
            span.marks.push(InlineMark {
                start: 0,
                end: 5,
                kind: "hyperlink".to_string(),
                url: Some(url.to_string()),
            });
            assert_eq!(as_html(&[span]), r##"<p><a href="#">click</a></p>"##, "{}", url);
        }
    }

    #[test]
    fn test_safe_hrefs() {
        assert!(is_safe_href("https://example.com/a:b"));
        assert!(is_safe_href("HTTP://example.com"));
        assert!(is_safe_href("mailto:joseph@example.com"));
        assert!(is_safe_href("/post/hooks/"));
        assert!(is_safe_href("post/hooks/?at=12:30"));
        assert!(is_safe_href("#section"));
        assert!(!is_safe_href("vbscript:msgbox"));
        assert!(!is_safe_href("ftp://example.com"));
    }

    #[test]
    fn test_marks_use_character_offsets() {
        let mut span = RichTextSpan::paragraph("olá mundo");
        span.marks.push(mark(0, 3, "em"));
        assert_eq!(as_html(&[span]), "<p><em>olá</em> mundo</p>");
    }
}
