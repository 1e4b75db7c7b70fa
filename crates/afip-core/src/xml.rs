//! # XML Text Utilities
//!
//! Minimal helpers for the hand-built XML this stack exchanges with the
//! AFIP services: entity escaping for request construction, unescaping for
//! the doubly-encoded ticket the auth service returns, and tag-text
//! extraction for scraping the fixed response shapes.
//!
//! This is deliberately not a general XML parser. Both services answer
//! with small, fixed documents whose element names never collide in
//! meaningful ways, so first-match text extraction and repeated-block
//! slicing cover every response this stack reads.

/// Escape the five XML entities in element text.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`]. `&amp;` is resolved last so doubly-escaped content
/// unescapes one level at a time.
pub fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Text content of the first `<tag>…</tag>` occurrence, if any.
///
/// Matches both plain (`<tag>`) and attributed (`<tag attr="…">`) opening
/// forms. Returns the raw inner slice without unescaping.
pub fn tag_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    tag_block_at(xml, tag).map(|(inner, _)| inner)
}

/// Inner content of every `<tag>…</tag>` occurrence, in document order.
pub fn tag_blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let mut blocks = Vec::new();
    let mut rest = xml;
    while let Some((inner, past_element)) = tag_block_at(rest, tag) {
        blocks.push(inner);
        rest = &rest[past_element..];
    }
    blocks
}

/// First `<tag>…</tag>` occurrence: inner slice plus the index just past
/// the element, for resuming a scan. Handles attributed and self-closing
/// opening tags and rejects prefix collisions (`<tagname>` must not match
/// `<tag>`).
fn tag_block_at<'a>(xml: &'a str, tag: &str) -> Option<(&'a str, usize)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search_from = 0;
    loop {
        let start = xml[search_from..].find(&open)? + search_from;
        let after_name = start + open.len();
        match xml.as_bytes().get(after_name) {
            Some(b'>') => {
                let content_start = after_name + 1;
                let end = xml[content_start..].find(&close)? + content_start;
                return Some((&xml[content_start..end], end + close.len()));
            }
            Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                let tag_end = xml[after_name..].find('>')? + after_name;
                if xml.as_bytes()[tag_end - 1] == b'/' {
                    // Self-closing with attributes: empty content.
                    return Some((&xml[tag_end..tag_end], tag_end + 1));
                }
                let content_start = tag_end + 1;
                let end = xml[content_start..].find(&close)? + content_start;
                return Some((&xml[content_start..end], end + close.len()));
            }
            Some(b'/') if xml.as_bytes().get(after_name + 1) == Some(&b'>') => {
                return Some((&xml[after_name..after_name], after_name + 2));
            }
            _ => {
                // Longer element name sharing this prefix; keep scanning.
                search_from = after_name;
            }
        }
    }
}
