//! Content-type gating and readable-text reduction for fetched pages.
//!
//! [`is_text_like`] decides whether a response is worth reading at all.
//! [`readable_text`] turns an accepted body into something compact enough to
//! hand to a summariser: HTML is reduced to the text of its main content
//! area, everything is whitespace-normalised and capped in size.

use scraper::{ElementRef, Html, Node, Selector};

/// Media types accepted verbatim, after parameters are stripped.
const TEXT_MEDIA_TYPES: &[&str] = &[
    "text/html",
    "text/plain",
    "application/json",
    "application/xml",
    "text/xml",
];

/// Elements whose text never reaches the summariser.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe", "template",
];

/// Content roots tried in priority order.
const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Marker appended when page text is cut short.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";

/// Returns `true` if `media_type` is a text-like type that is safe to summarise.
///
/// Parameters such as `; charset=utf-8` are ignored and matching is
/// case-insensitive. Structured suffix types (`+xml`, `+json`) are accepted,
/// which covers feeds and XHTML.
///
/// ```
/// use websearch::content::is_text_like;
///
/// assert!(is_text_like("application/rss+xml; charset=utf-8"));
/// assert!(!is_text_like("image/png"));
/// assert!(!is_text_like(""));
/// ```
pub fn is_text_like(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence.is_empty() {
        return false;
    }

    TEXT_MEDIA_TYPES.contains(&essence.as_str())
        || essence.ends_with("+xml")
        || essence.ends_with("+json")
}

/// Reduce a fetched body to readable text of at most `max_chars` bytes
/// (plus the truncation marker).
///
/// Returns `None` when nothing readable is left, e.g. a page consisting only
/// of scripts.
pub fn readable_text(body: &str, max_chars: usize) -> Option<String> {
    let raw = if looks_like_html(body) {
        extract_main_text(&Html::parse_document(body))
    } else {
        body.to_owned()
    };

    let text = normalise_whitespace(&raw);
    if text.is_empty() {
        return None;
    }
    Some(truncate_to_limit(&text, max_chars))
}

/// Cheap sniff for HTML documents; only the head of the body is inspected.
fn looks_like_html(body: &str) -> bool {
    let mut end = body.len().min(1024);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    let head = body[..end].to_ascii_lowercase();
    head.contains("<html") || head.contains("<!doctype html") || head.contains("<body")
}

/// Text of the first non-empty content root, skipping boilerplate elements.
fn extract_main_text(document: &Html) -> String {
    for root in CONTENT_ROOTS {
        let Ok(selector) = Selector::parse(root) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let mut text = String::new();
            collect_text(element, &mut text);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }
    String::new()
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of spaces within lines and keep at most one blank line
/// between paragraphs.
fn normalise_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        let previous_blank = lines.last().map_or(true, String::is_empty);
        if collapsed.is_empty() && previous_blank {
            continue;
        }
        lines.push(collapsed);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

fn truncate_to_limit(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_owned();
    }

    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }

    let mut truncated = text[..end].to_owned();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
