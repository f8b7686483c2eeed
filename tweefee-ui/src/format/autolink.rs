//! Autolinking
//!
//! Splits tweet text into plain runs and links. Cards build DOM nodes from
//! the segments, so tweet text is never injected as HTML.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::console;
use crate::feed::UrlEntity;

/// Bare URLs, `@mentions` and `#hashtags`
const TOKEN_PATTERN: &str =
    r"(?P<url>https?://\S+)|@(?P<mention>[\p{L}\p{N}_]+)|#(?P<hashtag>[\p{L}\p{N}_]+)";

/// Characters dropped from the end of a bare URL; also valid right after a URL
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', '"', '\''];

/// Longest handle Twitter accepts
const MAX_HANDLE_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link {
        href: String,
        text: String,
        title: Option<String>,
    },
    Mention(String),
    Hashtag(String),
}

struct Span {
    start: usize,
    end: usize,
    segment: Segment,
}

pub fn autolink(text: &str, urls: &[UrlEntity]) -> Vec<Segment> {
    let mut spans = entity_spans(text, urls);
    let tokens = token_spans(text, &spans);
    spans.extend(tokens);
    spans.sort_by_key(|s| s.start);

    let mut segments = Vec::new();
    let mut cursor = 0;
    for span in spans {
        push_text(&mut segments, &text[cursor..span.start]);
        segments.push(span.segment);
        cursor = span.end;
    }
    push_text(&mut segments, &text[cursor..]);
    segments
}

fn token_regex() -> Option<&'static Regex> {
    static TOKENS: OnceLock<Option<Regex>> = OnceLock::new();
    TOKENS
        .get_or_init(|| match Regex::new(TOKEN_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                console::error(&format!("Autolink pattern rejected: {}", e));
                None
            }
        })
        .as_ref()
}

/// Whole-URL occurrences of the short URLs listed in the entities
fn entity_spans(text: &str, urls: &[UrlEntity]) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    for entity in urls.iter().filter(|e| !e.url.is_empty()) {
        for (start, matched) in text.match_indices(entity.url.as_str()) {
            let end = start + matched.len();
            if !is_whole_url(text, start, end) || overlaps(&spans, start, end) {
                continue;
            }
            spans.push(Span {
                start,
                end,
                segment: Segment::Link {
                    href: entity.url.clone(),
                    text: entity
                        .display_url
                        .clone()
                        .unwrap_or_else(|| entity.url.clone()),
                    title: entity.expanded_url.clone(),
                },
            });
        }
    }
    spans
}

fn token_spans(text: &str, taken: &[Span]) -> Vec<Span> {
    let Some(tokens) = token_regex() else {
        return Vec::new();
    };

    tokens
        .captures_iter(text)
        .filter_map(|caps| token_span(text, &caps))
        .filter(|span| !overlaps(taken, span.start, span.end))
        .collect()
}

fn token_span(text: &str, caps: &Captures<'_>) -> Option<Span> {
    let whole = caps.get(0)?;
    let start = whole.start();
    let prev = text[..start].chars().next_back();

    if let Some(url) = caps.name("url") {
        if prev.is_some_and(is_word_char) {
            return None;
        }
        let url = url.as_str().trim_end_matches(URL_TRAILING);
        if url.ends_with("://") {
            return None;
        }
        return Some(Span {
            start,
            end: start + url.len(),
            segment: Segment::Link {
                href: url.to_string(),
                text: url.to_string(),
                title: None,
            },
        });
    }

    // `&` keeps HTML entities such as `&#39;` out
    if prev.is_some_and(|p| is_word_char(p) || p == '&') {
        return None;
    }

    if let Some(handle) = caps.name("mention") {
        let handle = handle.as_str();
        let valid = handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && handle.len() <= MAX_HANDLE_LEN;
        return valid.then(|| Span {
            start,
            end: whole.end(),
            segment: Segment::Mention(handle.to_string()),
        });
    }

    let tag = caps.name("hashtag")?.as_str();
    if tag.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(Span {
        start,
        end: whole.end(),
        segment: Segment::Hashtag(tag.to_string()),
    })
}

fn is_whole_url(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    before.map_or(true, |c| !is_word_char(c))
        && after.map_or(true, |c| c.is_whitespace() || URL_TRAILING.contains(&c))
}

fn overlaps(spans: &[Span], start: usize, end: usize) -> bool {
    spans.iter().any(|s| start < s.end && s.start < end)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn push_text(out: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Segment::Text(text.to_string()));
    }
}
