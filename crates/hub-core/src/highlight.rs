//! Result Highlighter: cut display text into plain and highlighted pieces.
//!
//! Produces no markup; rendering decides what a highlighted segment looks like.

use crate::search::{MatchSpan, SearchField, SearchResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn plain(text: &[char]) -> Self {
        Self {
            text: text.iter().collect(),
            highlighted: false,
        }
    }

    fn marked(text: &[char]) -> Self {
        Self {
            text: text.iter().collect(),
            highlighted: true,
        }
    }
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Start of the first case-insensitive occurrence of `needle`
fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(a, b)| eq_ignore_case(*a, *b))
    })
}

/// Where `span` sits in `chars`: its own offsets when they still hold, otherwise
/// the first case-insensitive occurrence of the matched text
fn locate(chars: &[char], span: &MatchSpan) -> Option<(usize, usize)> {
    let needle: Vec<char> = span.matched_text.chars().collect();
    if needle.is_empty() {
        return None;
    }
    let in_place = chars
        .get(span.start..span.end)
        .is_some_and(|slice| slice == needle.as_slice());
    if in_place {
        return Some((span.start, span.end));
    }
    find_ignore_case(chars, &needle).map(|start| (start, start + needle.len()))
}

/// Split `text` around `span`. Without a usable span the whole text is one plain segment.
#[must_use]
pub fn segments(text: &str, span: Option<&MatchSpan>) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let Some((start, end)) = span.and_then(|span| locate(&chars, span)) else {
        return vec![Segment::plain(&chars)];
    };

    let mut out = Vec::with_capacity(3);
    if start > 0 {
        out.push(Segment::plain(&chars[..start]));
    }
    out.push(Segment::marked(&chars[start..end]));
    if end < chars.len() {
        out.push(Segment::plain(&chars[end..]));
    }
    out
}

/// Display label: the display name when present, else the package name
#[must_use]
pub fn label_segments(result: &SearchResult<'_>) -> Vec<Segment> {
    let field = if result.record.display_name.is_some() {
        SearchField::DisplayName
    } else {
        SearchField::Name
    };
    segments(result.record.label(), result.span(field))
}

#[must_use]
pub fn summary_segments(result: &SearchResult<'_>) -> Vec<Segment> {
    segments(&result.record.summary, result.span(SearchField::Summary))
}

#[must_use]
pub fn description_segments(result: &SearchResult<'_>) -> Vec<Segment> {
    segments(
        &result.record.description_text,
        result.span(SearchField::DescriptionText),
    )
}

/// One segment list per author, in record order
#[must_use]
pub fn author_segments(result: &SearchResult<'_>) -> Vec<Vec<Segment>> {
    result
        .record
        .author_names()
        .map(|name| segments(name, result.author_span(name)))
        .collect()
}

/// Concatenate segments, wrapping highlighted ones in `open`/`close`
#[must_use]
pub fn render(segments: &[Segment], open: &str, close: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        if segment.highlighted {
            out.push_str(open);
            out.push_str(&segment.text);
            out.push_str(close);
        } else {
            out.push_str(&segment.text);
        }
    }
    out
}
