use hub_types::PluginRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Single-valued text fields the search engine indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchField {
    Name,
    DisplayName,
    Summary,
    DescriptionText,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        Self::Name,
        Self::DisplayName,
        Self::Summary,
        Self::DescriptionText,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DisplayName => "display_name",
            Self::Summary => "summary",
            Self::DescriptionText => "description_text",
        }
    }

    /// The field's text on a record; an absent display name reads as empty
    #[must_use]
    pub fn text(self, record: &PluginRecord) -> &str {
        match self {
            Self::Name => &record.name,
            Self::DisplayName => record.display_name.as_deref().unwrap_or(""),
            Self::Summary => &record.summary,
            Self::DescriptionText => &record.description_text,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a highlight span.
///
/// Authors are keyed by the matched author's name since a record can list several.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchKey {
    Field(SearchField),
    Author(String),
}

/// Best substring match within one field, in char offsets (`end` exclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub matched_text: String,
}

impl MatchSpan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

pub type MatchMap = HashMap<MatchKey, MatchSpan>;

/// Search output for one record, detached from the index it came from
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchHit {
    pub index: usize,
    pub score: f64,
    pub matches: MatchMap,
}

/// One scored, annotated record in a result set
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    pub record: &'a PluginRecord,

    /// Position in the unfiltered index; stable across re-sorts
    pub index: usize,

    /// Weighted relevance, 0.0 when not searching
    pub score: f64,

    /// Highlight spans; empty when not searching
    pub matches: MatchMap,
}

impl<'a> SearchResult<'a> {
    /// Result for a record when no query is active
    #[must_use]
    pub fn unscored(record: &'a PluginRecord, index: usize) -> Self {
        Self {
            record,
            index,
            score: 0.0,
            matches: MatchMap::new(),
        }
    }

    #[must_use]
    pub fn span(&self, field: SearchField) -> Option<&MatchSpan> {
        self.matches.get(&MatchKey::Field(field))
    }

    #[must_use]
    pub fn author_span(&self, author: &str) -> Option<&MatchSpan> {
        self.matches.get(&MatchKey::Author(author.to_string()))
    }
}

/// The whole index in original order with empty match maps
#[must_use]
pub fn unfiltered(records: &[PluginRecord]) -> Vec<SearchResult<'_>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| SearchResult::unscored(record, index))
        .collect()
}

/// Attach hits to the records they point into, dropping stale positions
pub(crate) fn resolve<'a>(hits: &[SearchHit], records: &'a [PluginRecord]) -> Vec<SearchResult<'a>> {
    hits.iter()
        .filter_map(|hit| {
            records.get(hit.index).map(|record| SearchResult {
                record,
                index: hit.index,
                score: hit.score,
                matches: hit.matches.clone(),
            })
        })
        .collect()
}
