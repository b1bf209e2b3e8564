use super::result::{SearchHit, resolve};
use super::spans::{best_span, contiguous_runs};
use super::typo::{TypoMatcher, TypoQuery};
use super::{MatchKey, MatchMap, SearchField, SearchResult};
use crate::config::SearchConfig;
use hub_types::PluginRecord;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use tracing::debug;

/// Field text prepared for matching
struct Haystack {
    text: String,
    /// Decoded chars, only kept for non-ASCII text
    chars: Option<Vec<char>>,
}

impl Haystack {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            chars: (!text.is_ascii()).then(|| text.chars().collect()),
        }
    }

    /// Matcher positions are char offsets into this view
    fn utf32(&self) -> Utf32Str<'_> {
        match &self.chars {
            Some(chars) => Utf32Str::Unicode(chars),
            None => Utf32Str::Ascii(self.text.as_bytes()),
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        match &self.chars {
            Some(chars) => chars[start..end].iter().collect(),
            None => self.text[start..end].to_string(),
        }
    }
}

/// Searchable fields of one record
struct Document {
    fields: Vec<(SearchField, Haystack)>,
    authors: Vec<Haystack>,
}

impl Document {
    fn new(record: &PluginRecord) -> Self {
        let fields = SearchField::ALL
            .into_iter()
            .filter_map(|field| {
                let text = field.text(record);
                (!text.trim().is_empty()).then(|| (field, Haystack::new(text)))
            })
            .collect();

        let authors = record
            .author_names()
            .filter(|name| !name.trim().is_empty())
            .map(Haystack::new)
            .collect();

        Self { fields, authors }
    }
}

/// Fuzzy search engine over the weighted text fields of the plugin index.
///
/// A field matches when nucleo finds the query as a subsequence, or when every
/// query term is within a few edits of some word in the field. Either way the
/// normalized score must reach the configured threshold.
pub struct SearchEngine {
    matcher: Matcher,
    typo: TypoMatcher,
    config: SearchConfig,
    documents: Option<Vec<Document>>,
}

impl SearchEngine {
    /// Create a search engine with no index yet
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            typo: TypoMatcher::new(),
            config,
            documents: None,
        }
    }

    /// Build the searchable structure for an index snapshot, replacing any previous one.
    pub fn index(&mut self, records: &[PluginRecord]) {
        let documents: Vec<Document> = records.iter().map(Document::new).collect();
        debug!("Indexed {} records for search", documents.len());
        self.documents = Some(documents);
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.documents.is_some()
    }

    /// Search the indexed records, best match first.
    ///
    /// `records` must be the slice passed to [`SearchEngine::index`]. Returns an
    /// empty list for a blank query or before indexing; callers handle the
    /// empty query with [`super::unfiltered`].
    pub fn search<'a>(&mut self, query: &str, records: &'a [PluginRecord]) -> Vec<SearchResult<'a>> {
        let hits = self.hits(query);
        resolve(&hits, records)
    }

    /// Score every indexed document against the query.
    pub(crate) fn hits(&mut self, query: &str) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let Some(documents) = self.documents.as_ref() else {
            debug!("Search for '{query}' before the index was built");
            return Vec::new();
        };
        let matcher = &mut self.matcher;
        let config = &self.config;

        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        // A query matched against itself is the best score any field can reach
        let mut buf = Vec::new();
        let Some(best_possible) = pattern.score(Utf32Str::new(query, &mut buf), matcher) else {
            return Vec::new();
        };
        let best_possible = f64::from(best_possible.max(1));
        let typo = self.typo.compile(query, config.threshold);

        let mut scorer = FieldScorer {
            pattern: &pattern,
            typo: &typo,
            matcher,
            query,
            best_possible,
            threshold: config.threshold,
            min_len: config.min_match_char_length,
            positions: Vec::new(),
        };

        let mut hits: Vec<SearchHit> = documents
            .iter()
            .enumerate()
            .filter_map(|(index, doc)| scorer.score_document(index, doc, config))
            .collect();

        debug!("Search '{query}' matched {} records", hits.len());

        // Stable: equal scores keep index order
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        hits
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Per-query matching state shared across documents
struct FieldScorer<'p> {
    pattern: &'p Pattern,
    typo: &'p TypoQuery,
    matcher: &'p mut Matcher,
    query: &'p str,
    best_possible: f64,
    threshold: f64,
    min_len: usize,
    positions: Vec<u32>,
}

impl FieldScorer<'_> {
    fn score_document(
        &mut self,
        index: usize,
        doc: &Document,
        config: &SearchConfig,
    ) -> Option<SearchHit> {
        let weights = &config.weights;
        let mut score = 0.0;
        let mut matched = false;
        let mut matches = MatchMap::new();

        for (field, haystack) in &doc.fields {
            let Some((ratio, span)) = self.score_field(haystack) else {
                continue;
            };
            matched = true;
            let weight = match field {
                SearchField::Name => weights.name,
                SearchField::DisplayName => weights.display_name,
                SearchField::Summary => weights.summary,
                SearchField::DescriptionText => weights.description_text,
            };
            score += weight * ratio;
            if let Some(span) = span {
                matches.insert(MatchKey::Field(*field), span);
            }
        }

        // Authors count once, by their best match, but each gets its own span
        let mut best_author: f64 = 0.0;
        for haystack in &doc.authors {
            let Some((ratio, span)) = self.score_field(haystack) else {
                continue;
            };
            matched = true;
            best_author = best_author.max(ratio);
            if let Some(span) = span {
                matches.insert(MatchKey::Author(haystack.text.clone()), span);
            }
        }
        score += weights.authors * best_author;

        matched.then_some(SearchHit {
            index,
            score,
            matches,
        })
    }

    /// Normalized score and highlight span, or `None` below the threshold
    fn score_field(&mut self, haystack: &Haystack) -> Option<(f64, Option<super::MatchSpan>)> {
        let subsequence = self.score_subsequence(haystack);
        let typo = self
            .typo
            .score(&haystack.text, self.min_len)
            .filter(|(ratio, _)| *ratio >= self.threshold);

        match (subsequence, typo) {
            (Some(found), Some(typo)) if typo.0 > found.0 => Some(typo),
            (Some(found), _) => Some(found),
            (None, typo) => typo,
        }
    }

    fn score_subsequence(&mut self, haystack: &Haystack) -> Option<(f64, Option<super::MatchSpan>)> {
        self.positions.clear();
        let raw = self
            .pattern
            .indices(haystack.utf32(), self.matcher, &mut self.positions)?;

        let ratio = (f64::from(raw) / self.best_possible).min(1.0);
        if ratio < self.threshold {
            return None;
        }

        let runs = contiguous_runs(&mut self.positions);
        let span = best_span(&runs, self.query, self.min_len, |start, end| {
            haystack.slice(start, end)
        });
        Some((ratio, span))
    }
}
