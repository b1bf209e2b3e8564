use crate::Result;
use crate::config::{Config, SearchConfig};
use crate::filter::{FilterOptions, FilterPipeline, OsiLicenses};
use crate::index::IndexStore;
use crate::pagination::{Page, page_count, paginate};
use crate::query::SearchQueryState;
use crate::search::{MatchKey, MatchSpan, SearchEngine, SearchHit, SearchResult, resolve, unfiltered};
use crate::sort::sort;
use hub_types::PluginRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// What the rendering layer gets per state change
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<'a> {
    pub items: Vec<SearchResult<'a>>,

    /// Results after filtering, across all pages
    pub total_count: usize,
    pub total_pages: usize,

    /// Requested page clamped to `1..=total_pages`
    pub page: usize,
}

impl<'a> ResultPage<'a> {
    /// Serializable form with match keys flattened to strings
    #[must_use]
    pub fn view(&self) -> ResultPageView<'a, '_> {
        ResultPageView {
            items: self.items.iter().map(ResultView::new).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
            page: self.page,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPageView<'a, 'p> {
    pub items: Vec<ResultView<'a, 'p>>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView<'a, 'p> {
    pub record: &'a PluginRecord,
    pub score: f64,

    /// Field name -> span
    pub matches: BTreeMap<&'static str, &'p MatchSpan>,

    /// Author name -> span
    pub author_matches: BTreeMap<&'p str, &'p MatchSpan>,
}

impl<'a, 'p> ResultView<'a, 'p> {
    fn new(result: &'p SearchResult<'a>) -> Self {
        let mut matches = BTreeMap::new();
        let mut author_matches = BTreeMap::new();
        for (key, span) in &result.matches {
            match key {
                MatchKey::Field(field) => {
                    matches.insert(field.as_str(), span);
                }
                MatchKey::Author(name) => {
                    author_matches.insert(name.as_str(), span);
                }
            }
        }
        Self {
            record: result.record,
            score: result.score,
            matches,
            author_matches,
        }
    }
}

/// The whole discovery pipeline over one index snapshot.
///
/// Search hits for the last query are kept, so filter, sort and page changes
/// only redo the cheap stages.
pub struct HubSearch {
    index: IndexStore,
    config: SearchConfig,
    engine: SearchEngine,
    filters: FilterPipeline,
    last_hits: Option<(String, Vec<SearchHit>)>,
}

impl HubSearch {
    /// Build the pipeline, loading the configured SPDX license list if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured license list cannot be read or parsed.
    pub fn new(index: IndexStore, config: &Config) -> Result<Self> {
        let licenses = match &config.filters.license_list_path {
            Some(path) => OsiLicenses::load(path)?,
            None => OsiLicenses::builtin(),
        };
        Ok(Self::with_licenses(index, config.search.clone(), licenses))
    }

    #[must_use]
    pub fn with_licenses(index: IndexStore, config: SearchConfig, licenses: OsiLicenses) -> Self {
        let mut engine = SearchEngine::new(config.clone());
        engine.index(index.records());
        info!("Search ready over {} plugins", index.len());
        Self {
            index,
            config,
            engine,
            filters: FilterPipeline::new(licenses),
            last_hits: None,
        }
    }

    /// Swap in a new index snapshot and rebuild the search structure
    pub fn replace_index(&mut self, index: IndexStore) {
        self.engine.index(index.records());
        self.index = index;
        self.last_hits = None;
    }

    #[must_use]
    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_records(self.index.records())
    }

    fn refresh_hits(&mut self, query: &str) {
        if self
            .last_hits
            .as_ref()
            .is_some_and(|(last, _)| last == query)
        {
            return;
        }
        let hits = self.engine.hits(query);
        debug!("Query '{query}' matched {} plugins", hits.len());
        self.last_hits = Some((query.to_string(), hits));
    }

    /// Search, filter, sort and paginate for `state`
    pub fn run(&mut self, state: &SearchQueryState) -> ResultPage<'_> {
        let query = state.trimmed_query();
        if !query.is_empty() {
            self.refresh_hits(query);
        }

        let records = self.index.records();
        let results = if query.is_empty() {
            unfiltered(records)
        } else {
            self.last_hits
                .as_ref()
                .map(|(_, hits)| resolve(hits, records))
                .unwrap_or_default()
        };

        let filtered = self.filters.filter(&results, &state.filters);
        let sorted = sort(&filtered, state.sort, &self.config.name_prefixes);

        let page_size = self.config.page_size;
        let page = state.page.clamp(1, page_count(sorted.len(), page_size));
        let Page {
            items,
            total_count,
            total_pages,
        } = paginate(&sorted, page, page_size);

        ResultPage {
            items,
            total_count,
            total_pages,
            page,
        }
    }
}
