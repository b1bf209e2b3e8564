use super::SearchQueryState;
use crate::filter::{FilterKey, LICENSE_OPEN_SOURCE};
use hub_types::SortType;
use tracing::debug;
use url::form_urlencoded;

const PARAM_SEARCH: &str = "search";
const PARAM_SORT: &str = "sort";
const PARAM_PAGE: &str = "page";

const LICENSE_OSS: &str = "oss";

/// Translates between a query string and `SearchQueryState`
pub trait QueryCodec {
    /// Never fails; unusable parameters fall back to their default
    fn decode(&self, query_string: &str) -> SearchQueryState;

    /// Sparse encoding: defaults and disabled options are omitted
    fn encode(&self, state: &SearchQueryState) -> String;

    /// Sort used when the query string names none and there is no search text
    fn default_sort(&self) -> SortType;
}

/// URL parameter carrying a filter dimension
#[must_use]
pub fn filter_param(key: FilterKey) -> &'static str {
    match key {
        FilterKey::PythonVersion => "python",
        FilterKey::OperatingSystem => "operatingSystem",
        FilterKey::License => "license",
        FilterKey::DevelopmentStatus => "devStatus",
        FilterKey::WorkflowStep => "workflowStep",
        FilterKey::ImageModality => "imageModality",
        FilterKey::SupportedData => "supportedData",
        FilterKey::PluginType => "pluginType",
        FilterKey::ReaderFileExtensions => "readerFileExtensions",
        FilterKey::WriterFileExtensions => "writerFileExtensions",
        FilterKey::Authors => "authors",
    }
}

fn filter_key(param: &str) -> Option<FilterKey> {
    FilterKey::ALL.into_iter().find(|key| filter_param(*key) == param)
}

fn option_to_param(key: FilterKey, option: &str) -> &str {
    match (key, option) {
        (FilterKey::License, LICENSE_OPEN_SOURCE) => LICENSE_OSS,
        _ => option,
    }
}

fn option_from_param(key: FilterKey, value: &str) -> Option<&str> {
    match key {
        FilterKey::License => (value == LICENSE_OSS).then_some(LICENSE_OPEN_SOURCE),
        _ => Some(value),
    }
}

/// Codec for browser query strings such as `search=video&operatingSystem=mac`
#[derive(Debug, Clone, Copy)]
pub struct UrlQueryCodec {
    default_sort: SortType,
}

impl UrlQueryCodec {
    #[must_use]
    pub fn new(default_sort: SortType) -> Self {
        Self { default_sort }
    }
}

impl Default for UrlQueryCodec {
    fn default() -> Self {
        Self::new(SortType::default())
    }
}

/// Query part of `input`, which may be a full URL or a bare query string
fn query_part(input: &str) -> &str {
    let input = input.split_once('#').map_or(input, |(before, _)| before);
    input.split_once('?').map_or(input, |(_, query)| query)
}

impl QueryCodec for UrlQueryCodec {
    fn default_sort(&self) -> SortType {
        self.default_sort
    }

    fn decode(&self, query_string: &str) -> SearchQueryState {
        let mut state = SearchQueryState::new(self.default_sort);
        let mut sort = None;

        for (param, value) in form_urlencoded::parse(query_part(query_string).as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match param.as_ref() {
                PARAM_SEARCH => state.query = value.into_owned(),
                PARAM_SORT => match value.parse::<SortType>() {
                    Ok(parsed) => sort = Some(parsed),
                    Err(e) => debug!("Ignoring URL parameter: {e}"),
                },
                PARAM_PAGE => match value.parse::<usize>() {
                    Ok(page) if page > 0 => state.page = page,
                    _ => debug!("Ignoring page '{value}'"),
                },
                other => {
                    let Some(key) = filter_key(other) else {
                        debug!("Ignoring unknown URL parameter '{other}'");
                        continue;
                    };
                    let accepted = option_from_param(key, &value)
                        .is_some_and(|option| state.filters.set(key, option, true));
                    if !accepted && !state.filters.is_enabled(key, &value) {
                        debug!("Ignoring {other}={value}");
                    }
                }
            }
        }

        state.sort = match sort {
            Some(SortType::Relevance) if !state.has_query() => self.default_sort,
            Some(sort) => sort,
            None => state.implicit_sort(self.default_sort),
        };
        state
    }

    fn encode(&self, state: &SearchQueryState) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if !state.query.is_empty() {
            serializer.append_pair(PARAM_SEARCH, &state.query);
        }
        if state.sort != state.implicit_sort(self.default_sort) {
            serializer.append_pair(PARAM_SORT, state.sort.token());
        }
        if state.page > 1 {
            serializer.append_pair(PARAM_PAGE, &state.page.to_string());
        }
        for (key, options) in state.filters.active() {
            for option in options {
                serializer.append_pair(filter_param(key), option_to_param(key, option));
            }
        }

        serializer.finish()
    }
}
