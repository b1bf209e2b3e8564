use super::state::{LICENSE_OPEN_SOURCE, OS_LINUX, OS_MAC, OS_WINDOWS, STATUS_STABLE};
use super::{FilterKey, FilterStage, OsiLicenses, SpecifierSet, Version, retain_matching};
use crate::search::SearchResult;
use hub_types::{CategoryDimension, PluginRecord, PluginType};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use tracing::debug;

const OS_INDEPENDENT: &str = "OS Independent";

static OS_PATTERNS: LazyLock<[(&'static str, Regex); 3]> = LazyLock::new(|| {
    [
        (OS_LINUX, Regex::new(r"Linux").expect("static regex")),
        (OS_MAC, Regex::new(r"MacOS").expect("static regex")),
        (OS_WINDOWS, Regex::new(r"Windows").expect("static regex")),
    ]
});

const STABLE_STATUSES: [&str; 2] = [
    "Development Status :: 5 - Production/Stable",
    "Development Status :: 6 - Mature",
];

fn intersects<'r>(mut values: impl Iterator<Item = &'r str>, enabled: &BTreeSet<String>) -> bool {
    values.any(|value| enabled.contains(value))
}

/// Record's python specifier admits one of the enabled versions
pub struct PythonVersionStage;

impl FilterStage for PythonVersionStage {
    fn key(&self) -> FilterKey {
        FilterKey::PythonVersion
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        let versions: Vec<Version> = enabled.iter().filter_map(|v| v.parse().ok()).collect();

        // Many records share a specifier string; parse each distinct one once
        let mut parsed: HashMap<&'a str, Option<SpecifierSet>> = HashMap::new();
        let mut unparseable = 0usize;

        let kept = retain_matching(results, |record| {
            let specifiers = parsed
                .entry(record.python_version.as_str())
                .or_insert_with(|| match record.python_version.parse::<SpecifierSet>() {
                    Ok(set) => Some(set),
                    Err(e) => {
                        debug!("Ignoring python_version of '{}': {e}", record.name);
                        unparseable += 1;
                        None
                    }
                });
            specifiers
                .as_ref()
                .is_some_and(|set| versions.iter().any(|v| set.contains(v)))
        });

        if unparseable > 0 {
            debug!("{unparseable} distinct python specifiers could not be parsed");
        }
        kept
    }
}

/// Record declares OS independence or a classifier of an enabled OS family
pub struct OperatingSystemStage;

impl OperatingSystemStage {
    fn matches(record: &PluginRecord, enabled: &BTreeSet<String>) -> bool {
        if record
            .operating_system
            .iter()
            .any(|os| os.contains(OS_INDEPENDENT))
        {
            return true;
        }

        OS_PATTERNS
            .iter()
            .filter(|(option, _)| enabled.contains(*option))
            .any(|(_, pattern)| record.operating_system.iter().any(|os| pattern.is_match(os)))
    }
}

impl FilterStage for OperatingSystemStage {
    fn key(&self) -> FilterKey {
        FilterKey::OperatingSystem
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        retain_matching(results, |record| Self::matches(record, enabled))
    }
}

/// "Open source only": the record's license is OSI approved
pub struct LicenseStage {
    licenses: OsiLicenses,
}

impl LicenseStage {
    #[must_use]
    pub fn new(licenses: OsiLicenses) -> Self {
        Self { licenses }
    }
}

impl FilterStage for LicenseStage {
    fn key(&self) -> FilterKey {
        FilterKey::License
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        let open_source = enabled.contains(LICENSE_OPEN_SOURCE);
        retain_matching(results, |record| {
            open_source && self.licenses.contains(&record.license)
        })
    }
}

/// "Stable only": production/stable or mature classifiers
pub struct DevelopmentStatusStage;

impl FilterStage for DevelopmentStatusStage {
    fn key(&self) -> FilterKey {
        FilterKey::DevelopmentStatus
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        let stable_only = enabled.contains(STATUS_STABLE);
        retain_matching(results, |record| {
            stable_only
                && record
                    .development_status
                    .iter()
                    .any(|status| STABLE_STATUSES.contains(&status.as_str()))
        })
    }
}

/// Category terms, including every term along a hierarchy path
pub struct CategoryStage {
    dimension: CategoryDimension,
    key: FilterKey,
}

impl CategoryStage {
    #[must_use]
    pub fn new(key: FilterKey) -> Option<Self> {
        key.category_dimension()
            .map(|dimension| Self { dimension, key })
    }
}

impl FilterStage for CategoryStage {
    fn key(&self) -> FilterKey {
        self.key
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        let dimension = self.dimension;
        retain_matching(results, |record| {
            let flat = record.category_terms(dimension).iter().map(String::as_str);
            let nested = record
                .category_paths(dimension)
                .iter()
                .flatten()
                .map(String::as_str);
            intersects(flat.chain(nested), enabled)
        })
    }
}

pub struct PluginTypeStage;

impl FilterStage for PluginTypeStage {
    fn key(&self) -> FilterKey {
        FilterKey::PluginType
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        retain_matching(results, |record| {
            intersects(record.plugin_types.iter().map(|t| t.as_str()), enabled)
        })
    }
}

/// File extensions, only for plugins that declare the matching capability
pub struct FileExtensionStage {
    key: FilterKey,
    capability: PluginType,
}

impl FileExtensionStage {
    #[must_use]
    pub fn reader() -> Self {
        Self {
            key: FilterKey::ReaderFileExtensions,
            capability: PluginType::Reader,
        }
    }

    #[must_use]
    pub fn writer() -> Self {
        Self {
            key: FilterKey::WriterFileExtensions,
            capability: PluginType::Writer,
        }
    }

    fn extensions<'r>(&self, record: &'r PluginRecord) -> &'r [String] {
        match self.capability {
            PluginType::Writer => &record.writer_file_extensions,
            _ => &record.reader_file_extensions,
        }
    }
}

impl FilterStage for FileExtensionStage {
    fn key(&self) -> FilterKey {
        self.key
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        retain_matching(results, |record| {
            record.has_type(self.capability)
                && intersects(self.extensions(record).iter().map(String::as_str), enabled)
        })
    }
}

pub struct AuthorStage;

impl FilterStage for AuthorStage {
    fn key(&self) -> FilterKey {
        FilterKey::Authors
    }

    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>> {
        retain_matching(results, |record| intersects(record.author_names(), enabled))
    }
}
