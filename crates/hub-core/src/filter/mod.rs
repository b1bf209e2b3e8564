//! Filter Engine: an ordered list of per-dimension stages.
//!
//! Each stage passes its input through untouched when nothing is enabled in
//! its dimension, and otherwise keeps records matching at least one enabled
//! option. Stages are applied left to right so dimensions combine with AND.

mod license;
mod options;
mod stages;
mod state;
mod version;

pub use license::OsiLicenses;
pub use options::{FilterOptions, OptionCount, PYTHON_VERSIONS};
pub use stages::{
    AuthorStage, CategoryStage, DevelopmentStatusStage, FileExtensionStage, LicenseStage,
    OperatingSystemStage, PluginTypeStage, PythonVersionStage,
};
pub use state::{
    FilterKey, FilterState, LICENSE_OPEN_SOURCE, OS_LINUX, OS_MAC, OS_WINDOWS, STATUS_STABLE,
};
pub use version::{Specifier, SpecifierError, SpecifierSet, Version};

use crate::search::SearchResult;
use hub_types::PluginRecord;
use std::collections::BTreeSet;
use tracing::debug;

/// One narrowing step of the filter pipeline
pub trait FilterStage {
    /// Dimension whose enabled options drive this stage
    fn key(&self) -> FilterKey;

    /// Keep the results matching any of `enabled`, which is never empty
    fn retain<'a>(
        &self,
        results: Vec<SearchResult<'a>>,
        enabled: &BTreeSet<String>,
    ) -> Vec<SearchResult<'a>>;

    fn apply<'a>(&self, results: Vec<SearchResult<'a>>, state: &FilterState) -> Vec<SearchResult<'a>> {
        match state.enabled(self.key()) {
            Some(enabled) if !enabled.is_empty() => self.retain(results, enabled),
            _ => results,
        }
    }
}

pub(crate) fn retain_matching<'a>(
    mut results: Vec<SearchResult<'a>>,
    mut predicate: impl FnMut(&'a PluginRecord) -> bool,
) -> Vec<SearchResult<'a>> {
    results.retain(|result| predicate(result.record));
    results
}

pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    /// Pipeline with one stage per dimension, using `licenses` for the open source check
    #[must_use]
    pub fn new(licenses: OsiLicenses) -> Self {
        let mut stages: Vec<Box<dyn FilterStage>> = vec![
            Box::new(PythonVersionStage),
            Box::new(OperatingSystemStage),
            Box::new(LicenseStage::new(licenses)),
            Box::new(DevelopmentStatusStage),
        ];
        stages.extend(
            FilterKey::ALL
                .into_iter()
                .filter_map(CategoryStage::new)
                .map(|stage| Box::new(stage) as Box<dyn FilterStage>),
        );
        stages.push(Box::new(PluginTypeStage));
        stages.push(Box::new(FileExtensionStage::reader()));
        stages.push(Box::new(FileExtensionStage::writer()));
        stages.push(Box::new(AuthorStage));
        Self { stages }
    }

    /// Dimensions covered, in application order
    pub fn keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.stages.iter().map(|stage| stage.key())
    }

    /// Run every stage over a copy of `results`
    #[must_use]
    pub fn filter<'a>(&self, results: &[SearchResult<'a>], state: &FilterState) -> Vec<SearchResult<'a>> {
        let mut current = results.to_vec();
        if state.is_empty() {
            return current;
        }

        for stage in &self.stages {
            let before = current.len();
            current = stage.apply(current, state);
            if current.len() != before {
                debug!("Filter {}: {} -> {} results", stage.key(), before, current.len());
            }
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(OsiLicenses::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::unfiltered;
    use hub_types::{Author, PluginType};

    fn names<'r>(results: &'r [SearchResult<'_>]) -> Vec<&'r str> {
        results.iter().map(|r| r.record.name.as_str()).collect()
    }

    fn with_python(name: &str, spec: &str) -> PluginRecord {
        let mut record = PluginRecord::new(name);
        record.python_version = spec.to_string();
        record
    }

    fn with_os(name: &str, os: &[&str]) -> PluginRecord {
        let mut record = PluginRecord::new(name);
        record.operating_system = os.iter().map(|s| (*s).to_string()).collect();
        record
    }

    fn state(pairs: &[(FilterKey, &str)]) -> FilterState {
        pairs
            .iter()
            .map(|(key, option)| (*key, (*option).to_string()))
            .collect()
    }

    #[test]
    fn test_pipeline_covers_every_dimension() {
        let pipeline = FilterPipeline::default();
        let mut keys: Vec<FilterKey> = pipeline.keys().collect();
        keys.sort();
        assert_eq!(keys, FilterKey::ALL.to_vec());
    }

    #[test]
    fn test_python_exact_match() {
        let records = vec![with_python("new", ">=3.10"), with_python("pinned", "==3.9")];
        let results = unfiltered(&records);
        let filtered =
            FilterPipeline::default().filter(&results, &state(&[(FilterKey::PythonVersion, "3.9")]));
        assert_eq!(names(&filtered), vec!["pinned"]);
    }

    #[test]
    fn test_python_none_satisfy() {
        let records = vec![with_python("new", ">=3.10"), with_python("odd", "<3.10,!=3.9")];
        let results = unfiltered(&records);
        let filtered =
            FilterPipeline::default().filter(&results, &state(&[(FilterKey::PythonVersion, "3.9")]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_python_unparseable_specifier_never_matches() {
        let records = vec![with_python("junk", ">=three"), with_python("any", "")];
        let results = unfiltered(&records);
        let filtered =
            FilterPipeline::default().filter(&results, &state(&[(FilterKey::PythonVersion, "3.11")]));
        assert_eq!(names(&filtered), vec!["any"]);
    }

    #[test]
    fn test_os_independent_always_passes() {
        let records = vec![
            with_os("anywhere", &["Operating System :: OS Independent"]),
            with_os("linux", &["Operating System :: POSIX :: Linux"]),
        ];
        let results = unfiltered(&records);
        let pipeline = FilterPipeline::default();
        for os in [OS_LINUX, OS_MAC, OS_WINDOWS] {
            let filtered = pipeline.filter(&results, &state(&[(FilterKey::OperatingSystem, os)]));
            assert_eq!(filtered[0].record.name, "anywhere", "bypass for {os}");
        }
    }

    #[test]
    fn test_os_family_patterns() {
        let records = vec![
            with_os("linux", &["Operating System :: POSIX :: Linux"]),
            with_os("mac", &["Operating System :: MacOS :: MacOS X"]),
            with_os("win", &["Operating System :: Microsoft :: Windows :: Windows 10"]),
        ];
        let results = unfiltered(&records);
        let pipeline = FilterPipeline::default();

        let mac = pipeline.filter(&results, &state(&[(FilterKey::OperatingSystem, OS_MAC)]));
        assert_eq!(names(&mac), vec!["mac"]);

        let either = pipeline.filter(
            &results,
            &state(&[
                (FilterKey::OperatingSystem, OS_LINUX),
                (FilterKey::OperatingSystem, OS_WINDOWS),
            ]),
        );
        assert_eq!(names(&either), vec!["linux", "win"]);
    }

    #[test]
    fn test_open_source_license() {
        let mut mit = PluginRecord::new("mit");
        mit.license = "MIT".into();
        let mut closed = PluginRecord::new("closed");
        closed.license = "Proprietary".into();
        let records = vec![mit, closed];
        let results = unfiltered(&records);
        let filtered = FilterPipeline::default()
            .filter(&results, &state(&[(FilterKey::License, LICENSE_OPEN_SOURCE)]));
        assert_eq!(names(&filtered), vec!["mit"]);
    }

    #[test]
    fn test_stable_status() {
        let mut stable = PluginRecord::new("stable");
        stable.development_status = vec!["Development Status :: 5 - Production/Stable".into()];
        let mut mature = PluginRecord::new("mature");
        mature.development_status = vec!["Development Status :: 6 - Mature".into()];
        let mut beta = PluginRecord::new("beta");
        beta.development_status = vec!["Development Status :: 4 - Beta".into()];
        let records = vec![stable, beta, mature];
        let results = unfiltered(&records);
        let filtered = FilterPipeline::default()
            .filter(&results, &state(&[(FilterKey::DevelopmentStatus, STATUS_STABLE)]));
        assert_eq!(names(&filtered), vec!["stable", "mature"]);
    }

    #[test]
    fn test_category_hierarchy_parent_matches_child() {
        let mut child = PluginRecord::new("semantic");
        child.category_hierarchy.insert(
            "Workflow step".into(),
            vec![vec![
                "Image segmentation".into(),
                "Semantic segmentation".into(),
            ]],
        );
        let mut flat = PluginRecord::new("flat");
        flat.category
            .insert("Workflow step".into(), vec!["Image registration".into()]);
        let records = vec![child, flat];
        let results = unfiltered(&records);
        let pipeline = FilterPipeline::default();

        let parent = pipeline.filter(
            &results,
            &state(&[(FilterKey::WorkflowStep, "Image segmentation")]),
        );
        assert_eq!(names(&parent), vec!["semantic"]);

        let registration = pipeline.filter(
            &results,
            &state(&[(FilterKey::WorkflowStep, "Image registration")]),
        );
        assert_eq!(names(&registration), vec!["flat"]);

        let other_dimension = pipeline.filter(
            &results,
            &state(&[(FilterKey::ImageModality, "Image registration")]),
        );
        assert!(other_dimension.is_empty());
    }

    #[test]
    fn test_extension_requires_capability() {
        let mut reader = PluginRecord::new("reader");
        reader.plugin_types = vec![PluginType::Reader];
        reader.reader_file_extensions = vec![".tif".into()];
        let mut stale = PluginRecord::new("stale");
        stale.plugin_types = vec![PluginType::Widget];
        stale.reader_file_extensions = vec![".tif".into()];
        let records = vec![reader, stale];
        let results = unfiltered(&records);
        let pipeline = FilterPipeline::default();

        let filtered =
            pipeline.filter(&results, &state(&[(FilterKey::ReaderFileExtensions, ".tif")]));
        assert_eq!(names(&filtered), vec!["reader"]);

        let writers =
            pipeline.filter(&results, &state(&[(FilterKey::WriterFileExtensions, ".tif")]));
        assert!(writers.is_empty());
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let mut a = with_os("a", &["Operating System :: POSIX :: Linux"]);
        a.authors = vec![Author::new("Ada")];
        let mut b = with_os("b", &["Operating System :: POSIX :: Linux"]);
        b.authors = vec![Author::new("Grace")];
        let records = vec![a, b];
        let results = unfiltered(&records);
        let filtered = FilterPipeline::default().filter(
            &results,
            &state(&[
                (FilterKey::OperatingSystem, OS_LINUX),
                (FilterKey::Authors, "Grace"),
            ]),
        );
        assert_eq!(names(&filtered), vec!["b"]);
    }

    #[test]
    fn test_plugin_type_and_empty_state() {
        let mut widget = PluginRecord::new("widget");
        widget.plugin_types = vec![PluginType::Widget];
        let records = vec![PluginRecord::new("bare"), widget];
        let results = unfiltered(&records);
        let pipeline = FilterPipeline::default();

        assert_eq!(pipeline.filter(&results, &FilterState::new()), results);
        let filtered = pipeline.filter(&results, &state(&[(FilterKey::PluginType, "widget")]));
        assert_eq!(names(&filtered), vec!["widget"]);
    }
}
