use super::{FilterKey, Version};
use hub_types::{CategoryDimension, PluginRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Python versions offered by the python filter
pub const PYTHON_VERSIONS: &[&str] = &["3.7", "3.8", "3.9", "3.10", "3.11", "3.12", "3.13"];

/// One checkbox of a filter dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionCount {
    pub option: String,

    /// Records offering this option; fixed dimensions report 0
    pub count: usize,
}

/// Options a UI can render for each filter dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterOptions {
    dimensions: BTreeMap<FilterKey, Vec<OptionCount>>,
}

impl FilterOptions {
    /// Collect open-ended options from the index; fixed dimensions list their closed sets
    #[must_use]
    pub fn from_records(records: &[PluginRecord]) -> Self {
        let mut counts: BTreeMap<FilterKey, BTreeMap<String, usize>> = BTreeMap::new();

        for record in records {
            let mut seen: BTreeSet<(FilterKey, &str)> = BTreeSet::new();

            for dimension in CategoryDimension::ALL {
                let key = category_key(dimension);
                let flat = record.category_terms(dimension).iter();
                let nested = record.category_paths(dimension).iter().flatten();
                for term in flat.chain(nested) {
                    seen.insert((key, term.as_str()));
                }
            }
            for plugin_type in &record.plugin_types {
                seen.insert((FilterKey::PluginType, plugin_type.as_str()));
            }
            for ext in &record.reader_file_extensions {
                seen.insert((FilterKey::ReaderFileExtensions, ext.as_str()));
            }
            for ext in &record.writer_file_extensions {
                seen.insert((FilterKey::WriterFileExtensions, ext.as_str()));
            }
            for name in record.author_names() {
                seen.insert((FilterKey::Authors, name));
            }

            for (key, option) in seen {
                if key.accepts(option) {
                    *counts
                        .entry(key)
                        .or_default()
                        .entry(option.to_string())
                        .or_default() += 1;
                }
            }
        }

        let mut dimensions: BTreeMap<FilterKey, Vec<OptionCount>> = counts
            .into_iter()
            .map(|(key, options)| {
                let options = options
                    .into_iter()
                    .map(|(option, count)| OptionCount { option, count })
                    .collect();
                (key, options)
            })
            .collect();

        for key in [
            FilterKey::OperatingSystem,
            FilterKey::License,
            FilterKey::DevelopmentStatus,
        ] {
            dimensions.insert(key, fixed(key.fixed_options().unwrap_or_default()));
        }
        dimensions.insert(FilterKey::PythonVersion, python_options());

        Self { dimensions }
    }

    /// Options for one dimension, sorted
    #[must_use]
    pub fn get(&self, key: FilterKey) -> &[OptionCount] {
        self.dimensions.get(&key).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &[OptionCount])> {
        self.dimensions
            .iter()
            .map(|(key, options)| (*key, options.as_slice()))
    }
}

fn category_key(dimension: CategoryDimension) -> FilterKey {
    match dimension {
        CategoryDimension::WorkflowStep => FilterKey::WorkflowStep,
        CategoryDimension::ImageModality => FilterKey::ImageModality,
        CategoryDimension::SupportedData => FilterKey::SupportedData,
    }
}

fn fixed(options: &[&str]) -> Vec<OptionCount> {
    options
        .iter()
        .map(|option| OptionCount {
            option: (*option).to_string(),
            count: 0,
        })
        .collect()
}

/// Offered python versions, in version order
fn python_options() -> Vec<OptionCount> {
    let mut versions: Vec<(Version, &str)> = PYTHON_VERSIONS
        .iter()
        .filter_map(|v| v.parse().ok().map(|parsed| (parsed, *v)))
        .collect();
    versions.sort_by(|a, b| a.0.cmp(&b.0));
    fixed(&versions.into_iter().map(|(_, v)| v).collect::<Vec<_>>())
}
