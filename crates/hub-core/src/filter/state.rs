use super::Version;
use hub_types::{CategoryDimension, PluginType};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const OS_LINUX: &str = "linux";
pub const OS_MAC: &str = "mac";
pub const OS_WINDOWS: &str = "windows";
pub const LICENSE_OPEN_SOURCE: &str = "openSource";
pub const STATUS_STABLE: &str = "stable";

/// One independent filter dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    PythonVersion,
    OperatingSystem,
    License,
    DevelopmentStatus,
    WorkflowStep,
    ImageModality,
    SupportedData,
    PluginType,
    ReaderFileExtensions,
    WriterFileExtensions,
    Authors,
}

impl FilterKey {
    pub const ALL: [FilterKey; 11] = [
        Self::PythonVersion,
        Self::OperatingSystem,
        Self::License,
        Self::DevelopmentStatus,
        Self::WorkflowStep,
        Self::ImageModality,
        Self::SupportedData,
        Self::PluginType,
        Self::ReaderFileExtensions,
        Self::WriterFileExtensions,
        Self::Authors,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PythonVersion => "pythonVersion",
            Self::OperatingSystem => "operatingSystem",
            Self::License => "license",
            Self::DevelopmentStatus => "developmentStatus",
            Self::WorkflowStep => "workflowStep",
            Self::ImageModality => "imageModality",
            Self::SupportedData => "supportedData",
            Self::PluginType => "pluginType",
            Self::ReaderFileExtensions => "readerFileExtensions",
            Self::WriterFileExtensions => "writerFileExtensions",
            Self::Authors => "authors",
        }
    }

    /// Closed option list, or `None` for dimensions whose options come from the index
    #[must_use]
    pub fn fixed_options(self) -> Option<&'static [&'static str]> {
        const OPERATING_SYSTEMS: &[&str] = &[OS_LINUX, OS_MAC, OS_WINDOWS];
        const LICENSES: &[&str] = &[LICENSE_OPEN_SOURCE];
        const STATUSES: &[&str] = &[STATUS_STABLE];
        const PLUGIN_TYPES: &[&str] = &["reader", "writer", "sample_data", "widget", "theme"];

        match self {
            Self::OperatingSystem => Some(OPERATING_SYSTEMS),
            Self::License => Some(LICENSES),
            Self::DevelopmentStatus => Some(STATUSES),
            Self::PluginType => Some(PLUGIN_TYPES),
            _ => None,
        }
    }

    #[must_use]
    pub fn category_dimension(self) -> Option<CategoryDimension> {
        match self {
            Self::WorkflowStep => Some(CategoryDimension::WorkflowStep),
            Self::ImageModality => Some(CategoryDimension::ImageModality),
            Self::SupportedData => Some(CategoryDimension::SupportedData),
            _ => None,
        }
    }

    /// Whether `option` is a legal option key for this dimension
    #[must_use]
    pub fn accepts(self, option: &str) -> bool {
        if option.trim().is_empty() {
            return false;
        }
        match self {
            Self::PythonVersion => option.parse::<Version>().is_ok(),
            Self::PluginType => option.parse::<PluginType>().is_ok(),
            _ => self
                .fixed_options()
                .is_none_or(|options| options.contains(&option)),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current filter selections.
///
/// Only enabled options are stored; anything absent reads as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterState {
    groups: BTreeMap<FilterKey, BTreeSet<String>>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_enabled(&self, key: FilterKey, option: &str) -> bool {
        self.groups
            .get(&key)
            .is_some_and(|options| options.contains(option))
    }

    /// Enable or disable an option. Returns whether the state changed.
    ///
    /// Options a dimension does not accept are ignored.
    pub fn set(&mut self, key: FilterKey, option: &str, enabled: bool) -> bool {
        if enabled {
            if !key.accepts(option) {
                return false;
            }
            self.groups
                .entry(key)
                .or_default()
                .insert(option.to_string())
        } else {
            let Some(options) = self.groups.get_mut(&key) else {
                return false;
            };
            let removed = options.remove(option);
            if options.is_empty() {
                self.groups.remove(&key);
            }
            removed
        }
    }

    /// Flip an option. Returns the new value.
    pub fn toggle(&mut self, key: FilterKey, option: &str) -> bool {
        let enabled = !self.is_enabled(key, option);
        self.set(key, option, enabled);
        self.is_enabled(key, option)
    }

    /// Enabled options of a dimension, in lexical order
    #[must_use]
    pub fn enabled(&self, key: FilterKey) -> Option<&BTreeSet<String>> {
        self.groups.get(&key)
    }

    /// Dimensions with at least one enabled option
    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &BTreeSet<String>)> {
        self.groups.iter().map(|(key, options)| (*key, options))
    }

    /// Returns whether anything was enabled
    pub fn clear_dimension(&mut self, key: FilterKey) -> bool {
        self.groups.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<(FilterKey, String)> for FilterState {
    fn from_iter<I: IntoIterator<Item = (FilterKey, String)>>(iter: I) -> Self {
        let mut state = Self::new();
        for (key, option) in iter {
            state.set(key, &option, true);
        }
        state
    }
}
