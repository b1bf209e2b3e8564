//! Shared types for the napari hub search core.
//!
//! These mirror the plugin index served by the hub API. Deserialization is also
//! the boundary sanitizer: absent or `null` fields turn into empty values, so the
//! search pipeline can assume every field is present and correctly typed.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Deserialize any defaultable value that may be null
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let opt: Option<T> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Empty or whitespace-only strings become `None`
fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Plugin types outside the known set are dropped instead of failing the record
fn deserialize_plugin_types<'de, D>(deserializer: D) -> Result<Vec<PluginType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(serde_json::Value::as_str)
        .filter_map(|s| s.parse().ok())
        .collect())
}

/// Install counts arrive as integers, floats, numeric strings or null
fn deserialize_installs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(float_to_count))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

// Counts are non-negative and far below 2^53, truncation of the fraction is intended
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_count(f: f64) -> u64 {
    f as u64
}

/// Error returned when a token does not name a known enum value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseTokenError {
    kind: &'static str,
    value: String,
}

impl ParseTokenError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}


/// One author entry of a plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }
}

/// napari contribution kinds a plugin can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    Reader,
    Writer,
    SampleData,
    Widget,
    Theme,
}

impl PluginType {
    pub const ALL: [PluginType; 5] = [
        Self::Reader,
        Self::Writer,
        Self::SampleData,
        Self::Widget,
        Self::Theme,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::SampleData => "sample_data",
            Self::Widget => "widget",
            Self::Theme => "theme",
        }
    }
}

impl FromStr for PluginType {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseTokenError::new("plugin type", s))
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category dimensions the hub classifies plugins along
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryDimension {
    WorkflowStep,
    ImageModality,
    SupportedData,
}

impl CategoryDimension {
    pub const ALL: [CategoryDimension; 3] = [
        Self::WorkflowStep,
        Self::ImageModality,
        Self::SupportedData,
    ];

    /// Key used in the `category` map of a record
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::WorkflowStep => "Workflow step",
            Self::ImageModality => "Image modality",
            Self::SupportedData => "Supported data",
        }
    }
}

impl fmt::Display for CategoryDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Orderings offered for the result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortType {
    /// Keep the text search order
    #[serde(rename = "relevance")]
    Relevance,
    /// Most recent `release_date` first
    #[default]
    #[serde(rename = "recentlyUpdated")]
    ReleaseDate,
    /// Most recent `first_released` first
    #[serde(rename = "firstReleased")]
    FirstReleased,
    /// A-Z on the display label
    #[serde(rename = "pluginName")]
    PluginName,
    /// Most installed first
    #[serde(rename = "totalInstalls")]
    TotalInstalls,
}

impl SortType {
    pub const ALL: [SortType; 5] = [
        Self::Relevance,
        Self::ReleaseDate,
        Self::FirstReleased,
        Self::PluginName,
        Self::TotalInstalls,
    ];

    /// Token used for this sort in URLs and config files
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::ReleaseDate => "recentlyUpdated",
            Self::FirstReleased => "firstReleased",
            Self::PluginName => "pluginName",
            Self::TotalInstalls => "totalInstalls",
        }
    }
}

impl FromStr for SortType {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.token() == s)
            .ok_or_else(|| ParseTokenError::new("sort type", s))
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One plugin entry of the hub index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Package name, unique within an index
    pub name: String,

    #[serde(
        default,
        deserialize_with = "deserialize_blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub summary: String,

    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub description_text: String,

    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub authors: Vec<Author>,

    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub version: String,

    /// ISO date of the latest release
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub release_date: String,

    /// ISO date of the first release
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub first_released: String,

    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub license: String,

    /// Version specifier, e.g. `>=3.9`
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub python_version: String,

    #[serde(default, deserialize_with = "deserialize_installs")]
    pub total_installs: u64,

    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub operating_system: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub development_status: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_plugin_types")]
    pub plugin_types: Vec<PluginType>,

    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub reader_file_extensions: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_null_as_empty_vec")]
    pub writer_file_extensions: Vec<String>,

    /// Category dimension label -> terms
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub category: BTreeMap<String, Vec<String>>,

    /// Category dimension label -> term paths, root first
    #[serde(
        default,
        deserialize_with = "deserialize_null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub category_hierarchy: BTreeMap<String, Vec<Vec<String>>>,
}

impl PluginRecord {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Human label, falling back to the package name
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn has_type(&self, plugin_type: PluginType) -> bool {
        self.plugin_types.contains(&plugin_type)
    }

    /// Flat terms for a category dimension
    #[must_use]
    pub fn category_terms(&self, dimension: CategoryDimension) -> &[String] {
        self.category
            .get(dimension.label())
            .map_or(&[], Vec::as_slice)
    }

    /// Hierarchy paths for a category dimension
    #[must_use]
    pub fn category_paths(&self, dimension: CategoryDimension) -> &[Vec<String>] {
        self.category_hierarchy
            .get(dimension.label())
            .map_or(&[], Vec::as_slice)
    }

    pub fn author_names(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(|a| a.name.as_str())
    }
}
