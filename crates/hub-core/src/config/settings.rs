use crate::{Error, Result};
use hub_types::SortType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub filters: FilterConfig,
}

impl Config {
    /// Load config from file.
    ///
    /// A missing file yields the defaults. Unknown keys are logged, not rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid JSON,
    /// or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.page_size == 0 {
            return Err(Error::Config("search.pageSize must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&search.threshold) {
            return Err(Error::Config(format!(
                "search.threshold must be within 0..=1, got {}",
                search.threshold
            )));
        }
        if search.weights.iter().any(|(_, w)| !w.is_finite() || w < 0.0) {
            return Err(Error::Config(
                "search.weights must be finite and non-negative".into(),
            ));
        }
        if search.default_sort == SortType::Relevance {
            return Err(Error::Config(
                "search.defaultSort cannot be relevance; it applies when there is no query".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Shortest highlight span worth showing
    #[serde(default = "default_min_match_len")]
    pub min_match_char_length: usize,

    /// Minimum normalized fuzzy score (0.0 - 1.0) for a field to count as matched
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub weights: FieldWeights,

    /// Sort used when there is no query and no explicit sort
    #[serde(default)]
    pub default_sort: SortType,

    /// Prefixes ignored when sorting by plugin name
    #[serde(default = "default_name_prefixes")]
    pub name_prefixes: Vec<String>,
}

fn default_page_size() -> usize {
    15
}

fn default_min_match_len() -> usize {
    2
}

fn default_threshold() -> f64 {
    0.6
}

fn default_name_prefixes() -> Vec<String> {
    vec!["napari-".into(), "napari_".into(), "napari ".into()]
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            min_match_char_length: default_min_match_len(),
            threshold: default_threshold(),
            weights: FieldWeights::default(),
            default_sort: SortType::default(),
            name_prefixes: default_name_prefixes(),
        }
    }
}

/// Relative weight of each searchable field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldWeights {
    #[serde(default = "weight_name")]
    pub name: f64,
    #[serde(default = "weight_name")]
    pub display_name: f64,
    #[serde(default = "weight_summary")]
    pub summary: f64,
    #[serde(default = "weight_authors")]
    pub authors: f64,
    #[serde(default = "weight_description")]
    pub description_text: f64,
}

fn weight_name() -> f64 {
    8.0
}

fn weight_summary() -> f64 {
    4.0
}

fn weight_authors() -> f64 {
    2.0
}

fn weight_description() -> f64 {
    1.0
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: weight_name(),
            display_name: weight_name(),
            summary: weight_summary(),
            authors: weight_authors(),
            description_text: weight_description(),
        }
    }
}

impl FieldWeights {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("name", self.name),
            ("displayName", self.display_name),
            ("summary", self.summary),
            ("authors", self.authors),
            ("descriptionText", self.description_text),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// SPDX `licenses.json`; the built-in OSI list is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_list_path: Option<PathBuf>,
}
