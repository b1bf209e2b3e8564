use super::parse_records;
use crate::Result;
use hub_types::PluginRecord;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{debug, info, warn};

/// Immutable snapshot of the plugin index for one session
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    records: Vec<PluginRecord>,
    positions: HashMap<String, usize>,
}

impl IndexStore {
    /// Create a new empty index store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot, keeping the first record for each name.
    #[must_use]
    pub fn from_records(records: Vec<PluginRecord>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut positions = HashMap::with_capacity(records.len());

        for record in records {
            match positions.entry(record.name.clone()) {
                Entry::Occupied(_) => {
                    warn!("Dropping duplicate plugin record '{}'", record.name);
                }
                Entry::Vacant(slot) => {
                    slot.insert(kept.len());
                    kept.push(record);
                }
            }
        }

        Self {
            records: kept,
            positions,
        }
    }

    /// Parse an index payload (a JSON array of plugin records).
    ///
    /// Entries that fail validation are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not JSON or not an array.
    pub fn from_json(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let (records, skipped) = parse_records(value)?;
        if skipped > 0 {
            warn!("Skipped {skipped} malformed plugin records");
        }
        Ok(Self::from_records(records))
    }

    /// Load the index from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading plugin index from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        info!(
            "Loaded {} plugin records from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Records in index order
    #[must_use]
    pub fn records(&self) -> &[PluginRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PluginRecord> {
        self.position(name).map(|i| &self.records[i])
    }

    /// Position of a record in index order
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
