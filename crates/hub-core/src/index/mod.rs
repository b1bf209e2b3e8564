mod store;

pub use store::IndexStore;

use crate::{Error, Result};
use hub_types::PluginRecord;
use tracing::debug;

/// Validate raw index entries one by one.
/// Returns the well-formed records and the number of entries dropped.
fn parse_records(value: serde_json::Value) -> Result<(Vec<PluginRecord>, usize)> {
    let serde_json::Value::Array(entries) = value else {
        return Err(Error::Index(
            "expected a JSON array of plugin records".to_string(),
        ));
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<PluginRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("Skipping index entry {position}: {e}");
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}
