//! Unknown-key warnings for config.json

use serde_json::Value;
use tracing::warn;

/// Objects whose children are checked against `LEAVES`
const SECTIONS: &[&str] = &["search", "search.weights", "filters"];

const LEAVES: &[&str] = &[
    "search.pageSize",
    "search.minMatchCharLength",
    "search.threshold",
    "search.defaultSort",
    "search.namePrefixes",
    "search.weights.name",
    "search.weights.displayName",
    "search.weights.summary",
    "search.weights.authors",
    "search.weights.descriptionText",
    "filters.licenseListPath",
];

/// Log a warning for every key serde would silently skip.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return;
    };

    for path in unknown_paths(&value) {
        warn!("Unknown config field in {config_name}: {path}");
    }
}

/// Dotted paths of unrecognised keys, in document order
fn unknown_paths(root: &Value) -> Vec<String> {
    let mut unknown = Vec::new();
    let mut pending = vec![(String::new(), root)];

    while let Some((prefix, value)) = pending.pop() {
        let Value::Object(object) = value else {
            continue;
        };
        for (key, child) in object {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if SECTIONS.contains(&path.as_str()) {
                pending.push((path, child));
            } else if !LEAVES.contains(&path.as_str()) {
                unknown.push(path);
            }
        }
    }

    unknown.sort();
    unknown
}
