//! Sort Engine. Every ordering is a stable sort over a fresh copy.

use crate::search::SearchResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use hub_types::{PluginRecord, SortType};
use std::cmp::Reverse;
use tracing::debug;

/// Parse an ISO date as seconds since the epoch; date-only values read as midnight UTC
pub(crate) fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Lowercased label with the first matching prefix removed
pub(crate) fn name_key(record: &PluginRecord, prefixes: &[String]) -> String {
    let label = record.label().to_lowercase();
    prefixes
        .iter()
        .map(|prefix| prefix.to_lowercase())
        .find_map(|prefix| label.strip_prefix(prefix.as_str()).map(str::to_string))
        .unwrap_or(label)
}

/// Newest first; records without a readable date go last
fn by_date(results: &mut [SearchResult<'_>], date: impl Fn(&PluginRecord) -> &str) {
    let mut unreadable = 0usize;
    results.sort_by_cached_key(|result| match parse_timestamp(date(result.record)) {
        Some(ts) => (false, Reverse(ts)),
        None => {
            unreadable += 1;
            (true, Reverse(0))
        }
    });
    if unreadable > 0 {
        debug!("{unreadable} results have no readable date");
    }
}

/// Return `results` ordered by `sort_type`. The input is left untouched.
#[must_use]
pub fn sort<'a>(
    results: &[SearchResult<'a>],
    sort_type: SortType,
    name_prefixes: &[String],
) -> Vec<SearchResult<'a>> {
    let mut sorted = results.to_vec();
    match sort_type {
        SortType::Relevance => {}
        SortType::ReleaseDate => by_date(&mut sorted, |r| r.release_date.as_str()),
        SortType::FirstReleased => by_date(&mut sorted, |r| r.first_released.as_str()),
        SortType::PluginName => {
            sorted.sort_by_cached_key(|result| name_key(result.record, name_prefixes));
        }
        SortType::TotalInstalls => {
            sorted.sort_by_key(|result| Reverse(result.record.total_installs));
        }
    }
    sorted
}
