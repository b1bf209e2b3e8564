//! Highlight span selection.
//!
//! The matcher reports matched character positions, which for fuzzy matches are
//! scattered. They are grouped into contiguous runs and a single run is kept per
//! field: the longest one of at least the minimum length, and among runs of equal
//! length the one whose text is most similar to the query.

use super::MatchSpan;
use std::collections::HashMap;

/// Group matched positions into contiguous `[start, end)` runs.
/// Positions may arrive unsorted and duplicated.
pub(crate) fn contiguous_runs(positions: &mut Vec<u32>) -> Vec<(usize, usize)> {
    positions.sort_unstable();
    positions.dedup();

    let mut runs = Vec::new();
    let mut iter = positions.iter().map(|&p| p as usize);
    let Some(first) = iter.next() else {
        return runs;
    };

    let (mut start, mut end) = (first, first + 1);
    for pos in iter {
        if pos == end {
            end += 1;
        } else {
            runs.push((start, end));
            start = pos;
            end = pos + 1;
        }
    }
    runs.push((start, end));
    runs
}

/// Pick the run to highlight.
///
/// `slice` returns the text covered by a run.
pub(crate) fn best_span(
    runs: &[(usize, usize)],
    query: &str,
    min_len: usize,
    slice: impl Fn(usize, usize) -> String,
) -> Option<MatchSpan> {
    let mut best: Option<(MatchSpan, f64)> = None;

    for &(start, end) in runs {
        let len = end - start;
        if len < min_len.max(1) {
            continue;
        }

        let text = slice(start, end);
        let similarity = dice_coefficient(&text, query);
        let better = match &best {
            None => true,
            Some((current, current_similarity)) => {
                len > current.len() || (len == current.len() && similarity > *current_similarity)
            }
        };

        if better {
            best = Some((
                MatchSpan {
                    start,
                    end,
                    matched_text: text,
                },
                similarity,
            ));
        }
    }

    best.map(|(span, _)| span)
}

/// Sørensen-Dice coefficient over character bigrams, ignoring whitespace and case.
/// Returns 1.0 for identical strings and 0.0 when either is shorter than two chars.
#[must_use]
// Bigram counts are tiny, f64 holds them exactly
#[allow(clippy::cast_precision_loss)]
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalized_chars(a);
    let b: Vec<char> = normalized_chars(b);

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1]))
            && *count > 0
        {
            *count -= 1;
            shared += 1;
        }
    }

    (2 * shared) as f64 / (a.len() + b.len() - 2) as f64
}

fn normalized_chars(s: &str) -> Vec<char> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)] // Exact float comparisons are intentional in tests
mod tests {
    use super::*;

    fn slicer(text: &str) -> impl Fn(usize, usize) -> String + '_ {
        move |start, end| text.chars().skip(start).take(end - start).collect()
    }

    #[test]
    fn test_runs_from_unsorted_positions() {
        let mut positions = vec![5, 1, 2, 2, 6, 7, 0, 10];
        let runs = contiguous_runs(&mut positions);
        assert_eq!(runs, vec![(0, 3), (5, 8), (10, 11)]);
    }

    #[test]
    fn test_runs_empty() {
        assert!(contiguous_runs(&mut Vec::new()).is_empty());
    }

    #[test]
    fn test_longest_run_wins() {
        let text = "a video viewer";
        let runs = vec![(0, 1), (2, 7), (8, 10)];
        let span = best_span(&runs, "video", 2, slicer(text)).unwrap();
        assert_eq!(span.matched_text, "video");
        assert_eq!((span.start, span.end), (2, 7));
    }

    #[test]
    fn test_runs_below_minimum_are_ignored() {
        let text = "v i d e o";
        let runs = vec![(0, 1), (2, 3), (4, 5)];
        assert!(best_span(&runs, "vid", 2, slicer(text)).is_none());
    }

    #[test]
    fn test_equal_length_prefers_similar_text() {
        // Both runs are three chars; "seg" shares more bigrams with the query
        let text = "ntsseg";
        let runs = vec![(0, 3), (3, 6)];
        let span = best_span(&runs, "segment", 2, slicer(text)).unwrap();
        assert_eq!(span.matched_text, "seg");
        assert_eq!(span.start, 3);
    }

    #[test]
    fn test_equal_length_and_similarity_keeps_first() {
        let text = "abab";
        let runs = vec![(0, 2), (2, 4)];
        let span = best_span(&runs, "ab", 2, slicer(text)).unwrap();
        assert_eq!(span.start, 0);
    }

    #[test]
    fn test_dice_identical() {
        assert_eq!(dice_coefficient("Video", "video"), 1.0);
        assert_eq!(dice_coefficient("a b", "ab"), 1.0);
    }

    #[test]
    fn test_dice_disjoint() {
        assert_eq!(dice_coefficient("abc", "xyz"), 0.0);
        assert_eq!(dice_coefficient("a", "ab"), 0.0);
    }

    #[test]
    fn test_dice_partial() {
        // night: ni ig gh ht, nacht: na ac ch ht -> one shared of eight
        let score = dice_coefficient("night", "nacht");
        assert!((score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_dice_counts_repeated_bigrams_once_each() {
        // aaaa: aa x3, aa: aa x1 -> one shared
        let score = dice_coefficient("aaaa", "aa");
        assert!((score - 0.5).abs() < 1e-9);
    }
}
