//! Edit-distance matching of query terms against field words.
//!
//! nucleo only admits subsequences, so a swapped or mistyped letter drops a
//! record entirely. Each query term is compiled into a Levenshtein automaton
//! (transpositions cost one) and run against the words of a field.

use super::MatchSpan;
use levenshtein_automata::{DFA, Distance, LevenshteinAutomatonBuilder};

/// Upper bound on edits per term, whatever the threshold allows
const MAX_EDITS: u8 = 2;

/// Automaton builders, one per edit budget. Building them is the costly part,
/// so the engine keeps them for its lifetime.
pub(crate) struct TypoMatcher {
    builders: [LevenshteinAutomatonBuilder; MAX_EDITS as usize],
}

impl TypoMatcher {
    pub(crate) fn new() -> Self {
        Self {
            builders: [
                LevenshteinAutomatonBuilder::new(1, true),
                LevenshteinAutomatonBuilder::new(2, true),
            ],
        }
    }

    /// Compile a query for one search.
    ///
    /// A term may carry `floor(len * (1 - threshold))` edits, capped at two.
    pub(crate) fn compile(&self, query: &str, threshold: f64) -> TypoQuery {
        let terms = words(query)
            .map(|(_, _, word)| {
                let term = word.to_lowercase();
                let len = term.chars().count();
                let budget = edit_budget(len, threshold);
                let builder = &self.builders[usize::from(budget.max(1) - 1)];
                Term {
                    dfa: builder.build_dfa(&term),
                    len,
                    budget,
                }
            })
            .collect();
        TypoQuery { terms }
    }
}

fn edit_budget(len: usize, threshold: f64) -> u8 {
    let allowed = as_f64(len) * (1.0 - threshold) + 1e-9;
    (0..=MAX_EDITS)
        .rev()
        .find(|edits| f64::from(*edits) <= allowed)
        .unwrap_or(0)
}

fn as_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

struct Term {
    dfa: DFA,
    len: usize,
    budget: u8,
}

/// A query split into terms, each with its own automaton
pub(crate) struct TypoQuery {
    terms: Vec<Term>,
}

impl TypoQuery {
    /// Score of `text` in `0..=1` and the span of the word matched by the
    /// longest term, or `None` when some term has no word within its budget.
    pub(crate) fn score(&self, text: &str, min_len: usize) -> Option<(f64, Option<MatchSpan>)> {
        if self.terms.is_empty() {
            return None;
        }

        let words: Vec<(usize, usize, String)> = words(text)
            .map(|(start, end, word)| (start, end, word.to_lowercase()))
            .collect();

        let mut edits = 0usize;
        let mut total_len = 0usize;
        let mut anchor: Option<(usize, usize, usize)> = None;

        for term in &self.terms {
            let (distance, start, end) = words
                .iter()
                .filter_map(|(start, end, word)| match term.dfa.eval(word) {
                    Distance::Exact(d) if d <= term.budget => Some((d, *start, *end)),
                    _ => None,
                })
                .min_by_key(|(d, _, _)| *d)?;

            edits += usize::from(distance);
            total_len += term.len;
            if anchor.is_none_or(|(len, _, _)| term.len > len) {
                anchor = Some((term.len, start, end));
            }
        }

        let ratio = 1.0 - as_f64(edits) / as_f64(total_len.max(1));
        let span = anchor
            .filter(|(_, start, end)| end - start >= min_len)
            .map(|(_, start, end)| MatchSpan {
                start,
                end,
                matched_text: text.chars().skip(start).take(end - start).collect(),
            });
        Some((ratio, span))
    }
}

/// Alphanumeric runs of `text` with their char offsets (`end` exclusive)
fn words(text: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    let mut chars = 0usize;

    for (byte, c) in text.char_indices() {
        if c.is_alphanumeric() {
            current.get_or_insert((chars, byte));
        } else if let Some((start, from)) = current.take() {
            out.push((start, chars, &text[from..byte]));
        }
        chars += 1;
    }
    if let Some((start, from)) = current {
        out.push((start, chars, &text[from..]));
    }
    out.into_iter()
}
