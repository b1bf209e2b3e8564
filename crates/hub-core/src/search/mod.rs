mod engine;
mod result;
mod spans;
mod typo;

pub use engine::SearchEngine;
pub use result::{MatchKey, MatchMap, MatchSpan, SearchField, SearchResult, unfiltered};
pub use spans::dice_coefficient;

pub(crate) use result::{SearchHit, resolve};
