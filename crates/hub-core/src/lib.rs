pub mod config;
pub mod filter;
pub mod highlight;
pub mod index;
pub mod pagination;
pub mod query;
pub mod search;
pub mod sort;

mod error;
mod pipeline;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use pipeline::{HubSearch, ResultPage, ResultPageView, ResultView};

pub use hub_types::*;
