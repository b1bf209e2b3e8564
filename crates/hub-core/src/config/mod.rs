mod dirs;
mod settings;
mod validation;

pub use dirs::Directories;
pub use settings::{Config, FieldWeights, FilterConfig, SearchConfig};
pub use validation::warn_unknown_fields;
