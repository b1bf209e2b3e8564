//! Search state and its query-string form.

mod codec;
mod state;
mod store;

pub use codec::{QueryCodec, UrlQueryCodec, filter_param};
pub use state::SearchQueryState;
pub use store::{History, QueryStore, SubscriptionId};
