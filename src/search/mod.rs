//! Search: local ranking over preloaded lists and remote full-text search.

mod ranking;
mod remote;

pub use ranking::{SearchIndex, SearchOutcome};
pub use remote::search_remote;
