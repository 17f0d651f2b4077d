//! Matching logic module
//!
//! Four allocation policies over one shared sweep of the opposite ladder.

pub mod crossing;
pub mod executor;
pub mod policy;
pub mod price_time;
pub mod pro_rata;

pub use crossing::can_match;
pub use executor::MatchExecutor;
pub use policy::MatchingPolicy;
