pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod recommend;
pub mod similarity;

#[cfg(feature = "network")]
pub mod cache;
#[cfg(feature = "network")]
pub mod sync;

pub use catalog::Catalog;
pub use config::ScoringConfig;
pub use error::AdvisorError;
pub use filter::RequirementSpec;
pub use model::{Benchmarks, ModelRecord, Speed};
pub use rank::{Criterion, ScoredCandidate};
pub use recommend::{
    find_better_performance, find_cheaper_alternatives, find_similar, match_scenario,
    Comparison, Recommender,
};
