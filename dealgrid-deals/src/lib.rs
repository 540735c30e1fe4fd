pub mod engine;
pub mod evaluator;
pub mod models;
pub mod outlier;
pub mod ranker;
pub mod scoring;
pub mod stats;

pub use engine::{DealEngine, DealsError};
pub use models::{DealRecord, QueryGroup, ScoredCandidate};
