pub mod components;
pub mod engine;
pub mod scoring;
pub mod weights;

pub use components::score_components;
pub use engine::{MatchResult, MatchingEngine};
pub use scoring::{composite_score, ComponentScores};
pub use weights::{NormalizedWeights, Preference};
