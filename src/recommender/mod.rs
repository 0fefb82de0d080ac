//! Recommendation engine.
//!
//! A request flows through intent extraction, strategy planning, concurrent
//! catalog searches, relevance scoring, artist diversity filtering and final
//! assembly. Only the Genre/Mood [`Taxonomy`] is shared between requests, and
//! it is read-only.

pub mod assembler;
pub mod diversity;
mod engine;
pub mod intent;
mod models;
pub mod orchestrator;
pub mod planner;
pub mod scorer;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{EngineSettings, ProfileAnalysis, ProfileRecommendations, RecommendationEngine};
pub use models::*;
pub use orchestrator::{FailureReason, StrategyFailure};
pub use taxonomy::Taxonomy;
