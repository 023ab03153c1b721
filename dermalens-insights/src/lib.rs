//! # Dermalens Insights Engine
//!
//! Personalization and progress logic for skin assessments:
//! - [`normalizer`]: raw model output → canonical assessment (with fallback)
//! - [`scorer`]: deterministic multi-factor product scoring and ranking
//! - [`explanation`]: single-flight, TTL-cached explanations with a template fallback
//! - [`progress`]: pairwise comparison and timeline trends
//! - [`collaborators`] / [`session`]: seams to the host application and one-scan glue

pub mod collaborators;
pub mod explanation;
pub mod normalizer;
pub mod progress;
pub mod scorer;
pub mod session;

pub use collaborators::{
    CatalogQuery, CatalogStore, CollaboratorError, CollaboratorResult, HistoricalStore,
    ModelRunner,
};
pub use explanation::{
    CachedExplanation, CacheStats, DisabledGenerator, ExplanationCoordinator, ExplanationKey,
    GenerationError, TextGenerator,
};
pub use normalizer::{fallback_assessment, normalize, RawModelOutput};
pub use progress::{
    compare, health_score, summarize, ComparisonResult, ConcernTrend, DateWindow, HealthTrend,
    StabilityBand, TimelineSummary,
};
pub use scorer::{FactorBreakdown, RankedRecommendations, Recommendation, RecommendationScorer};
pub use session::{Degradation, ExplainedRecommendation, InsightsSession, ScanRequest, SessionReport};
