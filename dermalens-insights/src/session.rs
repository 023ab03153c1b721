//! One scan session, end to end
//!
//! Model output → assessment → ranked catalog → explanations → optional
//! comparison with the previous assessment. Every collaborator failure
//! degrades to a documented fallback and is recorded in
//! [`SessionReport::degradations`]; [`InsightsSession::run`] itself never
//! fails. Nothing is persisted here; the caller decides what to store.

use crate::collaborators::{CatalogQuery, CatalogStore, HistoricalStore, ModelRunner};
use crate::explanation::{ExplanationCoordinator, TextGenerator};
use crate::normalizer::normalize;
use crate::progress::{compare, health_score, ComparisonResult, DateWindow};
use crate::scorer::{RankedRecommendations, Recommendation, RecommendationScorer};
use dermalens_common::config::InsightsConfig;
use dermalens_common::{Assessment, Clock, SystemClock};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Input for a single scan
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Compare against this user's latest stored assessment when set
    pub user_id: Option<String>,
    pub query: CatalogQuery,
}

impl ScanRequest {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            query: CatalogQuery::all(),
        }
    }
}

/// A collaborator that did not deliver during the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Degradation {
    /// Model not ready or failed; the assessment is the fallback
    ModelUnavailable,
    /// Catalog lookup failed; no recommendations
    CatalogUnavailable,
    /// History lookup failed; no comparison
    HistoryUnavailable,
}

/// Recommendation paired with its explanation text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainedRecommendation {
    pub recommendation: Recommendation,
    pub explanation: String,
}

/// Everything a scan session produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    /// Carries its computed health score
    pub assessment: Assessment,
    pub recommendations: RankedRecommendations,
    /// Best-first, at most the session's explain limit
    pub explanations: Vec<ExplainedRecommendation>,
    pub comparison: Option<ComparisonResult>,
    pub degradations: Vec<Degradation>,
}

impl SessionReport {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Wires collaborators to the engine for repeated scans
pub struct InsightsSession {
    model: Arc<dyn ModelRunner>,
    catalog: Arc<dyn CatalogStore>,
    history: Option<Arc<dyn HistoricalStore>>,
    generator: Arc<dyn TextGenerator>,
    coordinator: Arc<ExplanationCoordinator>,
    scorer: RecommendationScorer,
    clock: Arc<dyn Clock>,
    top_per_category: usize,
    explain_limit: usize,
    explanation_timeout: Duration,
}

impl InsightsSession {
    /// Session on the system clock
    pub fn new(
        config: &InsightsConfig,
        model: Arc<dyn ModelRunner>,
        catalog: Arc<dyn CatalogStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self::with_clock(config, Arc::new(SystemClock), model, catalog, generator)
    }

    pub fn with_clock(
        config: &InsightsConfig,
        clock: Arc<dyn Clock>,
        model: Arc<dyn ModelRunner>,
        catalog: Arc<dyn CatalogStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let coordinator = Arc::new(ExplanationCoordinator::from_config(
            &config.explanations,
            Arc::clone(&clock),
        ));
        Self {
            model,
            catalog,
            history: None,
            generator,
            coordinator,
            scorer: RecommendationScorer::new(),
            clock,
            top_per_category: config.recommendations.top_per_category,
            explain_limit: config.recommendations.top_per_category,
            explanation_timeout: config.explanations.generation_timeout(),
        }
    }

    /// Enable comparison with stored assessments
    pub fn with_history(mut self, history: Arc<dyn HistoricalStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Share an existing explanation cache
    pub fn with_coordinator(mut self, coordinator: Arc<ExplanationCoordinator>) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Number of best-ranked items that get an explanation
    pub fn with_explain_limit(mut self, limit: usize) -> Self {
        self.explain_limit = limit;
        self
    }

    pub fn coordinator(&self) -> &Arc<ExplanationCoordinator> {
        &self.coordinator
    }

    /// Run one scan
    pub async fn run(&self, request: &ScanRequest) -> SessionReport {
        let mut degradations = Vec::new();

        let assessment = self.assess(&mut degradations).await;
        let catalog = match self.catalog.in_stock_items(&request.query).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Catalog lookup failed, continuing without recommendations");
                degradations.push(Degradation::CatalogUnavailable);
                Vec::new()
            }
        };

        let recommendations = self
            .scorer
            .rank(&assessment, &catalog, self.top_per_category);
        let explanations = self
            .explain(&assessment, recommendations.top(self.explain_limit))
            .await;

        let comparison = match request.user_id.as_deref() {
            Some(user_id) => self.compare_with_latest(user_id, &assessment, &mut degradations).await,
            None => None,
        };

        info!(
            assessment_id = %assessment.id,
            fallback = assessment.is_fallback,
            recommendations = recommendations.all.len(),
            explained = explanations.len(),
            compared = comparison.is_some(),
            degraded = degradations.len(),
            "Scan session complete"
        );

        SessionReport {
            assessment,
            recommendations,
            explanations,
            comparison,
            degradations,
        }
    }

    async fn assess(&self, degradations: &mut Vec<Degradation>) -> Assessment {
        let raw = match self.model.run().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(runner = self.model.name(), error = %e, "Model runner failed");
                None
            }
        };
        if raw.is_none() {
            degradations.push(Degradation::ModelUnavailable);
        }

        let mut assessment = normalize(raw.as_ref(), Uuid::new_v4(), self.clock.now());
        assessment.health_score = Some(health_score(&assessment));
        assessment
    }

    async fn explain(
        &self,
        assessment: &Assessment,
        recommendations: &[Recommendation],
    ) -> Vec<ExplainedRecommendation> {
        let pending = recommendations.iter().map(|recommendation| async move {
            let explanation = self
                .coordinator
                .explain_within(
                    self.explanation_timeout,
                    Arc::clone(&self.generator),
                    assessment,
                    recommendation,
                )
                .await;
            ExplainedRecommendation {
                recommendation: recommendation.clone(),
                explanation,
            }
        });
        join_all(pending).await
    }

    async fn compare_with_latest(
        &self,
        user_id: &str,
        current: &Assessment,
        degradations: &mut Vec<Degradation>,
    ) -> Option<ComparisonResult> {
        let history = self.history.as_ref()?;
        if current.is_fallback {
            debug!(assessment_id = %current.id, "Skipping comparison for fallback assessment");
            return None;
        }

        let window = DateWindow {
            start: None,
            end: Some(current.captured_at),
        };
        let stored = match history.assessments(user_id, window).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "History lookup failed, skipping comparison");
                degradations.push(Degradation::HistoryUnavailable);
                return None;
            }
        };

        let baseline = stored
            .iter()
            .filter(|a| a.id != current.id && !a.is_fallback)
            .max_by_key(|a| a.captured_at)?;
        Some(compare(baseline, current))
    }
}
