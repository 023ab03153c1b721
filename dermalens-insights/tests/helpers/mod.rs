//! Shared fixtures and in-memory collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use dermalens_common::{
    Assessment, CatalogItem, ConcernKind, IngredientId, ProductCategory, SkinType,
};
use dermalens_insights::{
    CatalogQuery, CatalogStore, CollaboratorError, CollaboratorResult, DateWindow,
    GenerationError, HistoricalStore, ModelRunner, RawModelOutput, TextGenerator,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

pub fn at(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).unwrap() + ChronoDuration::days(day)
}

/// Assessment with every concern present; unspecified concerns are 0.0
pub fn assessment(day: i64, skin_type: u8, severities: &[(ConcernKind, f64)]) -> Assessment {
    let concern_severity: BTreeMap<ConcernKind, f64> = ConcernKind::ALL
        .iter()
        .map(|&c| {
            let severity = severities
                .iter()
                .find(|(k, _)| *k == c)
                .map(|&(_, s)| s)
                .unwrap_or(0.0);
            (c, severity)
        })
        .collect();
    Assessment {
        id: Uuid::new_v4(),
        captured_at: at(day),
        concern_severity,
        zone_severity: BTreeMap::new(),
        skin_type: SkinType::new(skin_type),
        skin_type_confidence: 0.8,
        is_fallback: false,
        health_score: None,
    }
}

pub fn item(
    id: &str,
    category: ProductCategory,
    ingredients: &[&str],
    concerns: &[ConcernKind],
    skin_types: &[u8],
) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        name: id.replace('-', " "),
        category,
        key_ingredients: ingredients.iter().map(|i| IngredientId::new(i)).collect(),
        target_concerns: concerns.iter().copied().collect(),
        suitable_skin_types: skin_types.iter().copied().collect(),
        is_specialized_for_deep_tones: false,
        in_stock: true,
    }
}

pub fn sample_catalog() -> Vec<CatalogItem> {
    let mut deep_serum = item(
        "tone-even-serum",
        ProductCategory::Serum,
        &["VITAMIN_C", "ALPHA_ARBUTIN", "NIACINAMIDE"],
        &[ConcernKind::Hyperpigmentation],
        &[4, 5, 6],
    );
    deep_serum.is_specialized_for_deep_tones = true;

    let mut sold_out = item(
        "sold-out-cleanser",
        ProductCategory::Cleanser,
        &["SALICYLIC_ACID", "TEA_TREE_OIL"],
        &[ConcernKind::Acne, ConcernKind::Oiliness],
        &[],
    );
    sold_out.in_stock = false;

    vec![
        item(
            "clarifying-cleanser",
            ProductCategory::Cleanser,
            &["SALICYLIC_ACID", "ZINC"],
            &[ConcernKind::Acne, ConcernKind::Oiliness],
            &[3, 4],
        ),
        item(
            "gentle-cleanser",
            ProductCategory::Cleanser,
            &["GLYCERIN"],
            &[ConcernKind::Dryness],
            &[],
        ),
        item(
            "spot-treatment",
            ProductCategory::Treatment,
            &["BENZOYL_PEROXIDE", "SALICYLIC_ACID"],
            &[ConcernKind::Acne],
            &[2, 3, 4, 5],
        ),
        item(
            "barrier-cream",
            ProductCategory::Moisturizer,
            &["CERAMIDES", "HYALURONIC_ACID", "SQUALANE"],
            &[ConcernKind::Dryness, ConcernKind::Redness],
            &[1, 2, 3],
        ),
        item(
            "calming-gel",
            ProductCategory::Moisturizer,
            &["CENTELLA_ASIATICA", "ALOE_VERA"],
            &[ConcernKind::Redness],
            &[],
        ),
        item(
            "mineral-spf",
            ProductCategory::Sunscreen,
            &["ZINC"],
            &[],
            &[],
        ),
        deep_serum,
        sold_out,
    ]
}

/// Model output with the given concern scores and a confident skin type
pub fn raw_output(concern_scores: [f64; 5], skin_type: u8) -> RawModelOutput {
    let mut probabilities = vec![0.02; 6];
    probabilities[usize::from(skin_type.clamp(1, 6)) - 1] = 0.9;
    RawModelOutput {
        concern_scores: concern_scores.to_vec(),
        skin_type_probabilities: probabilities,
        zone_scores: vec![concern_scores.to_vec(); 5],
    }
}

// ============================================================================
// Collaborators
// ============================================================================

pub struct FixedModel(pub Option<RawModelOutput>);

#[async_trait]
impl ModelRunner for FixedModel {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn run(&self) -> CollaboratorResult<Option<RawModelOutput>> {
        Ok(self.0.clone())
    }
}

pub struct FailingModel;

#[async_trait]
impl ModelRunner for FailingModel {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn run(&self) -> CollaboratorResult<Option<RawModelOutput>> {
        Err(CollaboratorError::Unavailable("model not loaded".to_string()))
    }
}

pub struct MemoryCatalog(pub Vec<CatalogItem>);

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn in_stock_items(&self, query: &CatalogQuery) -> CollaboratorResult<Vec<CatalogItem>> {
        Ok(self
            .0
            .iter()
            .filter(|item| query.category.map_or(true, |c| item.category == c))
            .cloned()
            .collect())
    }
}

pub struct FailingCatalog;

#[async_trait]
impl CatalogStore for FailingCatalog {
    async fn in_stock_items(&self, _query: &CatalogQuery) -> CollaboratorResult<Vec<CatalogItem>> {
        Err(CollaboratorError::Store("catalog offline".to_string()))
    }
}

pub struct MemoryHistory(pub Vec<Assessment>);

#[async_trait]
impl HistoricalStore for MemoryHistory {
    async fn assessments(
        &self,
        _user_id: &str,
        window: DateWindow,
    ) -> CollaboratorResult<Vec<Assessment>> {
        let mut stored: Vec<Assessment> = self
            .0
            .iter()
            .filter(|a| window.contains(a.captured_at))
            .cloned()
            .collect();
        stored.sort_by_key(|a| a.captured_at);
        Ok(stored)
    }
}

pub struct FailingHistory;

#[async_trait]
impl HistoricalStore for FailingHistory {
    async fn assessments(
        &self,
        _user_id: &str,
        _window: DateWindow,
    ) -> CollaboratorResult<Vec<Assessment>> {
        Err(CollaboratorError::Store("history locked".to_string()))
    }
}

/// Generator that counts calls and answers after `delay`
pub struct CountingGenerator {
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl CountingGenerator {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn generate(&self, prompt: String) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(format!("Generated from {} prompt characters.", prompt.len()))
    }
}

pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _prompt: String) -> Result<String, GenerationError> {
        Err(GenerationError::Failed("quota exceeded".to_string()))
    }
}
