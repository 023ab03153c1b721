//! Recommendation Scorer
//!
//! Deterministic multi-factor scoring of catalog items against an assessment.
//!
//! # Scoring Algorithm
//! - **Ingredient score** (max 50): effectiveness-weighted coverage of the
//!   benefit set for the assessment's non-zero concerns. The denominator is
//!   the summed weight of the strongest [`BENEFIT_SET_CAP`] ingredients, so
//!   one strong match is not diluted by a broad set and covering a whole
//!   single-concern set earns the full 50.
//! - **Skin-type compatibility** (max 20): 20 when the item is unrestricted or
//!   lists the assessment's type, 10 when the nearest listed type is one step
//!   away, otherwise 0.
//! - **Concern targeting** (max 20): share of non-zero concerns the item
//!   explicitly targets.
//! - **Specialization bonus** (max 10): 10 for deep-tone specialised items on
//!   types 4-6, 5 on types 1-3, 0 when not specialised.
//!
//! The total is floored and clamped to 0-100. Items that match nothing score
//! low; a score of 0 is valid output, not an error.

pub mod ingredients;

use dermalens_common::{Assessment, CatalogItem, ConcernKind, IngredientId, ProductCategory};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Maximum ingredient factor
pub const INGREDIENT_WEIGHT: f64 = 50.0;
/// Maximum skin-type factor
pub const SKIN_TYPE_WEIGHT: f64 = 20.0;
/// Maximum concern-targeting factor
pub const CONCERN_WEIGHT: f64 = 20.0;
/// Maximum specialization bonus
pub const SPECIALIZATION_BONUS: f64 = 10.0;
/// Denominator cap for benefit-set coverage
pub const BENEFIT_SET_CAP: usize = 5;

/// Per-factor contribution to the total score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub ingredient: f64,
    pub skin_type: f64,
    pub concern: f64,
    pub bonus: f64,
}

impl FactorBreakdown {
    pub fn sum(&self) -> f64 {
        self.ingredient + self.skin_type + self.concern + self.bonus
    }

    /// Floor of the sum clamped to 0-100
    pub fn total(&self) -> u8 {
        let sum = self.sum();
        if !sum.is_finite() {
            return 0;
        }
        sum.floor().clamp(0.0, 100.0) as u8
    }
}

/// A scored catalog item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item: CatalogItem,
    /// 0-100
    pub score: u8,
    pub factor_breakdown: FactorBreakdown,
    pub matching_ingredients: BTreeSet<IngredientId>,
    pub matching_concerns: BTreeSet<ConcernKind>,
}

/// Output of [`RecommendationScorer::rank`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedRecommendations {
    /// Best items per category, truncated to the requested count
    pub by_category: BTreeMap<ProductCategory, Vec<Recommendation>>,
    /// Every in-stock item, best first
    pub all: Vec<Recommendation>,
}

impl RankedRecommendations {
    /// First `n` entries of the flat list
    pub fn top(&self, n: usize) -> &[Recommendation] {
        &self.all[..n.min(self.all.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Stateless product scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationScorer;

impl RecommendationScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a single item
    pub fn score(&self, assessment: &Assessment, item: &CatalogItem) -> Recommendation {
        let active = assessment.active_concerns();

        let (ingredient, matching_ingredients) = self.score_ingredients(&active, item);
        let skin_type = self.score_skin_type(assessment, item);
        let (concern, matching_concerns) = self.score_concerns(&active, item);
        let bonus = self.score_specialization(assessment, item);

        let factor_breakdown = FactorBreakdown {
            ingredient,
            skin_type,
            concern,
            bonus,
        };

        Recommendation {
            item: item.clone(),
            score: factor_breakdown.total(),
            factor_breakdown,
            matching_ingredients,
            matching_concerns,
        }
    }

    /// Score every in-stock item, group by category, keep the best per group
    ///
    /// Sorting is stable: equal scores keep catalog order.
    pub fn rank(
        &self,
        assessment: &Assessment,
        catalog: &[CatalogItem],
        top_per_category: usize,
    ) -> RankedRecommendations {
        let mut all: Vec<Recommendation> = catalog
            .iter()
            .filter(|item| item.in_stock)
            .map(|item| self.score(assessment, item))
            .collect();
        all.sort_by(|a, b| b.score.cmp(&a.score));

        let mut by_category: BTreeMap<ProductCategory, Vec<Recommendation>> = BTreeMap::new();
        for recommendation in &all {
            let group = by_category.entry(recommendation.item.category).or_default();
            if group.len() < top_per_category {
                group.push(recommendation.clone());
            }
        }

        debug!(
            assessment_id = %assessment.id,
            catalog = catalog.len(),
            in_stock = all.len(),
            categories = by_category.len(),
            best = all.first().map(|r| r.score),
            "Catalog ranked"
        );

        RankedRecommendations { by_category, all }
    }

    /// Ingredient factor
    ///
    /// Returns: (score, matching ingredients)
    fn score_ingredients(
        &self,
        active: &[ConcernKind],
        item: &CatalogItem,
    ) -> (f64, BTreeSet<IngredientId>) {
        let benefits = ingredients::benefit_set(active);
        if benefits.is_empty() {
            return (0.0, BTreeSet::new());
        }

        let mut matched = BTreeSet::new();
        let mut matched_weights = Vec::new();
        for (ingredient, &weight) in &benefits {
            if item.key_ingredients.contains(ingredient) {
                matched_weights.push(weight);
                matched.insert(ingredient.clone());
            }
        }
        if matched_weights.is_empty() {
            return (0.0, matched);
        }

        // Both sums run strongest-first so full coverage divides to exactly 1.0
        let mut weights: Vec<f64> = benefits.values().copied().collect();
        weights.sort_by(|a, b| b.total_cmp(a));
        matched_weights.sort_by(|a, b| b.total_cmp(a));
        let denominator: f64 = weights.iter().take(BENEFIT_SET_CAP).sum();
        let covered: f64 = matched_weights.iter().sum();

        let coverage = (covered / denominator).min(1.0);
        (INGREDIENT_WEIGHT * coverage, matched)
    }

    /// Skin-type factor
    fn score_skin_type(&self, assessment: &Assessment, item: &CatalogItem) -> f64 {
        let declared = &item.suitable_skin_types;
        if declared.is_empty() || declared.contains(&assessment.skin_type.value()) {
            return SKIN_TYPE_WEIGHT;
        }
        let nearest = declared
            .iter()
            .map(|&t| assessment.skin_type.distance(t))
            .min();
        match nearest {
            Some(1) => SKIN_TYPE_WEIGHT / 2.0,
            _ => 0.0,
        }
    }

    /// Concern-targeting factor
    ///
    /// Returns: (score, targeted active concerns)
    fn score_concerns(
        &self,
        active: &[ConcernKind],
        item: &CatalogItem,
    ) -> (f64, BTreeSet<ConcernKind>) {
        if active.is_empty() {
            return (0.0, BTreeSet::new());
        }
        let matched: BTreeSet<ConcernKind> = active
            .iter()
            .copied()
            .filter(|c| item.target_concerns.contains(c))
            .collect();
        let score = CONCERN_WEIGHT * matched.len() as f64 / active.len() as f64;
        (score, matched)
    }

    /// Specialization bonus
    fn score_specialization(&self, assessment: &Assessment, item: &CatalogItem) -> f64 {
        match (item.is_specialized_for_deep_tones, assessment.skin_type.is_deep()) {
            (true, true) => SPECIALIZATION_BONUS,
            (true, false) => SPECIALIZATION_BONUS / 2.0,
            (false, _) => 0.0,
        }
    }
}
