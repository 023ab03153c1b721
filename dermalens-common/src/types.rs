//! Domain vocabulary shared by every Dermalens component
//!
//! The concern and zone sets are closed: the on-device model emits scores in
//! exactly this order, and every [`Assessment`] produced by the normalizer
//! carries an entry for each of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use crate::parse;

/// Severity above which a concern is reported as primary
pub const PRIMARY_CONCERN_THRESHOLD: f64 = 0.4;

/// Lowest and highest skin type on the 1-6 ordinal scale
pub const SKIN_TYPE_MIN: u8 = 1;
pub const SKIN_TYPE_MAX: u8 = 6;

/// First skin type considered part of the deeper half of the scale
pub const DEEP_TONE_MIN: u8 = 4;

/// Canonical form for free-text enum names: upper snake case
fn canonical_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

// ============================================================================
// Concerns and zones
// ============================================================================

/// Skin condition category scored by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcernKind {
    Acne,
    Dryness,
    Oiliness,
    Hyperpigmentation,
    Redness,
}

impl ConcernKind {
    /// All concerns in model output order
    pub const ALL: [ConcernKind; 5] = [
        ConcernKind::Acne,
        ConcernKind::Dryness,
        ConcernKind::Oiliness,
        ConcernKind::Hyperpigmentation,
        ConcernKind::Redness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConcernKind::Acne => "ACNE",
            ConcernKind::Dryness => "DRYNESS",
            ConcernKind::Oiliness => "OILINESS",
            ConcernKind::Hyperpigmentation => "HYPERPIGMENTATION",
            ConcernKind::Redness => "REDNESS",
        }
    }

    /// Lower-case label for user-facing text
    pub fn label(&self) -> &'static str {
        match self {
            ConcernKind::Acne => "acne",
            ConcernKind::Dryness => "dryness",
            ConcernKind::Oiliness => "oiliness",
            ConcernKind::Hyperpigmentation => "hyperpigmentation",
            ConcernKind::Redness => "redness",
        }
    }

    /// Parse a concern name, tolerant of case, spaces and hyphens
    pub fn parse_name(raw: &str) -> Option<Self> {
        let name = canonical_name(raw);
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for ConcernKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facial region used for spatially-resolved concern scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneKind {
    Forehead,
    LeftCheek,
    RightCheek,
    Nose,
    Chin,
}

impl ZoneKind {
    /// All zones in model output row order
    pub const ALL: [ZoneKind; 5] = [
        ZoneKind::Forehead,
        ZoneKind::LeftCheek,
        ZoneKind::RightCheek,
        ZoneKind::Nose,
        ZoneKind::Chin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Forehead => "FOREHEAD",
            ZoneKind::LeftCheek => "LEFT_CHEEK",
            ZoneKind::RightCheek => "RIGHT_CHEEK",
            ZoneKind::Nose => "NOSE",
            ZoneKind::Chin => "CHIN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZoneKind::Forehead => "forehead",
            ZoneKind::LeftCheek => "left cheek",
            ZoneKind::RightCheek => "right cheek",
            ZoneKind::Nose => "nose",
            ZoneKind::Chin => "chin",
        }
    }

    pub fn parse_name(raw: &str) -> Option<Self> {
        let name = canonical_name(raw);
        Self::ALL.into_iter().find(|z| z.as_str() == name)
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Skin type
// ============================================================================

/// Ordinal 1-6 melanin / sun-sensitivity classification
///
/// Construction clamps into the valid range, so a `SkinType` value is always
/// between [`SKIN_TYPE_MIN`] and [`SKIN_TYPE_MAX`] inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct SkinType(u8);

impl SkinType {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(SKIN_TYPE_MIN, SKIN_TYPE_MAX))
    }

    /// Skin type for a zero-based probability vector index
    pub fn from_index(index: usize) -> Self {
        let value = u8::try_from(index.saturating_add(1)).unwrap_or(SKIN_TYPE_MAX);
        Self::new(value)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// True for the deeper half of the scale (types 4-6)
    pub fn is_deep(&self) -> bool {
        self.0 >= DEEP_TONE_MIN
    }

    /// Absolute ordinal distance to a declared type
    pub fn distance(&self, declared: u8) -> u8 {
        self.0.abs_diff(declared)
    }
}

impl From<u8> for SkinType {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<SkinType> for u8 {
    fn from(value: SkinType) -> Self {
        value.0
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.0)
    }
}

// ============================================================================
// Ingredients and categories
// ============================================================================

/// Canonicalised ingredient identifier (upper snake case)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IngredientId(String);

impl IngredientId {
    pub fn new(raw: &str) -> Self {
        Self(canonical_name(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form, e.g. `HYALURONIC_ACID` -> "hyaluronic acid"
    pub fn label(&self) -> String {
        self.0.replace('_', " ").to_lowercase()
    }
}

impl From<String> for IngredientId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for IngredientId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<IngredientId> for String {
    fn from(value: IngredientId) -> Self {
        value.0
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product category used to group ranked recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    Cleanser,
    Toner,
    Serum,
    Moisturizer,
    Sunscreen,
    Treatment,
    Mask,
    Other,
}

impl ProductCategory {
    const NAMED: [ProductCategory; 7] = [
        ProductCategory::Cleanser,
        ProductCategory::Toner,
        ProductCategory::Serum,
        ProductCategory::Moisturizer,
        ProductCategory::Sunscreen,
        ProductCategory::Treatment,
        ProductCategory::Mask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Cleanser => "CLEANSER",
            ProductCategory::Toner => "TONER",
            ProductCategory::Serum => "SERUM",
            ProductCategory::Moisturizer => "MOISTURIZER",
            ProductCategory::Sunscreen => "SUNSCREEN",
            ProductCategory::Treatment => "TREATMENT",
            ProductCategory::Mask => "MASK",
            ProductCategory::Other => "OTHER",
        }
    }

    /// Unknown names map to [`ProductCategory::Other`]
    pub fn parse_name(raw: &str) -> Self {
        let name = canonical_name(raw);
        Self::NAMED
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or(ProductCategory::Other)
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Assessment
// ============================================================================

/// Canonical result of one scan session
///
/// Immutable once built. `concern_severity` holds every [`ConcernKind`] when
/// produced by the normalizer; records loaded from a historical store may
/// carry fewer entries, and comparisons skip whatever is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub captured_at: DateTime<Utc>,
    /// Per-concern severity, 0.0-1.0
    pub concern_severity: BTreeMap<ConcernKind, f64>,
    /// Per-zone per-concern severity, 0.0-1.0
    pub zone_severity: BTreeMap<ZoneKind, BTreeMap<ConcernKind, f64>>,
    pub skin_type: SkinType,
    /// Probability mass of the selected skin type, 0.0-1.0
    pub skin_type_confidence: f64,
    /// True when the model was unavailable and fixed values were substituted
    #[serde(default)]
    pub is_fallback: bool,
    /// Health score persisted alongside the record, if the store kept one
    #[serde(default)]
    pub health_score: Option<u8>,
}

impl Assessment {
    /// Severity for `concern`, treating a missing entry as 0.0
    pub fn severity(&self, concern: ConcernKind) -> f64 {
        self.concern_severity.get(&concern).copied().unwrap_or(0.0)
    }

    /// Concerns with severity strictly above zero, in concern order
    pub fn active_concerns(&self) -> Vec<ConcernKind> {
        self.concern_severity
            .iter()
            .filter(|&(_, &severity)| severity > 0.0)
            .map(|(&concern, _)| concern)
            .collect()
    }

    /// Concerns above [`PRIMARY_CONCERN_THRESHOLD`], most severe first
    ///
    /// Equal severities keep concern order.
    pub fn primary_concerns(&self) -> Vec<(ConcernKind, f64)> {
        let mut primary: Vec<(ConcernKind, f64)> = self
            .concern_severity
            .iter()
            .filter(|&(_, &severity)| severity > PRIMARY_CONCERN_THRESHOLD)
            .map(|(&concern, &severity)| (concern, severity))
            .collect();
        primary.sort_by(|a, b| b.1.total_cmp(&a.1));
        primary
    }

    /// Zone where `concern` is most severe; ties go to the earlier zone
    ///
    /// Returns `None` when no zone reports the concern above zero.
    pub fn dominant_zone(&self, concern: ConcernKind) -> Option<(ZoneKind, f64)> {
        let mut best: Option<(ZoneKind, f64)> = None;
        for zone in ZoneKind::ALL {
            let severity = self
                .zone_severity
                .get(&zone)
                .and_then(|cells| cells.get(&concern))
                .copied()
                .unwrap_or(0.0);
            if severity <= 0.0 {
                continue;
            }
            match best {
                Some((_, current)) if current >= severity => {}
                _ => best = Some((zone, severity)),
            }
        }
        best
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Typed catalog reference data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: ProductCategory,
    pub key_ingredients: BTreeSet<IngredientId>,
    pub target_concerns: BTreeSet<ConcernKind>,
    /// Declared suitable skin types; empty means unrestricted
    pub suitable_skin_types: BTreeSet<u8>,
    pub is_specialized_for_deep_tones: bool,
    pub in_stock: bool,
}

/// Catalog row as stored, with list columns serialized as JSON text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub key_ingredients: String,
    pub target_concerns: String,
    pub suitable_skin_types: String,
    pub is_specialized_for_deep_tones: bool,
    pub in_stock: bool,
}

impl CatalogItem {
    /// Build a typed item from a stored row
    ///
    /// Malformed list columns become empty sets, so the item contributes
    /// nothing to the matching factor instead of failing the whole catalog.
    pub fn from_record(record: CatalogRecord) -> Self {
        Self {
            key_ingredients: parse::parse_ingredient_list(&record.key_ingredients),
            target_concerns: parse::parse_concern_list(&record.target_concerns),
            suitable_skin_types: parse::parse_skin_type_list(&record.suitable_skin_types),
            category: ProductCategory::parse_name(&record.category),
            id: record.id,
            name: record.name,
            is_specialized_for_deep_tones: record.is_specialized_for_deep_tones,
            in_stock: record.in_stock,
        }
    }
}
