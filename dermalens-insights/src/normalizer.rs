//! Assessment Normalizer
//!
//! Converts raw on-device model output into a canonical [`Assessment`].
//!
//! # Input layout
//! - `concern_scores`: one score per [`ConcernKind`], in `ConcernKind::ALL` order
//! - `skin_type_probabilities`: six-way distribution, index 0 = type 1
//! - `zone_scores`: one row per [`ZoneKind`] (`ZoneKind::ALL` order), each row
//!   one score per concern
//!
//! Short vectors are padded with 0.0 and non-finite values become 0.0, so
//! every concern and every zone cell is always present in the result.
//!
//! # Fallback
//! When the model path is not ready the normalizer returns a fixed assessment
//! flagged with `is_fallback = true`:
//! - every concern and zone cell at [`FALLBACK_SEVERITY`] (no primary concerns)
//! - skin type [`FALLBACK_SKIN_TYPE`] with confidence 0.0

use chrono::{DateTime, Utc};
use dermalens_common::{Assessment, ConcernKind, Result, SkinType, ZoneKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Severity assigned to every concern in the fallback assessment
pub const FALLBACK_SEVERITY: f64 = 0.2;

/// Skin type assigned in the fallback assessment (scale midpoint)
pub const FALLBACK_SKIN_TYPE: u8 = 3;

/// Raw buffers produced by the model runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawModelOutput {
    pub concern_scores: Vec<f64>,
    pub skin_type_probabilities: Vec<f64>,
    pub zone_scores: Vec<Vec<f64>>,
}

impl RawModelOutput {
    /// Decode model runner JSON
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Clamp a raw score into 0.0-1.0; NaN and infinities become 0.0
fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Cell `index` of `row`, or 0.0 when the model omitted it
fn cell(row: &[f64], index: usize) -> f64 {
    row.get(index).copied().map(sanitize).unwrap_or(0.0)
}

/// Argmax over the skin-type distribution; the lowest index wins ties
///
/// Returns `(skin_type, confidence)`. An empty distribution selects type 1
/// with confidence 0.0.
pub fn select_skin_type(probabilities: &[f64]) -> (SkinType, f64) {
    let mut best_index = 0;
    let mut best = f64::NEG_INFINITY;
    for (index, &p) in probabilities.iter().take(6).enumerate() {
        let p = sanitize(p);
        if p > best {
            best = p;
            best_index = index;
        }
    }
    let confidence = if best.is_finite() { best } else { 0.0 };
    (SkinType::from_index(best_index), confidence)
}

/// Build an assessment from model output, or the fallback when `raw` is `None`
pub fn normalize(
    raw: Option<&RawModelOutput>,
    id: Uuid,
    captured_at: DateTime<Utc>,
) -> Assessment {
    let Some(raw) = raw else {
        warn!(assessment_id = %id, "Model output unavailable, using fallback assessment");
        return fallback_assessment(id, captured_at);
    };

    let concern_severity: BTreeMap<ConcernKind, f64> = ConcernKind::ALL
        .iter()
        .enumerate()
        .map(|(i, &concern)| (concern, cell(&raw.concern_scores, i)))
        .collect();

    let zone_severity: BTreeMap<ZoneKind, BTreeMap<ConcernKind, f64>> = ZoneKind::ALL
        .iter()
        .enumerate()
        .map(|(z, &zone)| {
            let row = raw.zone_scores.get(z).map(Vec::as_slice).unwrap_or(&[]);
            let cells: BTreeMap<ConcernKind, f64> = ConcernKind::ALL
                .iter()
                .enumerate()
                .map(|(c, &concern)| (concern, cell(row, c)))
                .collect();
            (zone, cells)
        })
        .collect();

    let (skin_type, skin_type_confidence) = select_skin_type(&raw.skin_type_probabilities);

    let assessment = Assessment {
        id,
        captured_at,
        concern_severity,
        zone_severity,
        skin_type,
        skin_type_confidence,
        is_fallback: false,
        health_score: None,
    };

    debug!(
        assessment_id = %id,
        skin_type = skin_type.value(),
        confidence = skin_type_confidence,
        primary = ?assessment.primary_concerns(),
        "Assessment normalized"
    );

    assessment
}

/// Fixed, clearly-flagged assessment used when the model is not ready
pub fn fallback_assessment(id: Uuid, captured_at: DateTime<Utc>) -> Assessment {
    let concerns: BTreeMap<ConcernKind, f64> = ConcernKind::ALL
        .iter()
        .map(|&concern| (concern, FALLBACK_SEVERITY))
        .collect();
    let zones = ZoneKind::ALL
        .iter()
        .map(|&zone| (zone, concerns.clone()))
        .collect();

    Assessment {
        id,
        captured_at,
        concern_severity: concerns,
        zone_severity: zones,
        skin_type: SkinType::new(FALLBACK_SKIN_TYPE),
        skin_type_confidence: 0.0,
        is_fallback: true,
        health_score: None,
    }
}
