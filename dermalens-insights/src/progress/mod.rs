//! Progress Analyzer
//!
//! Pure functions over stored assessments:
//! - [`compare`]: baseline vs current, per-concern deltas and trends
//! - [`summarize`]: health-score timeline and trends over a date window
//!
//! Sign convention: concern severity is "lower is better", so a negative
//! per-concern delta is an improvement, while a positive health-score delta
//! is an improvement.

pub mod compare;
pub mod timeline;

pub use compare::{compare, compare_with_band, ComparisonResult, ConcernComparison};
pub use timeline::{summarize, DateWindow, TimelineSeries, TimelineSummary};

use dermalens_common::Assessment;
use serde::Serialize;

/// Severity change inside this absolute band is classified as stable
pub const STABLE_SEVERITY_BAND: f64 = 0.05;

/// Health-score difference (points) required for a timeline trend
pub const HEALTH_TREND_THRESHOLD: f64 = 5.0;

/// Minimum assessments in a window before a timeline is produced
pub const MIN_TIMELINE_POINTS: usize = 3;

/// Slack for float subtraction error; a change landing on a threshold is stable
pub(crate) const THRESHOLD_EPSILON: f64 = 1e-9;

/// Direction of a single concern's severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConcernTrend {
    Improving,
    Worsening,
    Stable,
}

/// Direction of the overall health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthTrend {
    Improving,
    Declining,
    Stable,
}

/// Noise-rejection band for severity deltas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StabilityBand {
    /// Fixed band, identical for every concern
    Absolute(f64),
    /// Band proportional to the baseline severity, never narrower than
    /// [`STABLE_SEVERITY_BAND`] so near-zero baselines are not all noise
    Relative(f64),
}

impl Default for StabilityBand {
    fn default() -> Self {
        StabilityBand::Absolute(STABLE_SEVERITY_BAND)
    }
}

impl StabilityBand {
    /// Half-width of the stable band for a concern starting at `baseline`
    pub fn width(&self, baseline: f64) -> f64 {
        match *self {
            StabilityBand::Absolute(width) => width,
            StabilityBand::Relative(fraction) => {
                (baseline.abs() * fraction).max(STABLE_SEVERITY_BAND)
            }
        }
    }

    /// Classify `delta = current - baseline`; `|delta| == width` is stable
    pub fn classify(&self, baseline: f64, delta: f64) -> ConcernTrend {
        let width = self.width(baseline) + THRESHOLD_EPSILON;
        if delta < -width {
            ConcernTrend::Improving
        } else if delta > width {
            ConcernTrend::Worsening
        } else {
            ConcernTrend::Stable
        }
    }
}

/// 0-100 summary: inverse mean concern severity
///
/// Uses the stored score when the record carries one. An assessment with no
/// measured concerns scores 100.
pub fn health_score(assessment: &Assessment) -> u8 {
    if let Some(stored) = assessment.health_score {
        return stored.min(100);
    }
    computed_health_score(assessment)
}

/// Health score from severities alone, ignoring any stored value
pub fn computed_health_score(assessment: &Assessment) -> u8 {
    let severities = &assessment.concern_severity;
    if severities.is_empty() {
        return 100;
    }
    let mean = severities.values().sum::<f64>() / severities.len() as f64;
    let score = ((1.0 - mean) * 100.0).round();
    if !score.is_finite() {
        return 0;
    }
    score.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dermalens_common::{ConcernKind, SkinType};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn assessment(severities: &[(ConcernKind, f64)]) -> Assessment {
        Assessment {
            id: Uuid::nil(),
            captured_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            concern_severity: severities.iter().copied().collect(),
            zone_severity: BTreeMap::new(),
            skin_type: SkinType::new(3),
            skin_type_confidence: 0.9,
            is_fallback: false,
            health_score: None,
        }
    }

    #[test]
    fn test_health_score_inverse_mean() {
        assert_eq!(health_score(&assessment(&[(ConcernKind::Acne, 0.6)])), 40);
        assert_eq!(health_score(&assessment(&[(ConcernKind::Acne, 0.3)])), 70);
        assert_eq!(
            health_score(&assessment(&[
                (ConcernKind::Acne, 0.2),
                (ConcernKind::Dryness, 0.4)
            ])),
            70
        );
    }

    #[test]
    fn test_health_score_rounds() {
        // mean 0.125 -> 87.5 -> 88
        assert_eq!(
            health_score(&assessment(&[
                (ConcernKind::Acne, 0.25),
                (ConcernKind::Dryness, 0.0)
            ])),
            88
        );
    }

    #[test]
    fn test_health_score_prefers_stored_value() {
        let mut a = assessment(&[(ConcernKind::Acne, 0.6)]);
        a.health_score = Some(55);
        assert_eq!(health_score(&a), 55);
        assert_eq!(computed_health_score(&a), 40);
    }

    #[test]
    fn test_health_score_empty_is_full() {
        assert_eq!(health_score(&assessment(&[])), 100);
    }

    #[test]
    fn test_health_score_out_of_range_severity_is_clamped() {
        assert_eq!(health_score(&assessment(&[(ConcernKind::Acne, 1.8)])), 0);
        assert_eq!(health_score(&assessment(&[(ConcernKind::Acne, -0.5)])), 100);
    }

    #[test]
    fn test_health_score_is_idempotent_through_storage() {
        let a = assessment(&[(ConcernKind::Acne, 0.37), (ConcernKind::Redness, 0.11)]);
        let first = health_score(&a);
        let mut stored = a.clone();
        stored.health_score = Some(first);
        assert_eq!(health_score(&stored), first);
        assert_eq!(computed_health_score(&stored), first);
    }

    #[test]
    fn test_absolute_band_classification() {
        let band = StabilityBand::default();
        assert_eq!(band.classify(0.6, -0.3), ConcernTrend::Improving);
        assert_eq!(band.classify(0.6, 0.06), ConcernTrend::Worsening);
        assert_eq!(band.classify(0.6, 0.05), ConcernTrend::Stable);
        assert_eq!(band.classify(0.6, -0.05), ConcernTrend::Stable);
    }

    #[test]
    fn test_boundary_delta_is_stable_despite_rounding() {
        let band = StabilityBand::default();
        // 0.55 - 0.5 == 0.050000000000000044
        assert_eq!(band.classify(0.5, 0.55 - 0.5), ConcernTrend::Stable);
        assert_eq!(band.classify(0.55, 0.5 - 0.55), ConcernTrend::Stable);
        assert_eq!(band.classify(0.3, 0.35 - 0.3), ConcernTrend::Stable);
        assert_eq!(band.classify(0.5, 0.56 - 0.5), ConcernTrend::Worsening);
        assert_eq!(band.classify(0.56, 0.5 - 0.56), ConcernTrend::Improving);
    }

    #[test]
    fn test_relative_band_scales_with_baseline() {
        let band = StabilityBand::Relative(0.2);
        // 0.8 baseline -> 0.16 band
        assert_eq!(band.classify(0.8, -0.1), ConcernTrend::Stable);
        assert_eq!(band.classify(0.8, -0.2), ConcernTrend::Improving);
        // tiny baseline falls back to the absolute floor
        assert_eq!(band.width(0.01), STABLE_SEVERITY_BAND);
    }
}
