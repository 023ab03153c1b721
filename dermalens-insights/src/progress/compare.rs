//! Pairwise assessment comparison

use super::{health_score, ConcernTrend, StabilityBand};
use dermalens_common::time::whole_days_between;
use dermalens_common::{Assessment, ConcernKind};
use serde::Serialize;
use uuid::Uuid;

/// One concern measured in both assessments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcernComparison {
    pub concern: ConcernKind,
    pub baseline_severity: f64,
    pub current_severity: f64,
    /// `current - baseline`; negative is an improvement
    pub delta: f64,
    pub trend: ConcernTrend,
}

/// Result of comparing a baseline assessment with a later one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub baseline_id: Uuid,
    pub current_id: Uuid,
    /// Whole days between captures, truncated
    pub days_between: i64,
    pub baseline_health: u8,
    pub current_health: u8,
    /// `current_health - baseline_health`; positive is an improvement
    pub overall_delta: i32,
    pub per_concern: Vec<ConcernComparison>,
    pub improving: Vec<ConcernKind>,
    pub worsening: Vec<ConcernKind>,
    pub stable: Vec<ConcernKind>,
}

impl ComparisonResult {
    pub fn concern(&self, concern: ConcernKind) -> Option<&ConcernComparison> {
        self.per_concern.iter().find(|c| c.concern == concern)
    }
}

/// Compare with the default ±0.05 stability band
pub fn compare(baseline: &Assessment, current: &Assessment) -> ComparisonResult {
    compare_with_band(baseline, current, StabilityBand::default())
}

/// Compare using an explicit stability band
///
/// Only concerns present in both severity maps are compared; a concern the
/// baseline never measured is skipped rather than treated as 0.0.
pub fn compare_with_band(
    baseline: &Assessment,
    current: &Assessment,
    band: StabilityBand,
) -> ComparisonResult {
    let baseline_health = health_score(baseline);
    let current_health = health_score(current);

    let mut per_concern = Vec::new();
    let mut improving = Vec::new();
    let mut worsening = Vec::new();
    let mut stable = Vec::new();

    for (&concern, &baseline_severity) in &baseline.concern_severity {
        let Some(&current_severity) = current.concern_severity.get(&concern) else {
            continue;
        };
        let delta = current_severity - baseline_severity;
        let trend = band.classify(baseline_severity, delta);
        match trend {
            ConcernTrend::Improving => improving.push(concern),
            ConcernTrend::Worsening => worsening.push(concern),
            ConcernTrend::Stable => stable.push(concern),
        }
        per_concern.push(ConcernComparison {
            concern,
            baseline_severity,
            current_severity,
            delta,
            trend,
        });
    }

    ComparisonResult {
        baseline_id: baseline.id,
        current_id: current.id,
        days_between: whole_days_between(baseline.captured_at, current.captured_at),
        baseline_health,
        current_health,
        overall_delta: i32::from(current_health) - i32::from(baseline_health),
        per_concern,
        improving,
        worsening,
        stable,
    }
}
