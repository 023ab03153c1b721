//! Multi-assessment timeline aggregation
//!
//! # Overall trend
//! The health-score series is split by count into first-third and last-third
//! windows; the averages of those windows are compared against
//! [`HEALTH_TREND_THRESHOLD`].
//!
//! # Per-concern trend
//! Endpoint delta of each concern's own sub-series, classified with the
//! default stability band. Concerns observed fewer than twice are omitted.

use super::{
    health_score, ConcernTrend, HealthTrend, StabilityBand, HEALTH_TREND_THRESHOLD,
    MIN_TIMELINE_POINTS, THRESHOLD_EPSILON,
};
use chrono::{DateTime, Utc};
use dermalens_common::{Assessment, ConcernKind};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Inclusive capture-time window; open ends are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| instant >= start)
            && self.end.map_or(true, |end| instant <= end)
    }
}

/// One health-score sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthPoint {
    pub assessment_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub health_score: u8,
}

/// One concern-severity sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityPoint {
    pub captured_at: DateTime<Utc>,
    pub severity: f64,
}

/// Aggregated timeline over a window with at least three assessments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSeries {
    pub window: DateWindow,
    /// Oldest first
    pub points: Vec<HealthPoint>,
    pub per_concern: BTreeMap<ConcernKind, Vec<SeverityPoint>>,
    /// Mean health score of the first third of `points`
    pub early_average: f64,
    /// Mean health score of the last third of `points`
    pub late_average: f64,
    pub overall_trend: HealthTrend,
    /// Only concerns with two or more samples
    pub concern_trends: BTreeMap<ConcernKind, ConcernTrend>,
}

/// Result of [`summarize`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineSummary {
    /// Too few assessments in the window to draw a trend
    InsufficientData { available: usize, required: usize },
    Series(TimelineSeries),
}

impl TimelineSummary {
    pub fn series(&self) -> Option<&TimelineSeries> {
        match self {
            TimelineSummary::Series(series) => Some(series),
            TimelineSummary::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, TimelineSummary::InsufficientData { .. })
    }
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

fn classify_health(early: f64, late: f64) -> HealthTrend {
    let change = late - early;
    let threshold = HEALTH_TREND_THRESHOLD + THRESHOLD_EPSILON;
    if change > threshold {
        HealthTrend::Improving
    } else if change < -threshold {
        HealthTrend::Declining
    } else {
        HealthTrend::Stable
    }
}

/// Aggregate the assessments captured inside `window`
///
/// Input order does not matter; samples are ordered by capture time (equal
/// timestamps keep input order).
pub fn summarize(series: &[Assessment], window: DateWindow) -> TimelineSummary {
    let mut in_window: Vec<&Assessment> = series
        .iter()
        .filter(|a| window.contains(a.captured_at))
        .collect();
    in_window.sort_by_key(|a| a.captured_at);

    if in_window.len() < MIN_TIMELINE_POINTS {
        debug!(
            available = in_window.len(),
            required = MIN_TIMELINE_POINTS,
            "Not enough assessments for a timeline"
        );
        return TimelineSummary::InsufficientData {
            available: in_window.len(),
            required: MIN_TIMELINE_POINTS,
        };
    }

    let points: Vec<HealthPoint> = in_window
        .iter()
        .map(|a| HealthPoint {
            assessment_id: a.id,
            captured_at: a.captured_at,
            health_score: health_score(a),
        })
        .collect();

    let mut per_concern: BTreeMap<ConcernKind, Vec<SeverityPoint>> = BTreeMap::new();
    for assessment in &in_window {
        for (&concern, &severity) in &assessment.concern_severity {
            per_concern.entry(concern).or_default().push(SeverityPoint {
                captured_at: assessment.captured_at,
                severity,
            });
        }
    }

    let scores: Vec<u8> = points.iter().map(|p| p.health_score).collect();
    let third = scores.len() / 3;
    let early_average = mean(&scores[..third]);
    let late_average = mean(&scores[scores.len() - third..]);
    let overall_trend = classify_health(early_average, late_average);

    let band = StabilityBand::default();
    let concern_trends: BTreeMap<ConcernKind, ConcernTrend> = per_concern
        .iter()
        .filter_map(|(&concern, samples)| match samples.as_slice() {
            [first, .., last] => Some((
                concern,
                band.classify(first.severity, last.severity - first.severity),
            )),
            _ => None,
        })
        .collect();

    debug!(
        points = points.len(),
        early = early_average,
        late = late_average,
        trend = ?overall_trend,
        "Timeline summarized"
    );

    TimelineSummary::Series(TimelineSeries {
        window,
        points,
        per_concern,
        early_average,
        late_average,
        overall_trend,
        concern_trends,
    })
}
