//! Sprint velocity and commitment metrics from a JSON sprint history.
//!
//! ```json
//! { "sprints": [ { "name": "Sprint 1", "committed_points": 30, "completed_points": 27 } ] }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bands::{classify, deduplicate, round1, Band};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

/// Percent change between history halves that counts as a trend.
const TREND_THRESHOLD_PCT: f64 = 10.0;
/// Coefficient of variation (percent) above which velocity is moderate.
const STABILITY_MODERATE_CV: f64 = 10.0;
/// Coefficient of variation (percent) above which velocity is volatile.
const STABILITY_VOLATILE_CV: f64 = 20.0;

struct Hyperparameters {
    min_history: usize,
    scope_creep_ratio: f64,
}

static HP: Hyperparameters = Hyperparameters {
    min_history: 3,
    scope_creep_ratio: 0.10,
};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    pub committed_points: f64,
    pub completed_points: f64,
    #[serde(default)]
    pub scope_added_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintData {
    pub sprints: Vec<Sprint>,
}

impl SprintData {
    pub fn parse(json: &str) -> Result<Self> {
        let data: SprintData = serde_json::from_str(json)?;
        for sprint in &data.sprints {
            let fields = [
                ("committed_points", sprint.committed_points),
                ("completed_points", sprint.completed_points),
                ("scope_added_points", sprint.scope_added_points),
            ];
            for (field, value) in fields {
                if !value.is_finite() || value < 0.0 {
                    return Err(Error::InvalidSprint {
                        name: sprint.name.clone(),
                        reason: format!("{field} must be a non-negative number, got {value}"),
                    });
                }
            }
        }
        Ok(data)
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Moderate,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predictability {
    HighlyPredictable,
    Predictable,
    Variable,
    Unpredictable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stability::Stable => "stable",
            Stability::Moderate => "moderate",
            Stability::Volatile => "volatile",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Predictability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Predictability::HighlyPredictable => "Highly predictable",
            Predictability::Predictable => "Predictable",
            Predictability::Variable => "Variable",
            Predictability::Unpredictable => "Unpredictable",
        };
        f.write_str(s)
    }
}

static TREND_BANDS: [Band<Trend>; 3] = [
    Band::above(TREND_THRESHOLD_PCT, Trend::Improving),
    Band::at_least(-TREND_THRESHOLD_PCT, Trend::Stable),
    Band::at_least(f64::NEG_INFINITY, Trend::Declining),
];

static STABILITY_BANDS: [Band<Stability>; 3] = [
    Band::above(STABILITY_VOLATILE_CV, Stability::Volatile),
    Band::above(STABILITY_MODERATE_CV, Stability::Moderate),
    Band::at_least(0.0, Stability::Stable),
];

pub static PREDICTABILITY_BANDS: [Band<Predictability>; 4] = [
    Band::at_least(90.0, Predictability::HighlyPredictable),
    Band::at_least(80.0, Predictability::Predictable),
    Band::at_least(70.0, Predictability::Variable),
    Band::at_least(f64::NEG_INFINITY, Predictability::Unpredictable),
];

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub average: Option<f64>,
    pub std_dev: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub trend: Option<Trend>,
    pub stability: Option<Stability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub average_completion_rate: Option<f64>,
    pub sprints_meeting_commitment: usize,
    pub predictability: Option<Predictability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeChange {
    pub total_added: f64,
    pub average_added: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub low: f64,
    pub expected: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintReport {
    pub sprint_count: usize,
    pub velocity: Velocity,
    pub commitment: Commitment,
    pub scope_change: ScopeChange,
    pub forecast: Option<Forecast>,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percent change between the earlier and later halves of the history; the
/// middle sprint of an odd-length history belongs to neither half.
fn trend(velocities: &[f64]) -> Option<Trend> {
    if velocities.len() < 2 {
        return None;
    }
    let half = velocities.len() / 2;
    let earlier = mean(&velocities[..half])?;
    let later = mean(&velocities[velocities.len() - half..])?;
    let change_pct = if earlier == 0.0 {
        if later > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        (later - earlier) / earlier * 100.0
    };
    classify(&TREND_BANDS, change_pct)
}

fn velocity(sprints: &[Sprint]) -> Velocity {
    let values: Vec<f64> = sprints.iter().map(|s| s.completed_points).collect();
    let average = mean(&values);
    let std = std_dev(&values);
    let cv = match (average, std) {
        (Some(m), Some(s)) if m > 0.0 => Some(s / m * 100.0),
        _ => None,
    };
    Velocity {
        average: average.map(round1),
        std_dev: std.map(round1),
        coefficient_of_variation: cv.map(round1),
        min: values.iter().copied().reduce(f64::min).map(round1),
        max: values.iter().copied().reduce(f64::max).map(round1),
        trend: trend(&values),
        stability: cv.and_then(|v| classify(&STABILITY_BANDS, round1(v))),
    }
}

fn commitment(sprints: &[Sprint]) -> Commitment {
    let rates: Vec<f64> = sprints
        .iter()
        .filter(|s| s.committed_points > 0.0)
        .map(|s| s.completed_points / s.committed_points * 100.0)
        .collect();
    let average = mean(&rates).map(round1);
    Commitment {
        average_completion_rate: average,
        sprints_meeting_commitment: sprints
            .iter()
            .filter(|s| s.completed_points >= s.committed_points)
            .count(),
        predictability: average.and_then(|r| classify(&PREDICTABILITY_BANDS, r)),
    }
}

fn scope_change(sprints: &[Sprint]) -> ScopeChange {
    let added: Vec<f64> = sprints.iter().map(|s| s.scope_added_points).collect();
    ScopeChange {
        total_added: round1(added.iter().sum()),
        average_added: mean(&added).map(round1),
    }
}

fn recommendations(data: &SprintData, report: &SprintReport) -> Vec<String> {
    let mut advice = Vec::new();

    if report.sprint_count < HP.min_history {
        advice.push(format!(
            "Only {} sprint(s) of history; metrics stabilize after {} or more.",
            report.sprint_count, HP.min_history
        ));
    }

    if let (Some(Stability::Volatile), Some(cv)) = (
        report.velocity.stability,
        report.velocity.coefficient_of_variation,
    ) {
        advice.push(format!(
            "Velocity is volatile (CV {cv:.1}% > {STABILITY_VOLATILE_CV:.0}%); stabilize team capacity and story sizing."
        ));
    } else if report.velocity.stability == Some(Stability::Moderate) {
        advice.push(format!(
            "Velocity varies moderately (CV above {STABILITY_MODERATE_CV:.0}%); review estimation consistency."
        ));
    }

    if report.velocity.trend == Some(Trend::Declining) {
        advice.push(format!(
            "Velocity declined more than {TREND_THRESHOLD_PCT:.0}% across the history; look for impediments or capacity loss."
        ));
    }

    if let (Some(p @ (Predictability::Variable | Predictability::Unpredictable)), Some(rate)) = (
        report.commitment.predictability,
        report.commitment.average_completion_rate,
    ) {
        advice.push(format!(
            "Commitment reliability is {p} ({rate:.1}% completed); commit closer to average velocity."
        ));
    }

    let committed: Vec<f64> = data.sprints.iter().map(|s| s.committed_points).collect();
    if let (Some(avg_added), Some(avg_committed)) =
        (report.scope_change.average_added, mean(&committed))
    {
        if avg_committed > 0.0 && avg_added / avg_committed > HP.scope_creep_ratio {
            advice.push(format!(
                "Mid-sprint scope additions average {avg_added:.1} points; protect the sprint backlog."
            ));
        }
    }

    deduplicate(advice)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[tracing::instrument(skip(data), fields(sprints = data.sprints.len()))]
pub fn analyze(data: &SprintData) -> SprintReport {
    let sprints = data.sprints.as_slice();
    let velocity = velocity(sprints);
    let forecast = match (velocity.average, velocity.std_dev) {
        (Some(m), Some(s)) => Some(Forecast {
            low: round1((m - s).max(0.0)),
            expected: m,
            high: round1(m + s),
        }),
        _ => None,
    };

    let mut report = SprintReport {
        sprint_count: sprints.len(),
        velocity,
        commitment: commitment(sprints),
        scope_change: scope_change(sprints),
        forecast,
        recommendations: Vec::new(),
    };
    report.recommendations = if sprints.is_empty() {
        Vec::new()
    } else {
        recommendations(data, &report)
    };

    tracing::debug!(
        average = ?report.velocity.average,
        predictability = ?report.commitment.predictability,
        "computed sprint metrics"
    );
    report
}
