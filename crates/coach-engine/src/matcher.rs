//! Soft constraint scoring: how well a hand fits one rule, in [0, 1].

use crate::features::{FeatureKey, FeatureValue, FeatureVector};
use crate::schema::{Bound, Constraint, ConstraintKind, Rule};
use serde::Serialize;

/// Overshooting the HCP ceiling of a strength-defining bid costs double:
/// opening a narrow-range bid with extra strength traps the hand, while a
/// point light is usually recoverable.
const CEILING_OVERSHOOT_FACTOR: f32 = 2.0;

#[derive(Debug, Clone, Serialize)]
pub struct HardFail {
    pub feature: FeatureKey,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// Product of all per-constraint scores; 0.0 means unusable.
    pub score: f32,
    /// Quality lost per SOFT constraint that was not perfectly met.
    pub penalties: Vec<(FeatureKey, f32)>,
    pub hard_fail: Option<HardFail>,
}

impl MatchResult {
    fn hard_failure(feature: FeatureKey, reason: String) -> Self {
        Self {
            score: 0.0,
            penalties: Vec::new(),
            hard_fail: Some(HardFail { feature, reason }),
        }
    }
}

/// Score a rule against a feature vector.
///
/// Quality starts at 1.0 and multiplies in each constraint's individual
/// score, so a violated HARD constraint zeroes the rule no matter how well
/// the rest fit, and several mild SOFT deviations compound instead of
/// averaging away. A HARD failure short-circuits immediately.
pub fn score(rule: &Rule, features: &FeatureVector) -> MatchResult {
    let mut quality = 1.0f32;
    let mut penalties = Vec::new();

    for constraint in &rule.constraints {
        let value = features.get(constraint.feature);
        let distance = violation_distance(rule, constraint, value);

        match constraint.kind {
            ConstraintKind::Hard => {
                if distance > 0.0 {
                    return MatchResult::hard_failure(
                        constraint.feature,
                        describe_violation(constraint, value),
                    );
                }
            }
            ConstraintKind::Soft => {
                if distance > 0.0 {
                    let constraint_score =
                        (1.0 - distance * constraint.penalty_per_unit).max(0.0);
                    penalties.push((constraint.feature, 1.0 - constraint_score));
                    quality *= constraint_score;
                }
            }
        }
    }

    MatchResult {
        score: quality,
        penalties,
        hard_fail: None,
    }
}

/// Distance from the nearest satisfied bound; 0.0 when satisfied.
/// Categorical mismatches count as distance 1.
fn violation_distance(rule: &Rule, constraint: &Constraint, value: FeatureValue) -> f32 {
    match (&constraint.bound, value) {
        (Bound::Exact(target), value) => match (value, *target) {
            (FeatureValue::Int(v), FeatureValue::Int(t)) => (v - t).abs() as f32,
            (v, t) => {
                if v == t {
                    0.0
                } else {
                    1.0
                }
            }
        },
        (Bound::Range { min, max }, FeatureValue::Int(v)) => {
            if let Some(min) = min {
                if v < *min {
                    return (*min - v) as f32;
                }
            }
            if let Some(max) = max {
                if v > *max {
                    let mut distance = (v - *max) as f32;
                    if rule.strength_defining && constraint.feature == FeatureKey::Hcp {
                        distance *= CEILING_OVERSHOOT_FACTOR;
                    }
                    return distance;
                }
            }
            0.0
        }
        // Load-time validation keeps ranges off non-integer features.
        (Bound::Range { .. }, _) => 1.0,
        (Bound::MemberOf(values), value) => {
            if values.contains(&value) {
                0.0
            } else {
                1.0
            }
        }
        (Bound::NotMemberOf(values), value) => {
            if values.contains(&value) {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn describe_violation(constraint: &Constraint, value: FeatureValue) -> String {
    match &constraint.bound {
        Bound::Exact(target) => {
            format!("{} is {}, needs {}", constraint.feature, value, target)
        }
        Bound::Range { min, max } => match (min, max) {
            (Some(min), Some(max)) => format!(
                "{} is {}, needs {}-{}",
                constraint.feature, value, min, max
            ),
            (Some(min), None) => {
                format!("{} is {}, needs {}+", constraint.feature, value, min)
            }
            (None, Some(max)) => format!(
                "{} is {}, needs at most {}",
                constraint.feature, value, max
            ),
            (None, None) => format!("{} is unbounded", constraint.feature),
        },
        Bound::MemberOf(_) => format!("{} is {}, not an allowed value", constraint.feature, value),
        Bound::NotMemberOf(_) => format!("{} is {}, an excluded value", constraint.feature, value),
    }
}
