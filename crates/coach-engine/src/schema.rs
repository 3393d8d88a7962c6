//! Declarative rule schemas: the stable contract between rule authors and
//! the interpreter.
//!
//! Two wire shapes are accepted — the legacy binary-conditions map and the
//! explicit constraint array — and both normalize at load time into one
//! tagged [`Constraint`] form, so the matcher never branches on shape.

use crate::features::{FeatureKey, FeatureValue};
use crate::forcing::ForcingDirective;
use coach_core::{Call, Suit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Yaml {
        origin: String,
        source: serde_yaml::Error,
    },
    #[error("rule '{rule}' references unknown feature '{feature}'")]
    UnknownFeature { rule: String, feature: String },
    #[error("rule '{rule}' has a bad value for '{feature}': {detail}")]
    BadValue {
        rule: String,
        feature: String,
        detail: String,
    },
    #[error("rule '{rule}' has an unsupported condition: {detail}")]
    UnsupportedCondition { rule: String, detail: String },
    #[error("rule '{rule}' has an invalid trigger token '{token}'")]
    BadTrigger { rule: String, token: String },
    #[error("rule '{rule}' uses unknown template placeholder '{placeholder}'")]
    BadTemplate { rule: String, placeholder: String },
    #[error("rule '{rule}' has no constraints")]
    EmptyRule { rule: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Openings,
    Responses,
    Rebids,
    Overcalls,
    Doubles,
    Conventions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Hard,
    Soft,
}

/// A single normalized bound. `Range` is only valid on integer features.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Exact(FeatureValue),
    Range { min: Option<i16>, max: Option<i16> },
    MemberOf(Vec<FeatureValue>),
    NotMemberOf(Vec<FeatureValue>),
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub feature: FeatureKey,
    pub kind: ConstraintKind,
    pub bound: Bound,
    /// Quality lost per unit of violation distance; SOFT only.
    pub penalty_per_unit: f32,
}

const DEFAULT_SOFT_PENALTY: f32 = 0.25;

/// An immutable, normalized rule. Priority breaks quality ties only.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub category: Category,
    pub priority: i32,
    /// Exact auction-tail pattern; a mismatch skips the rule outright.
    pub trigger: Option<Vec<Call>>,
    /// Marks narrow-range strength bids whose HCP ceiling penalizes
    /// overshoot at twice the undershoot rate.
    pub strength_defining: bool,
    pub constraints: Vec<Constraint>,
    pub bid_template: String,
    pub explanation_template: String,
    pub forcing: Option<ForcingDirective>,
}

// ---------------------------------------------------------------------------
// Wire format

#[derive(Debug, Deserialize)]
struct RuleFile {
    category: Category,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: String,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    trigger: Option<String>,
    #[serde(default)]
    strength_defining: bool,
    /// Legacy binary-conditions map.
    #[serde(default)]
    conditions: Option<serde_yaml::Value>,
    /// Newer explicit constraint array.
    #[serde(default)]
    constraints: Vec<RawConstraint>,
    bid: String,
    explanation: String,
    #[serde(default)]
    forcing: Option<ForcingDirective>,
}

#[derive(Debug, Deserialize)]
struct RawConstraint {
    feature: String,
    #[serde(default)]
    constraint_type: Option<ConstraintKind>,
    #[serde(default)]
    min: Option<i16>,
    #[serde(default)]
    max: Option<i16>,
    #[serde(default)]
    exact: Option<serde_yaml::Value>,
    #[serde(default, rename = "in")]
    member_of: Option<Vec<serde_yaml::Value>>,
    #[serde(default)]
    not_in: Option<Vec<serde_yaml::Value>>,
    #[serde(default)]
    penalty_per_unit: Option<f32>,
}

// ---------------------------------------------------------------------------
// Normalization

fn parse_suit_name(s: &str) -> Option<Suit> {
    match s.trim().to_ascii_lowercase().as_str() {
        "clubs" => Some(Suit::Clubs),
        "diamonds" => Some(Suit::Diamonds),
        "hearts" => Some(Suit::Hearts),
        "spades" => Some(Suit::Spades),
        one => {
            let mut chars = one.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Suit::from_char(c),
                _ => None,
            }
        }
    }
}

fn decode_value(
    rule: &str,
    feature: FeatureKey,
    value: &serde_yaml::Value,
) -> Result<FeatureValue, SchemaError> {
    let bad = |detail: &str| SchemaError::BadValue {
        rule: rule.to_string(),
        feature: feature.name().to_string(),
        detail: detail.to_string(),
    };
    if feature.is_boolean() {
        return value.as_bool().map(FeatureValue::Bool).ok_or_else(|| {
            bad("expected a boolean")
        });
    }
    if feature.is_suit() {
        let name = value.as_str().ok_or_else(|| bad("expected a suit name"))?;
        return parse_suit_name(name)
            .map(FeatureValue::Suit)
            .ok_or_else(|| bad("expected a suit name"));
    }
    value
        .as_i64()
        .and_then(|v| i16::try_from(v).ok())
        .map(FeatureValue::Int)
        .ok_or_else(|| bad("expected an integer"))
}

fn resolve_feature(rule: &str, name: &str) -> Result<FeatureKey, SchemaError> {
    FeatureKey::parse(name).ok_or_else(|| SchemaError::UnknownFeature {
        rule: rule.to_string(),
        feature: name.to_string(),
    })
}

fn normalize_constraint(rule: &str, raw: &RawConstraint) -> Result<Constraint, SchemaError> {
    let feature = resolve_feature(rule, &raw.feature)?;
    let decode_list = |values: &[serde_yaml::Value]| -> Result<Vec<FeatureValue>, SchemaError> {
        values.iter().map(|v| decode_value(rule, feature, v)).collect()
    };

    let bound = if let Some(exact) = &raw.exact {
        Bound::Exact(decode_value(rule, feature, exact)?)
    } else if raw.min.is_some() || raw.max.is_some() {
        if feature.is_boolean() || feature.is_suit() {
            return Err(SchemaError::BadValue {
                rule: rule.to_string(),
                feature: feature.name().to_string(),
                detail: "min/max bounds require an integer feature".to_string(),
            });
        }
        Bound::Range {
            min: raw.min,
            max: raw.max,
        }
    } else if let Some(values) = &raw.member_of {
        Bound::MemberOf(decode_list(values)?)
    } else if let Some(values) = &raw.not_in {
        Bound::NotMemberOf(decode_list(values)?)
    } else {
        return Err(SchemaError::BadValue {
            rule: rule.to_string(),
            feature: feature.name().to_string(),
            detail: "constraint has no bound (need min/max, exact, in, or not_in)".to_string(),
        });
    };

    let kind = raw.constraint_type.unwrap_or(ConstraintKind::Hard);
    Ok(Constraint {
        feature,
        kind,
        bound,
        penalty_per_unit: match kind {
            ConstraintKind::Soft => raw.penalty_per_unit.unwrap_or(DEFAULT_SOFT_PENALTY),
            ConstraintKind::Hard => 0.0,
        },
    })
}

/// Normalize one legacy condition entry (feature name → scalar or bound
/// map) into a HARD constraint.
fn normalize_legacy_entry(
    rule: &str,
    name: &str,
    value: &serde_yaml::Value,
) -> Result<Constraint, SchemaError> {
    let feature = resolve_feature(rule, name)?;
    let hard = |bound| Constraint {
        feature,
        kind: ConstraintKind::Hard,
        bound,
        penalty_per_unit: 0.0,
    };

    if let serde_yaml::Value::Mapping(map) = value {
        let get = |key: &str| {
            map.iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v)
        };
        let as_int = |key: &str| -> Result<Option<i16>, SchemaError> {
            match get(key) {
                None => Ok(None),
                Some(v) => decode_value(rule, feature, v).map(|fv| fv.as_int()),
            }
        };
        if let Some(exact) = get("exact") {
            return Ok(hard(Bound::Exact(decode_value(rule, feature, exact)?)));
        }
        if let Some(serde_yaml::Value::Sequence(values)) = get("in") {
            let decoded: Result<Vec<_>, _> =
                values.iter().map(|v| decode_value(rule, feature, v)).collect();
            return Ok(hard(Bound::MemberOf(decoded?)));
        }
        if let Some(serde_yaml::Value::Sequence(values)) = get("not_in") {
            let decoded: Result<Vec<_>, _> =
                values.iter().map(|v| decode_value(rule, feature, v)).collect();
            return Ok(hard(Bound::NotMemberOf(decoded?)));
        }
        let min = as_int("min")?;
        let max = as_int("max")?;
        if min.is_some() || max.is_some() {
            return Ok(hard(Bound::Range { min, max }));
        }
        return Err(SchemaError::UnsupportedCondition {
            rule: rule.to_string(),
            detail: format!("unrecognized bound map for '{}'", name),
        });
    }

    // Bare scalar: direct equality.
    Ok(hard(Bound::Exact(decode_value(rule, feature, value)?)))
}

/// Normalize a legacy conditions map, including the `all_of`/`any_of`/`not`
/// combinators. `any_of` must collapse to a single-feature membership test;
/// cross-feature disjunction has no flat equivalent and is rejected.
fn normalize_legacy(
    rule: &str,
    value: &serde_yaml::Value,
) -> Result<Vec<Constraint>, SchemaError> {
    let serde_yaml::Value::Mapping(map) = value else {
        return Err(SchemaError::UnsupportedCondition {
            rule: rule.to_string(),
            detail: "conditions must be a mapping".to_string(),
        });
    };

    let mut constraints = Vec::new();
    for (key, entry) in map {
        let name = key.as_str().ok_or_else(|| SchemaError::UnsupportedCondition {
            rule: rule.to_string(),
            detail: "condition keys must be strings".to_string(),
        })?;
        match name {
            "all_of" => {
                let serde_yaml::Value::Sequence(branches) = entry else {
                    return Err(SchemaError::UnsupportedCondition {
                        rule: rule.to_string(),
                        detail: "all_of must be a list".to_string(),
                    });
                };
                for branch in branches {
                    constraints.extend(normalize_legacy(rule, branch)?);
                }
            }
            "any_of" => {
                constraints.push(normalize_any_of(rule, entry)?);
            }
            "not" => {
                let inner = normalize_legacy(rule, entry)?;
                let [single] = inner.as_slice() else {
                    return Err(SchemaError::UnsupportedCondition {
                        rule: rule.to_string(),
                        detail: "not must wrap exactly one condition".to_string(),
                    });
                };
                let negated = match &single.bound {
                    Bound::Exact(v) => Bound::NotMemberOf(vec![*v]),
                    Bound::MemberOf(vs) => Bound::NotMemberOf(vs.clone()),
                    Bound::NotMemberOf(vs) => Bound::MemberOf(vs.clone()),
                    Bound::Range { .. } => {
                        return Err(SchemaError::UnsupportedCondition {
                            rule: rule.to_string(),
                            detail: "not over a range bound is unsupported".to_string(),
                        })
                    }
                };
                constraints.push(Constraint {
                    feature: single.feature,
                    kind: ConstraintKind::Hard,
                    bound: negated,
                    penalty_per_unit: 0.0,
                });
            }
            _ => constraints.push(normalize_legacy_entry(rule, name, entry)?),
        }
    }
    Ok(constraints)
}

fn normalize_any_of(rule: &str, entry: &serde_yaml::Value) -> Result<Constraint, SchemaError> {
    let unsupported = |detail: &str| SchemaError::UnsupportedCondition {
        rule: rule.to_string(),
        detail: detail.to_string(),
    };
    let serde_yaml::Value::Sequence(branches) = entry else {
        return Err(unsupported("any_of must be a list"));
    };
    let mut feature = None;
    let mut members = Vec::new();
    for branch in branches {
        let inner = normalize_legacy(rule, branch)?;
        let [single] = inner.as_slice() else {
            return Err(unsupported("any_of branches must be single conditions"));
        };
        match feature {
            None => feature = Some(single.feature),
            Some(f) if f == single.feature => {}
            Some(_) => {
                return Err(unsupported(
                    "any_of across different features has no flat equivalent",
                ))
            }
        }
        match &single.bound {
            Bound::Exact(v) => members.push(*v),
            Bound::MemberOf(vs) => members.extend(vs.iter().copied()),
            _ => return Err(unsupported("any_of branches must be equality tests")),
        }
    }
    let feature = feature.ok_or_else(|| unsupported("any_of must not be empty"))?;
    Ok(Constraint {
        feature,
        kind: ConstraintKind::Hard,
        bound: Bound::MemberOf(members),
        penalty_per_unit: 0.0,
    })
}

fn parse_trigger(rule: &str, trigger: &str) -> Result<Vec<Call>, SchemaError> {
    trigger
        .split_whitespace()
        .map(|token| {
            token.parse::<Call>().map_err(|_| SchemaError::BadTrigger {
                rule: rule.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

/// Placeholders legal in bid and explanation templates.
fn validate_template(rule: &str, template: &str) -> Result<(), SchemaError> {
    for placeholder in template_placeholders(template) {
        let known = placeholder == "partner_suit"
            || placeholder == "quick_tricks"
            || FeatureKey::parse(&placeholder).is_some();
        if !known {
            return Err(SchemaError::BadTemplate {
                rule: rule.to_string(),
                placeholder,
            });
        }
    }
    Ok(())
}

pub(crate) fn template_placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        names.push(rest[start + 1..start + end].to_string());
        rest = &rest[start + end + 1..];
    }
    names
}

fn normalize_rule(category: Category, raw: &RawRule) -> Result<Rule, SchemaError> {
    let mut constraints = Vec::new();
    if let Some(conditions) = &raw.conditions {
        constraints.extend(normalize_legacy(&raw.id, conditions)?);
    }
    for raw_constraint in &raw.constraints {
        constraints.push(normalize_constraint(&raw.id, raw_constraint)?);
    }
    if constraints.is_empty() {
        return Err(SchemaError::EmptyRule {
            rule: raw.id.clone(),
        });
    }

    let trigger = raw
        .trigger
        .as_deref()
        .map(|t| parse_trigger(&raw.id, t))
        .transpose()?;

    validate_template(&raw.id, &raw.bid)?;
    validate_template(&raw.id, &raw.explanation)?;

    Ok(Rule {
        id: raw.id.clone(),
        category,
        priority: raw.priority,
        trigger,
        strength_defining: raw.strength_defining,
        constraints,
        bid_template: raw.bid.clone(),
        explanation_template: raw.explanation.clone(),
        forcing: raw.forcing,
    })
}

// ---------------------------------------------------------------------------
// Store

/// The loaded-once, read-only rule collection. Shareable across any number
/// of concurrent bid decisions.
#[derive(Debug, Default)]
pub struct SchemaStore {
    rules: Vec<Rule>,
}

const BUILTIN_SHARDS: [(&str, &str); 6] = [
    ("openings.yaml", include_str!("rules/openings.yaml")),
    ("responses.yaml", include_str!("rules/responses.yaml")),
    ("rebids.yaml", include_str!("rules/rebids.yaml")),
    ("overcalls.yaml", include_str!("rules/overcalls.yaml")),
    ("doubles.yaml", include_str!("rules/doubles.yaml")),
    ("conventions.yaml", include_str!("rules/conventions.yaml")),
];

impl SchemaStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in rule set. Shards that fail to parse are logged and
    /// skipped so one bad edit cannot take every category down.
    pub fn builtin() -> Self {
        let mut store = Self::empty();
        for (name, text) in BUILTIN_SHARDS {
            if let Err(err) = store.add_source(name, text) {
                warn!(shard = name, error = %err, "skipping builtin rule shard");
            }
        }
        store
    }

    /// Parse one YAML source. The file is rejected whole on a YAML error;
    /// individually malformed rules are logged and skipped.
    pub fn add_source(&mut self, origin: &str, text: &str) -> Result<usize, SchemaError> {
        let file: RuleFile = serde_yaml::from_str(text).map_err(|source| SchemaError::Yaml {
            origin: origin.to_string(),
            source,
        })?;
        let mut added = 0;
        for raw in &file.rules {
            match normalize_rule(file.category, raw) {
                Ok(rule) => {
                    self.rules.push(rule);
                    added += 1;
                }
                Err(err) => {
                    warn!(origin, rule = raw.id.as_str(), error = %err, "skipping rule");
                }
            }
        }
        Ok(added)
    }

    /// Load every `*.yaml` file in a directory, skipping files that fail to
    /// read or parse. Only an unreadable directory is an error.
    pub fn load_dir(path: &Path) -> Result<Self, SchemaError> {
        let entries = fs::read_dir(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut store = Self::empty();
        for entry in entries.flatten() {
            let file_path = entry.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let origin = file_path.display().to_string();
            match fs::read_to_string(&file_path) {
                Ok(text) => {
                    if let Err(err) = store.add_source(&origin, &text) {
                        warn!(file = origin.as_str(), error = %err, "skipping rule file");
                    }
                }
                Err(err) => {
                    warn!(file = origin.as_str(), error = %err, "skipping unreadable file");
                }
            }
        }
        Ok(store)
    }

    pub fn merge(&mut self, other: SchemaStore) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
