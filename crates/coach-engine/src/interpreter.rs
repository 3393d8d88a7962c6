//! Schema interpretation: run every rule against the features and produce
//! ranked, fully resolved bid candidates.

use crate::features::{FeatureKey, FeatureVector};
use crate::forcing::ForcingDirective;
use crate::matcher::{self, MatchResult};
use crate::schema::{template_placeholders, Rule, SchemaStore};
use coach_core::{Auction, Call};
use serde::Serialize;
use tracing::debug;

/// How rules are scored: the graded soft matcher, or the legacy
/// all-or-nothing interpretation where every constraint is binary and
/// ranking falls back to priority alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Soft,
    Binary,
}

/// One resolved candidate. Lives for a single bid decision.
#[derive(Debug, Clone, Serialize)]
pub struct BidCandidate {
    pub call: Call,
    pub rule_id: String,
    pub priority: i32,
    pub quality: f32,
    pub explanation: String,
    pub forcing: Option<ForcingDirective>,
}

/// Evaluate all rules, returning candidates ranked by descending quality,
/// priority breaking ties. Trigger mismatches are hard skips (never scored);
/// zero-quality matches are dropped.
pub fn evaluate(
    store: &SchemaStore,
    features: &FeatureVector,
    auction: &Auction,
    mode: MatchMode,
) -> Vec<BidCandidate> {
    let mut candidates: Vec<BidCandidate> = store
        .rules()
        .iter()
        .filter(|rule| trigger_matches(rule, auction))
        .filter_map(|rule| resolve_candidate(rule, features, mode))
        .collect();

    candidates.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.priority.cmp(&a.priority))
    });
    candidates
}

/// Score one rule and resolve its templates, if it survives.
fn resolve_candidate(
    rule: &Rule,
    features: &FeatureVector,
    mode: MatchMode,
) -> Option<BidCandidate> {
    let quality = match mode {
        MatchMode::Soft => {
            let result = matcher::score(rule, features);
            if result.score <= 0.0 {
                return None;
            }
            result.score
        }
        MatchMode::Binary => {
            if !binary_match(rule, features) {
                return None;
            }
            1.0
        }
    };

    let Some(bid_text) = resolve_template(&rule.bid_template, features) else {
        return None;
    };
    let Ok(call) = bid_text.parse::<Call>() else {
        debug!(rule = rule.id.as_str(), bid = bid_text.as_str(), "bid template resolved to a non-call");
        return None;
    };
    let explanation = resolve_template(&rule.explanation_template, features)
        .unwrap_or_else(|| rule.explanation_template.clone());

    Some(BidCandidate {
        call,
        rule_id: rule.id.clone(),
        priority: rule.priority,
        quality,
        explanation,
        forcing: rule.forcing,
    })
}

/// Legacy interpretation: every constraint, soft or hard, must be exactly
/// satisfied.
fn binary_match(rule: &Rule, features: &FeatureVector) -> bool {
    let strict = Rule {
        constraints: rule
            .constraints
            .iter()
            .cloned()
            .map(|mut c| {
                c.kind = crate::schema::ConstraintKind::Hard;
                c
            })
            .collect(),
        ..rule.clone()
    };
    matcher::score(&strict, features).score >= 1.0
}

/// Best single-rule match for a specific call, used for differential
/// feedback on a user's bid. Returns the rule id and its match result.
pub fn best_match_for_call(
    store: &SchemaStore,
    features: &FeatureVector,
    auction: &Auction,
    call: &Call,
) -> Option<(String, MatchResult)> {
    store
        .rules()
        .iter()
        .filter(|rule| trigger_matches(rule, auction))
        .filter_map(|rule| {
            let resolved = resolve_template(&rule.bid_template, features)?;
            let resolved_call: Call = resolved.parse().ok()?;
            (resolved_call == *call).then(|| (rule.id.clone(), matcher::score(rule, features)))
        })
        .fold(None, |best: Option<(String, MatchResult)>, (id, result)| {
            let better = match &best {
                None => true,
                Some((_, current)) => {
                    result.score > current.score
                        // At equal scores a soft near-miss explains the call
                        // better than a context-gated hard failure.
                        || (result.score == current.score
                            && current.hard_fail.is_some()
                            && result.hard_fail.is_none())
                }
            };
            if better {
                Some((id, result))
            } else {
                best
            }
        })
}

/// A trigger is an exact auction-tail pattern. Parsing already canonicalized
/// suit symbols, so comparison is on call values, not spellings.
fn trigger_matches(rule: &Rule, auction: &Auction) -> bool {
    let Some(pattern) = &rule.trigger else {
        return true;
    };
    if auction.calls.len() < pattern.len() {
        return false;
    }
    let tail = &auction.calls[auction.calls.len() - pattern.len()..];
    tail == pattern.as_slice()
}

/// Substitute `{placeholder}` occurrences with feature values. Returns None
/// if a placeholder has no value in this context (e.g. `{partner_suit}`
/// when partner has not shown a suit).
fn resolve_template(template: &str, features: &FeatureVector) -> Option<String> {
    let mut result = template.to_string();
    for name in template_placeholders(template) {
        let value = match name.as_str() {
            "partner_suit" => features.partner_suit?.to_char().to_string(),
            "quick_tricks" => render_half_units(features.quick_tricks_x2),
            other => {
                let key = FeatureKey::parse(other)?;
                features.get(key).to_string()
            }
        };
        result = result.replace(&format!("{{{}}}", name), &value);
    }
    Some(result)
}

fn render_half_units(x2: u8) -> String {
    if x2 % 2 == 0 {
        format!("{}", x2 / 2)
    } else {
        format!("{}.5", x2 / 2)
    }
}
