//! The bidding orchestrator: features → ranked candidates → filters →
//! oracle review → `(call, explanation)`.
//!
//! All per-deal mutable state lives in the caller-threaded [`DealContext`];
//! the orchestrator itself is read-only after construction and can serve
//! any number of concurrent deals.

use crate::features::FeatureVector;
use crate::forcing::DealContext;
use crate::interpreter::{self, BidCandidate, MatchMode};
use crate::matcher::MatchResult;
use crate::oracle::{OracleReview, PassThrough};
use crate::safety::{self, Verdict};
use crate::schema::SchemaStore;
use coach_core::{Auction, Call, Hand, Vulnerability};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// How far an illegal proposal may be raised (in levels above the proposed
/// bid) before the candidate is discarded instead of repaired.
const MAX_REPAIR_ESCALATION: u8 = 2;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No candidate survived and Pass would violate an uncontested force.
    /// This is a bidding-engine failure, reported rather than papered over
    /// with an obligation-breaking pass.
    #[error("bidding engine failure: {explanation}")]
    NoLegalCall { explanation: String },
}

/// Differential feedback on a user's proposed call versus the engine's.
#[derive(Debug, Serialize)]
pub struct UserBidFeedback {
    pub user_call: Call,
    /// Best rule whose resolved bid equals the user's call, if any.
    pub user_rule: Option<String>,
    pub user_match: Option<MatchResult>,
    /// The constraint standing between the user's hand and their call.
    pub unmet: Option<String>,
    pub engine_call: Call,
    pub engine_rule: Option<String>,
    pub engine_explanation: String,
    pub governor: Verdict,
}

pub struct Orchestrator {
    store: SchemaStore,
    oracle: Box<dyn OracleReview>,
    /// Fall back to the legacy binary interpretation when soft matching
    /// yields nothing.
    binary_fallback: bool,
}

impl Orchestrator {
    pub fn new(store: SchemaStore) -> Self {
        Self {
            store,
            oracle: Box::new(PassThrough),
            binary_fallback: true,
        }
    }

    pub fn with_oracle(mut self, oracle: Box<dyn OracleReview>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn without_binary_fallback(mut self) -> Self {
        self.binary_fallback = false;
        self
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    /// Select the next call for the hand on turn. Every returned call is
    /// paired with a human-readable explanation, including fallbacks.
    pub fn get_next_bid(
        &self,
        hand: &Hand,
        auction: &Auction,
        vulnerability: Vulnerability,
        ctx: &mut DealContext,
    ) -> Result<(Call, String), EngineError> {
        let features = FeatureVector::extract(hand, auction, vulnerability);

        let candidates = interpreter::evaluate(&self.store, &features, auction, MatchMode::Soft);
        let survivor = self
            .first_survivor(&candidates, auction, ctx)
            .or_else(|| {
                if !self.binary_fallback {
                    return None;
                }
                let legacy =
                    interpreter::evaluate(&self.store, &features, auction, MatchMode::Binary);
                self.first_survivor(&legacy, auction, ctx)
            });

        let Some((call, candidate)) = survivor else {
            if ctx.pass_allowed(auction) {
                return Ok((
                    Call::Pass,
                    "No bid fits this hand; passing for now.".to_string(),
                ));
            }
            return Err(EngineError::NoLegalCall {
                explanation: format!(
                    "no candidate satisfies the auction and the partnership is {}",
                    ctx.forcing()
                ),
            });
        };

        // Advisory oracle review: a veto or rewrite is accepted only if
        // still legal, and an oracle failure leaves the bid unchanged.
        let (final_call, final_explanation) = match self.oracle.review(
            call,
            &candidate.explanation,
            hand,
            auction,
            &features,
        ) {
            Ok((reviewed, explanation)) if reviewed == call || auction.would_be_legal(&reviewed) => {
                (reviewed, explanation)
            }
            Ok((reviewed, _)) => {
                warn!(proposed = %call, reviewed = %reviewed, "oracle rewrite is illegal; keeping proposal");
                (call, candidate.explanation.clone())
            }
            Err(err) => {
                warn!(error = %err, "oracle review failed; keeping proposal");
                (call, candidate.explanation.clone())
            }
        };

        ctx.record(candidate.forcing, auction.calls.len());
        Ok((final_call, final_explanation))
    }

    /// Ranked candidates for audit and debugging; no filtering applied.
    pub fn get_bid_candidates(
        &self,
        hand: &Hand,
        auction: &Auction,
        vulnerability: Vulnerability,
    ) -> Vec<BidCandidate> {
        let features = FeatureVector::extract(hand, auction, vulnerability);
        interpreter::evaluate(&self.store, &features, auction, MatchMode::Soft)
    }

    /// Compare the user's call against the engine's choice, surfacing the
    /// specific unmet constraint and the Governor's independent verdict.
    pub fn evaluate_user_bid(
        &self,
        hand: &Hand,
        user_call: Call,
        auction: &Auction,
        vulnerability: Vulnerability,
        ctx: &DealContext,
    ) -> Result<UserBidFeedback, EngineError> {
        let features = FeatureVector::extract(hand, auction, vulnerability);
        let (engine_call, engine_explanation) =
            self.get_next_bid(hand, auction, vulnerability, &mut ctx.clone())?;
        let engine_rule = interpreter::best_match_for_call(
            &self.store,
            &features,
            auction,
            &engine_call,
        )
        .map(|(rule_id, _)| rule_id);

        let user_best =
            interpreter::best_match_for_call(&self.store, &features, auction, &user_call);
        let (user_rule, user_match) = match user_best {
            Some((rule_id, result)) => (Some(rule_id), Some(result)),
            None => (None, None),
        };
        let unmet = user_match.as_ref().and_then(|result| {
            if let Some(fail) = &result.hard_fail {
                return Some(fail.reason.clone());
            }
            result
                .penalties
                .iter()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(feature, penalty)| {
                    format!("{} costs {:.0}% of the match quality", feature, penalty * 100.0)
                })
        });

        Ok(UserBidFeedback {
            user_call,
            user_rule,
            user_match,
            unmet,
            engine_call,
            engine_rule,
            engine_explanation,
            governor: safety::validate(hand, &user_call, auction, vulnerability),
        })
    }

    /// Walk candidates in rank order; the first one that survives the
    /// legality and forcing filters wins. Returns the (possibly repaired)
    /// call together with the candidate it came from.
    fn first_survivor(
        &self,
        candidates: &[BidCandidate],
        auction: &Auction,
        ctx: &DealContext,
    ) -> Option<(Call, BidCandidate)> {
        for candidate in candidates {
            // Forcing violations are expected filtering, never errors.
            if candidate.call == Call::Pass && !ctx.pass_allowed(auction) {
                debug!(rule = candidate.rule_id.as_str(), "pass violates forcing obligations");
                continue;
            }
            match repair_call(&candidate.call, auction) {
                Some(call) => return Some((call, candidate.clone())),
                None => {
                    debug!(rule = candidate.rule_id.as_str(), call = %candidate.call, "candidate not legal and not repairable");
                }
            }
        }
        None
    }
}

/// Keep a legal call as-is; raise an illegal bid to the next legal level in
/// the same strain, within the escalation cap. An unrepairable candidate
/// is discarded by returning None.
fn repair_call(call: &Call, auction: &Auction) -> Option<Call> {
    if auction.would_be_legal(call) {
        return Some(*call);
    }
    let Call::Bid { level, strain } = call else {
        return None;
    };
    let repaired = auction.minimum_bid_in(*strain)?;
    let repaired_level = repaired.level()?;
    if repaired_level.saturating_sub(*level) > MAX_REPAIR_ESCALATION {
        return None;
    }
    Some(repaired)
}
