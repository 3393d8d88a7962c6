//! The bidding-decision core: rule schemas, soft matching, forcing
//! obligations, the safety Governor, the partnership belief model, and the
//! orchestrator that ties them together for one bid decision at a time.

pub mod features;
pub mod forcing;
pub mod interpreter;
pub mod matcher;
pub mod model;
pub mod oracle;
pub mod orchestrator;
pub mod safety;
pub mod schema;

pub use features::{FeatureKey, FeatureValue, FeatureVector};
pub use forcing::{DealContext, ForcingDirective, ForcingLevel};
pub use interpreter::{BidCandidate, MatchMode};
pub use matcher::MatchResult;
pub use model::{BiddingState, SeatBelief};
pub use oracle::{OracleReview, PassThrough};
pub use orchestrator::{EngineError, Orchestrator, UserBidFeedback};
pub use safety::Verdict;
pub use schema::{SchemaError, SchemaStore};

use coach_core::Call;

/// Parse a comma- or space-separated call string (e.g. "1C,P,1D" or
/// "1C P 1D") into calls, skipping tokens that do not parse.
pub fn parse_calls(calls: &str) -> Vec<Call> {
    calls
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<Call>().ok())
        .collect()
}
