//! The external-oracle review hook. The simulation behind it (double-dummy
//! or Monte Carlo) lives outside this crate; only the call surface crosses
//! the boundary, and the default implementation is a no-op pass-through.

use crate::features::FeatureVector;
use coach_core::{Auction, Call, Hand};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("oracle review failed: {0}")]
pub struct OracleError(pub String);

/// Advisory review of a proposed bid. Implementations may veto by
/// returning a different call, or adjust the explanation. Errors are
/// swallowed by the caller: the proposed bid stands unmodified.
pub trait OracleReview: Send + Sync {
    fn review(
        &self,
        proposed: Call,
        explanation: &str,
        hand: &Hand,
        auction: &Auction,
        features: &FeatureVector,
    ) -> Result<(Call, String), OracleError>;
}

/// The default oracle: agrees with everything.
#[derive(Debug, Default)]
pub struct PassThrough;

impl OracleReview for PassThrough {
    fn review(
        &self,
        proposed: Call,
        explanation: &str,
        _hand: &Hand,
        _auction: &Auction,
        _features: &FeatureVector,
    ) -> Result<(Call, String), OracleError> {
        Ok((proposed, explanation.to_string()))
    }
}
