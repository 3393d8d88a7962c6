//! Forcing obligations: deal-scoped, escalate-only, and released by
//! opponent interference.

use coach_core::{Auction, Call};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a matched rule asserts about the partnership's obligations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcingDirective {
    NonForcing,
    OneRound,
    GameForce,
}

/// Current obligation level for a partnership within one deal. The derived
/// order is the escalation order; there is no transition back down until a
/// new deal builds a fresh `DealContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum ForcingLevel {
    #[default]
    NonForcing,
    ForcingOneRound,
    GameForce,
}

impl ForcingDirective {
    pub fn level(self) -> ForcingLevel {
        match self {
            ForcingDirective::NonForcing => ForcingLevel::NonForcing,
            ForcingDirective::OneRound => ForcingLevel::ForcingOneRound,
            ForcingDirective::GameForce => ForcingLevel::GameForce,
        }
    }
}

impl fmt::Display for ForcingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForcingLevel::NonForcing => "non-forcing",
            ForcingLevel::ForcingOneRound => "forcing one round",
            ForcingLevel::GameForce => "game force",
        };
        f.write_str(s)
    }
}

/// Per-deal orchestrator state, owned and threaded by the caller. Build one
/// at the start of every deal; never reuse across deals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealContext {
    forcing: ForcingLevel,
    /// Call index at which the current forcing level was established.
    forced_at: Option<usize>,
}

impl DealContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcing(&self) -> ForcingLevel {
        self.forcing
    }

    /// Apply an accepted candidate's directive. Escalation only: a
    /// directive below the current level leaves it untouched.
    pub fn record(&mut self, directive: Option<ForcingDirective>, call_index: usize) {
        let Some(directive) = directive else {
            return;
        };
        let level = directive.level();
        if level > self.forcing {
            self.forcing = level;
            self.forced_at = Some(call_index);
        }
    }

    /// Whether the side on turn may legally pass under its obligations.
    ///
    /// The level itself never goes back down within a deal, but an
    /// obligation can be *discharged*: a one-round force once the obligated
    /// hand has had its turn, a game force once the partnership's bidding
    /// has reached game. And a force binds only across an uninterrupted
    /// partnership sequence: an opponent bid after the forcing call
    /// releases it.
    pub fn pass_allowed(&self, auction: &Auction) -> bool {
        if self.forcing == ForcingLevel::NonForcing {
            return true;
        }
        let Some(at) = self.forced_at else {
            // Forced with no recorded origin only happens for contexts
            // deserialized from older snapshots; treat as still bound.
            return false;
        };
        if auction.competitive_since(at, auction.current_partnership()) {
            return true;
        }
        match self.forcing {
            ForcingLevel::NonForcing => true,
            // The forcing call sits at index `at`; partner's one obligated
            // turn is `at + 2`. Past that, the round is complete.
            ForcingLevel::ForcingOneRound => auction.calls.len() > at + 2,
            ForcingLevel::GameForce => auction
                .last_bid()
                .is_some_and(|(pos, call)| {
                    auction.current_partnership().contains(pos) && is_game(&call)
                }),
        }
    }
}

/// A contract at or above game: 3NT, 4H/4S, 5C/5D, or anything higher.
fn is_game(call: &Call) -> bool {
    use coach_core::Strain;
    match call {
        Call::Bid { level, strain } => match strain {
            Strain::NoTrump => *level >= 3,
            Strain::Hearts | Strain::Spades => *level >= 4,
            Strain::Clubs | Strain::Diamonds => *level >= 5,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::Position;

    #[test]
    fn test_record_escalates_only() {
        let mut ctx = DealContext::new();
        assert_eq!(ctx.forcing(), ForcingLevel::NonForcing);

        ctx.record(Some(ForcingDirective::OneRound), 2);
        assert_eq!(ctx.forcing(), ForcingLevel::ForcingOneRound);

        // A later non-forcing directive never downgrades.
        ctx.record(Some(ForcingDirective::NonForcing), 4);
        assert_eq!(ctx.forcing(), ForcingLevel::ForcingOneRound);

        ctx.record(Some(ForcingDirective::GameForce), 6);
        assert_eq!(ctx.forcing(), ForcingLevel::GameForce);

        ctx.record(Some(ForcingDirective::OneRound), 8);
        assert_eq!(ctx.forcing(), ForcingLevel::GameForce);
    }

    #[test]
    fn test_record_none_is_noop() {
        let mut ctx = DealContext::new();
        ctx.record(None, 0);
        assert_eq!(ctx.forcing(), ForcingLevel::NonForcing);
    }

    #[test]
    fn test_pass_allowed_unforced() {
        let ctx = DealContext::new();
        let auction = Auction::bidding(Position::North, "1C P");
        assert!(ctx.pass_allowed(&auction));
    }

    #[test]
    fn test_pass_forbidden_under_uncontested_force() {
        let mut ctx = DealContext::new();
        // N:1C E:P S:1H (forcing) W:P — North may not pass.
        let auction = Auction::bidding(Position::North, "1C P 1H P");
        ctx.record(Some(ForcingDirective::OneRound), 2);
        assert!(!ctx.pass_allowed(&auction));
    }

    #[test]
    fn test_interference_releases_force() {
        let mut ctx = DealContext::new();
        // N:1C E:P S:1H (forcing) W:2D — West's bid releases North.
        let auction = Auction::bidding(Position::North, "1C P 1H 2D");
        ctx.record(Some(ForcingDirective::OneRound), 2);
        assert!(ctx.pass_allowed(&auction));
    }

    #[test]
    fn test_opponent_pass_does_not_release() {
        let mut ctx = DealContext::new();
        let auction = Auction::bidding(Position::North, "1C P 2C P");
        ctx.record(Some(ForcingDirective::GameForce), 2);
        assert!(!ctx.pass_allowed(&auction));
    }

    #[test]
    fn test_one_round_force_discharges_after_partners_turn() {
        let mut ctx = DealContext::new();
        // S's 1H at index 2 forces N, who answers 1S at index 4; when the
        // turn comes back to S (index 6) the round is complete.
        let auction = Auction::bidding(Position::North, "1C P 1H P 1S P");
        ctx.record(Some(ForcingDirective::OneRound), 2);
        assert!(ctx.pass_allowed(&auction));
        // The level itself stays put; only the obligation is discharged.
        assert_eq!(ctx.forcing(), ForcingLevel::ForcingOneRound);
    }

    #[test]
    fn test_game_force_releases_once_game_is_reached() {
        let mut ctx = DealContext::new();
        ctx.record(Some(ForcingDirective::GameForce), 2);
        // Below game: still bound.
        let auction = Auction::bidding(Position::North, "1C P 2C P 3H P");
        assert!(!ctx.pass_allowed(&auction));
        // Our side has bid game: pass is available again.
        let auction = Auction::bidding(Position::North, "1C P 2C P 4H P");
        assert!(ctx.pass_allowed(&auction));
    }
}
