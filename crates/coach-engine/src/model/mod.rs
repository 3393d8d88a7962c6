//! Partnership Belief Model: replay an auction and maintain, per seat,
//! monotonically narrowing HCP and suit-length ranges plus convention tags.
//!
//! `BiddingState::build` is a pure function of `(auction, dealer)`: no
//! state survives between calls, so it is trivially safe to invoke
//! concurrently for different auctions, and rebuilding the same auction
//! yields a structurally identical state.

mod conventions;
pub mod tables;

use crate::forcing::ForcingLevel;
use coach_core::{Auction, Call, Narrowing, Partnership, Position, Range, Suit};
use conventions::ConventionContext;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tables::{classify_rebid, classify_response, BeliefDelta};
use tracing::{debug, warn};

/// What the auction has proven and denied about one seat's hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatBelief {
    pub seat: Position,
    pub hcp: Range<u8>,
    suit_lengths: [Range<u8>; 4],
    /// Set once the seat has shown a narrow, non-forcing hand.
    pub limited: bool,
    /// Append-only idempotent labels used as later inference triggers.
    pub tags: BTreeSet<String>,
}

impl SeatBelief {
    fn new(seat: Position) -> Self {
        Self {
            seat,
            hcp: Range::any_hcp(),
            suit_lengths: [Range::any_length(); 4],
            limited: false,
            tags: BTreeSet::new(),
        }
    }

    pub fn suit_length(&self, suit: Suit) -> Range<u8> {
        self.suit_lengths[suit.idx()]
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn tag(&mut self, tag: &str) {
        self.tags.insert(tag.to_string());
    }

    /// Apply a delta. Narrowing only ever intersects; a contradiction is
    /// clamped, logged, and recorded as a `contradicted` tag so consumers
    /// can see the belief became suspect.
    fn apply(&mut self, delta: &BeliefDelta, call: &Call) {
        let mut contradicted = false;
        contradicted |= self.hcp.narrow(delta.hcp_min, delta.hcp_max) == Narrowing::Contradicted;
        for (suit, len) in &delta.suit_min {
            contradicted |= self.suit_lengths[suit.idx()].narrow(Some(*len), None)
                == Narrowing::Contradicted;
        }
        for (suit, len) in &delta.suit_max {
            contradicted |= self.suit_lengths[suit.idx()].narrow(None, Some(*len))
                == Narrowing::Contradicted;
        }
        if delta.balanced {
            for suit in Suit::ALL {
                contradicted |= self.suit_lengths[suit.idx()].narrow(Some(2), Some(5))
                    == Narrowing::Contradicted;
            }
        }
        if delta.limited {
            self.limited = true;
        }
        for tag in &delta.tags {
            self.tag(tag);
        }
        if contradicted {
            warn!(seat = %self.seat, call = %call, "belief narrowing contradicted; clamped");
            self.tag("contradicted");
        }
    }
}

impl fmt::Display for SeatBelief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let unconstrained = Range::any_hcp();
        if self.hcp == unconstrained {
            parts.push("? hcp".to_string());
        } else {
            parts.push(format!("{} hcp", self.hcp));
        }
        let mut suit_parts = Vec::new();
        for suit in Suit::ALL {
            let range = self.suit_length(suit);
            if range == Range::any_length() {
                continue;
            }
            if range.min > 0 && range.max == 13 {
                suit_parts.push(format!("{}+{}", range.min, suit.symbol()));
            } else {
                suit_parts.push(format!("{}{}", range, suit.symbol()));
            }
        }
        if !suit_parts.is_empty() {
            parts.push(suit_parts.join(" "));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// The replayed view of a whole auction: four seat beliefs plus per-side
/// agreed suit and forcing level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiddingState {
    pub dealer: Position,
    beliefs: [SeatBelief; 4],
    agreed_suit: [Option<Suit>; 2],
    forcing: [ForcingLevel; 2],
}

impl BiddingState {
    pub fn belief(&self, seat: Position) -> &SeatBelief {
        &self.beliefs[seat.idx()]
    }

    pub fn agreed_suit(&self, partnership: Partnership) -> Option<Suit> {
        self.agreed_suit[partnership.idx()]
    }

    pub fn forcing(&self, partnership: Partnership) -> ForcingLevel {
        self.forcing[partnership.idx()]
    }

    /// Full replay of the auction, bid by bid.
    pub fn build(auction: &Auction) -> Self {
        let mut state = Self {
            dealer: auction.dealer,
            beliefs: [
                SeatBelief::new(Position::North),
                SeatBelief::new(Position::East),
                SeatBelief::new(Position::South),
                SeatBelief::new(Position::West),
            ],
            agreed_suit: [None; 2],
            forcing: [ForcingLevel::NonForcing; 2],
        };

        let mut replay = Auction::new(auction.dealer);
        let mut opener: Option<(Position, Call)> = None;

        for (seat, call) in auction.iter() {
            state.interpret(seat, call, &replay, &opener);
            if opener.is_none() && call.is_bid() {
                opener = Some((seat, *call));
            }
            replay.add_call(*call);
        }
        state
    }

    fn escalate(&mut self, partnership: Partnership, level: Option<ForcingLevel>) {
        if let Some(level) = level {
            let current = &mut self.forcing[partnership.idx()];
            if level > *current {
                *current = level;
            }
        }
    }

    /// Interpret one call against the auction so far (`replay` does not yet
    /// include `call`).
    fn interpret(
        &mut self,
        seat: Position,
        call: &Call,
        replay: &Auction,
        opener: &Option<(Position, Call)>,
    ) {
        let partnership = seat.partnership();

        match call {
            Call::Pass => self.interpret_pass(seat, replay, opener),
            Call::Double => self.interpret_double(seat, replay, opener),
            Call::Redouble => {}
            Call::Bid { .. } => {
                // Conventions override every generic classification.
                let detected = {
                    let ctx = ConventionContext {
                        bidder: self.belief(seat),
                        partner: self.belief(seat.partner()),
                        agreed_suit: self.agreed_suit(partnership),
                        forcing: self.forcing(partnership),
                    };
                    conventions::detect(&ctx, call)
                };
                if let Some(convention) = detected {
                    debug!(seat = %seat, call = %call, name = convention.name, "convention recognized");
                    let delta = convention.meaning.combined();
                    self.beliefs[seat.idx()].apply(&delta, call);
                    self.escalate(partnership, convention.meaning.forcing);
                    return;
                }

                match opener {
                    None => self.interpret_opening(seat, call),
                    Some((op_seat, op_call)) => {
                        if partnership == op_seat.partnership() {
                            if seat == *op_seat {
                                self.interpret_rebid(seat, call, op_call, replay);
                            } else {
                                self.interpret_response(seat, call, op_call, replay);
                            }
                        } else {
                            self.interpret_overcall(seat, call, replay);
                        }
                    }
                }
            }
        }
    }

    fn interpret_opening(&mut self, seat: Position, call: &Call) {
        if let Some(meaning) = tables::opening_meaning(call) {
            let delta = meaning.combined();
            self.beliefs[seat.idx()].apply(&delta, call);
            self.escalate(seat.partnership(), meaning.forcing);
        }
    }

    fn interpret_response(
        &mut self,
        seat: Position,
        call: &Call,
        opening: &Call,
        replay: &Auction,
    ) {
        // Only the responder's first bid carries the response grid; later
        // bids are either conventions (handled above) or too contextual to
        // pin down here.
        if replay.player_has_bid(seat) {
            return;
        }
        let Some(shape) = classify_response(opening, call, replay) else {
            return;
        };
        let meaning = tables::response_meaning(shape, opening.suit(), call);
        let delta = meaning.combined();
        self.beliefs[seat.idx()].apply(&delta, call);
        self.escalate(seat.partnership(), meaning.forcing);
        if matches!(
            shape,
            tables::ResponseShape::SimpleRaise | tables::ResponseShape::JumpRaise
        ) {
            if let Some(suit) = opening.suit() {
                self.agreed_suit[seat.partnership().idx()] = Some(suit);
            }
        }
    }

    fn interpret_rebid(&mut self, seat: Position, call: &Call, opening: &Call, replay: &Auction) {
        // Second bid only; deeper rebids are out of classification reach.
        if replay
            .iter()
            .filter(|(pos, c)| *pos == seat && c.is_bid())
            .count()
            != 1
        {
            return;
        }
        let partner_suit = replay
            .iter()
            .filter(|(pos, _)| *pos == seat.partner())
            .find_map(|(_, c)| c.suit());
        let Some(shape) = classify_rebid(opening, call, partner_suit, replay) else {
            return;
        };
        let meaning = tables::rebid_meaning(shape, opening, call);
        let delta = meaning.combined();
        self.beliefs[seat.idx()].apply(&delta, call);
        self.escalate(seat.partnership(), meaning.forcing);
        if shape == tables::RebidShape::RaisePartner {
            if let Some(suit) = call.suit() {
                self.agreed_suit[seat.partnership().idx()] = Some(suit);
            }
        }
    }

    fn interpret_overcall(&mut self, seat: Position, call: &Call, replay: &Auction) {
        // Only the side's first action gets the overcall grid.
        if replay.partnership_has_bid(seat.partnership()) {
            return;
        }
        if let Some(meaning) = tables::overcall_meaning(call, replay) {
            let delta = meaning.combined();
            self.beliefs[seat.idx()].apply(&delta, call);
        }
    }

    fn interpret_pass(
        &mut self,
        seat: Position,
        replay: &Auction,
        opener: &Option<(Position, Call)>,
    ) {
        match opener {
            // A pass before anyone has opened limits the hand by seat:
            // 1st/2nd seat would open with 12; 3rd/4th can be a bit heavier
            // (light-opening inference works in reverse).
            None => {
                let seat_number = replay.current_seat_number();
                let ceiling = if seat_number <= 2 { 11 } else { 13 };
                let delta = BeliefDelta::hcp_ceiling(ceiling).limited();
                self.beliefs[seat.idx()].apply(&delta, &Call::Pass);
            }
            Some((op_seat, _)) => {
                // A responder's first pass over partner's opening is weak —
                // unless an opponent intervened, where a trap pass with up
                // to 8 is plausible.
                if *op_seat == seat.partner() && !replay.player_has_acted(seat) {
                    let contested = replay.is_contested();
                    let ceiling = if contested { 8 } else { 5 };
                    let delta = BeliefDelta::hcp_ceiling(ceiling).limited();
                    self.beliefs[seat.idx()].apply(&delta, &Call::Pass);
                }
            }
        }
    }

    fn interpret_double(
        &mut self,
        seat: Position,
        replay: &Auction,
        opener: &Option<(Position, Call)>,
    ) {
        let Some((op_seat, op_call)) = opener else {
            return;
        };
        // Takeout shape: the doubling side has not bid yet and the double
        // hits the opening side's suit.
        if op_seat.partnership() != seat.partnership()
            && !replay.partnership_has_bid(seat.partnership())
        {
            let meaning = tables::takeout_double_meaning(op_call.suit());
            let delta = meaning.combined();
            self.beliefs[seat.idx()].apply(&delta, &Call::Double);
        }
    }
}
