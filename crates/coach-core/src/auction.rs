use crate::board::{Partnership, Position};
use crate::call::Call;
use crate::strain::Strain;
use serde::{Deserialize, Serialize};

/// An in-progress (or finished) auction: a dealer seat and the calls made
/// so far, in rotation from the dealer. An empty auction is valid.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Auction {
    pub dealer: Position,
    pub calls: Vec<Call>,
}

impl Auction {
    pub fn new(dealer: Position) -> Self {
        Self {
            dealer,
            calls: Vec::new(),
        }
    }

    /// Iterate calls paired with the seat that made them.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Call)> {
        let mut p = self.dealer;
        self.calls.iter().map(move |call| {
            let pos = p;
            p = p.next();
            (pos, call)
        })
    }

    pub fn add_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    /// Parse and add a single call like "1C", "P", or "X".
    /// Panics on invalid input — use for tests and known-good data only.
    pub fn bid(&mut self, s: &str) {
        self.add_call(s.parse().expect("invalid call"));
    }

    /// Parse and add space-separated calls like "P 1C P".
    /// Panics on invalid input — use for tests and known-good data only.
    pub fn bids(&mut self, s: &str) {
        for token in s.split_whitespace() {
            self.bid(token);
        }
    }

    /// Build an auction from space-separated calls like "P 1C P 2C".
    /// Panics on invalid input — use for tests and known-good data only.
    pub fn bidding(dealer: Position, calls: &str) -> Self {
        let mut auction = Self::new(dealer);
        auction.bids(calls);
        auction
    }

    pub fn current_player(&self) -> Position {
        let mut p = self.dealer;
        for _ in 0..self.calls.len() {
            p = p.next();
        }
        p
    }

    pub fn current_partnership(&self) -> Partnership {
        self.current_player().partnership()
    }

    /// 1-based seat number of the player on lead now: the dealer is seat 1.
    pub fn current_seat_number(&self) -> u8 {
        (self.calls.len() % 4) as u8 + 1
    }

    /// The seat a given call index belongs to.
    pub fn position_at(&self, index: usize) -> Position {
        let mut p = self.dealer;
        for _ in 0..index {
            p = p.next();
        }
        p
    }

    pub fn is_finished(&self) -> bool {
        Self::is_finished_at(&self.calls, self.calls.len())
    }

    /// True once anyone has made a contract bid.
    pub fn is_open(&self) -> bool {
        self.calls.iter().any(Call::is_bid)
    }

    /// The first seat to make a contract bid, if any.
    pub fn opener(&self) -> Option<Position> {
        self.iter()
            .find(|(_, call)| call.is_bid())
            .map(|(position, _)| position)
    }

    /// The opening call itself, if any.
    pub fn opening_call(&self) -> Option<Call> {
        self.calls.iter().find(|c| c.is_bid()).copied()
    }

    /// The last contract bid (not pass/double/redouble) and who made it.
    pub fn last_bid(&self) -> Option<(Position, Call)> {
        self.iter()
            .filter(|(_, call)| call.is_bid())
            .last()
            .map(|(pos, call)| (pos, *call))
    }

    /// The lowest legal bid in the given strain, or None if no level would
    /// be legal (auction finished or already at the 7-level in a higher
    /// strain).
    pub fn minimum_bid_in(&self, strain: Strain) -> Option<Call> {
        if self.is_finished() {
            return None;
        }
        let Some((_, last)) = self.last_bid() else {
            return Some(Call::bid(1, strain));
        };
        let (last_level, last_strain) = match last {
            Call::Bid { level, strain } => (level, strain),
            _ => unreachable!("last_bid returned non-bid"),
        };
        let min_level = if strain > last_strain {
            last_level
        } else {
            last_level + 1
        };
        (min_level <= 7).then(|| Call::bid(min_level, strain))
    }

    /// True if the bid skips at least one level over the cheapest legal bid
    /// in its strain.
    pub fn is_jump(&self, call: &Call) -> bool {
        let Call::Bid { level, strain } = call else {
            return false;
        };
        match self.minimum_bid_in(*strain) {
            Some(Call::Bid { level: min, .. }) => *level > min,
            _ => false,
        }
    }

    /// True if an opponent of `partnership` has made a contract bid at an
    /// index strictly greater than `since`. This is the competitiveness
    /// test that releases forcing obligations: a force binds only across an
    /// uninterrupted partnership sequence.
    pub fn competitive_since(&self, since: usize, partnership: Partnership) -> bool {
        self.iter()
            .skip(since + 1)
            .any(|(pos, call)| call.is_bid() && !partnership.contains(pos))
    }

    /// True if both partnerships have made contract bids.
    pub fn is_contested(&self) -> bool {
        let mut ns = false;
        let mut ew = false;
        for (pos, call) in self.iter() {
            if call.is_bid() {
                match pos.partnership() {
                    Partnership::NS => ns = true,
                    Partnership::EW => ew = true,
                }
            }
        }
        ns && ew
    }

    pub fn player_has_acted(&self, player: Position) -> bool {
        self.iter()
            .any(|(pos, call)| pos == player && !matches!(call, Call::Pass))
    }

    /// True if the player has made a contract bid (doubles don't count).
    pub fn player_has_bid(&self, player: Position) -> bool {
        self.iter().any(|(pos, call)| pos == player && call.is_bid())
    }

    pub fn partnership_has_bid(&self, partnership: Partnership) -> bool {
        self.iter()
            .any(|(pos, call)| partnership.contains(pos) && call.is_bid())
    }

    pub fn is_valid(&self) -> bool {
        Self::validate_calls(&self.calls)
    }

    /// Validate a call sequence: bids strictly climb, doubles hit an
    /// opponent's live bid, redoubles hit an opponent's double, nothing
    /// follows three closing passes.
    pub fn validate_calls(calls: &[Call]) -> bool {
        let mut last_bid: Option<Call> = None;
        let mut last_bid_index = None;
        let mut last_double_index = None;
        let mut is_redoubled = false;

        for (i, call) in calls.iter().enumerate() {
            if i > 0 && Self::is_finished_at(calls, i) {
                return false;
            }
            match call {
                Call::Pass => {}
                Call::Bid { level, .. } => {
                    if !(1..=7).contains(level) {
                        return false;
                    }
                    if let Some(prev) = last_bid {
                        if !call.outbids(&prev) {
                            return false;
                        }
                    }
                    last_bid = Some(*call);
                    last_bid_index = Some(i);
                    last_double_index = None;
                    is_redoubled = false;
                }
                Call::Double => {
                    let Some(bi) = last_bid_index else {
                        return false;
                    };
                    if last_double_index.is_some() || is_redoubled {
                        return false;
                    }
                    // The last bid must belong to the other side.
                    if (i - bi) % 2 == 0 {
                        return false;
                    }
                    last_double_index = Some(i);
                }
                Call::Redouble => {
                    let Some(di) = last_double_index else {
                        return false;
                    };
                    if (i - di) % 2 == 0 {
                        return false;
                    }
                    is_redoubled = true;
                    last_double_index = None;
                }
            }
        }
        true
    }

    /// All calls that would be legal next.
    pub fn legal_calls(&self) -> Vec<Call> {
        if self.is_finished() {
            return Vec::new();
        }
        let mut result = vec![Call::Pass];
        for level in 1..=7u8 {
            for &strain in &Strain::ALL {
                let call = Call::bid(level, strain);
                if self.would_be_legal(&call) {
                    result.push(call);
                }
            }
        }
        for call in [Call::Double, Call::Redouble] {
            if self.would_be_legal(&call) {
                result.push(call);
            }
        }
        result
    }

    /// Check one candidate call without materializing every legal call.
    pub fn would_be_legal(&self, call: &Call) -> bool {
        if self.is_finished() {
            return false;
        }
        let mut test = self.calls.clone();
        test.push(*call);
        Self::validate_calls(&test)
    }

    fn is_finished_at(calls: &[Call], len: usize) -> bool {
        if len < 4 {
            return false;
        }
        let prefix = &calls[..len];
        if prefix.iter().all(|c| matches!(c, Call::Pass)) {
            return true;
        }
        prefix[len - 3..].iter().all(|c| matches!(c, Call::Pass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished() {
        let mut auction = Auction::bidding(Position::North, "1S P P");
        assert!(!auction.is_finished());
        auction.bid("P");
        assert!(auction.is_finished());
    }

    #[test]
    fn test_passed_out() {
        let auction = Auction::bidding(Position::North, "P P P P");
        assert!(auction.is_finished());
        assert!(auction.legal_calls().is_empty());
    }

    #[test]
    fn test_opener() {
        let mut auction = Auction::new(Position::North);
        assert_eq!(auction.opener(), None);
        auction.bids("P 1C");
        assert_eq!(auction.opener(), Some(Position::East));
        assert_eq!(
            auction.opening_call(),
            Some(Call::bid(1, Strain::Clubs))
        );
    }

    #[test]
    fn test_current_player_and_seat() {
        let mut auction = Auction::new(Position::South);
        assert_eq!(auction.current_player(), Position::South);
        assert_eq!(auction.current_seat_number(), 1);
        auction.bid("P");
        assert_eq!(auction.current_player(), Position::West);
        assert_eq!(auction.current_seat_number(), 2);
        auction.bids("P P P");
        assert_eq!(auction.current_seat_number(), 1);
    }

    #[test]
    fn test_minimum_bid_in() {
        let mut auction = Auction::new(Position::North);
        assert_eq!(
            auction.minimum_bid_in(Strain::Clubs),
            Some(Call::bid(1, Strain::Clubs))
        );
        auction.bid("1D");
        assert_eq!(
            auction.minimum_bid_in(Strain::Clubs),
            Some(Call::bid(2, Strain::Clubs))
        );
        assert_eq!(
            auction.minimum_bid_in(Strain::Hearts),
            Some(Call::bid(1, Strain::Hearts))
        );
        assert_eq!(
            auction.minimum_bid_in(Strain::Diamonds),
            Some(Call::bid(2, Strain::Diamonds))
        );
    }

    #[test]
    fn test_minimum_bid_capped_at_seven() {
        let auction = Auction::bidding(Position::North, "7N");
        assert_eq!(auction.minimum_bid_in(Strain::Spades), None);
    }

    #[test]
    fn test_is_jump() {
        let auction = Auction::bidding(Position::North, "1C");
        // Over 1C, 1H is cheapest in hearts — not a jump; 2H is.
        assert!(!auction.is_jump(&Call::bid(1, Strain::Hearts)));
        assert!(auction.is_jump(&Call::bid(2, Strain::Hearts)));
        // Over 1S, 2H is cheapest in hearts — not a jump.
        let auction = Auction::bidding(Position::North, "1S");
        assert!(!auction.is_jump(&Call::bid(2, Strain::Hearts)));
        assert!(!auction.is_jump(&Call::Pass));
    }

    #[test]
    fn test_validate_bid_order() {
        assert!(Auction::bidding(Position::North, "1C P 1D P P P").is_valid());
        let calls = vec![
            Call::bid(1, Strain::Diamonds),
            Call::bid(1, Strain::Clubs),
        ];
        assert!(!Auction::validate_calls(&calls));
    }

    #[test]
    fn test_validate_double_rules() {
        assert!(Auction::bidding(Position::North, "1C X").is_valid());
        assert!(Auction::bidding(Position::North, "1C X XX").is_valid());
        // Doubling partner's bid is illegal.
        let calls = vec![Call::bid(1, Strain::Clubs), Call::Pass, Call::Double];
        assert!(!Auction::validate_calls(&calls));
        // Redoubling partner's double is illegal.
        let calls = vec![
            Call::bid(1, Strain::Clubs),
            Call::Double,
            Call::Pass,
            Call::Redouble,
        ];
        assert!(!Auction::validate_calls(&calls));
    }

    #[test]
    fn test_validate_nothing_after_finish() {
        let calls = vec![
            Call::Pass,
            Call::Pass,
            Call::Pass,
            Call::Pass,
            Call::bid(1, Strain::Clubs),
        ];
        assert!(!Auction::validate_calls(&calls));
    }

    #[test]
    fn test_legal_calls_empty_auction() {
        let auction = Auction::new(Position::North);
        let calls = auction.legal_calls();
        // Pass + 35 bids, no double available.
        assert_eq!(calls.len(), 36);
        assert!(!calls.contains(&Call::Double));
    }

    #[test]
    fn test_legal_calls_after_bid() {
        let auction = Auction::bidding(Position::North, "1H");
        let calls = auction.legal_calls();
        assert!(calls.contains(&Call::Pass));
        assert!(calls.contains(&Call::Double));
        assert!(!calls.contains(&Call::bid(1, Strain::Clubs)));
        assert!(calls.contains(&Call::bid(1, Strain::Spades)));
    }

    #[test]
    fn test_competitive_since() {
        // N:1C E:P S:1S W:2D — for NS, West's 2D at index 3 is competition
        // after index 2, but nothing intervened after index 3.
        let auction = Auction::bidding(Position::North, "1C P 1S 2D");
        assert!(auction.competitive_since(2, Partnership::NS));
        assert!(!auction.competitive_since(3, Partnership::NS));
        // An opponent pass is not competition.
        let quiet = Auction::bidding(Position::North, "1C P 1S P");
        assert!(!quiet.competitive_since(2, Partnership::NS));
    }

    #[test]
    fn test_is_contested() {
        assert!(!Auction::bidding(Position::North, "1C P 1S").is_contested());
        assert!(Auction::bidding(Position::North, "1C 1H").is_contested());
        // A double alone does not contest the auction.
        assert!(!Auction::bidding(Position::North, "1C X").is_contested());
    }

    #[test]
    fn test_player_and_partnership_activity() {
        let auction = Auction::bidding(Position::North, "1C X");
        assert!(auction.player_has_acted(Position::North));
        assert!(auction.player_has_acted(Position::East));
        assert!(auction.partnership_has_bid(Partnership::NS));
        assert!(!auction.partnership_has_bid(Partnership::EW));
    }

    #[test]
    fn test_position_at() {
        let auction = Auction::bidding(Position::East, "P P P");
        assert_eq!(auction.position_at(0), Position::East);
        assert_eq!(auction.position_at(3), Position::East);
    }
}
