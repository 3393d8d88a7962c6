//! Feature extraction: the read-only snapshot of a hand-in-context that
//! every rule is scored against.

use coach_core::{Auction, Hand, Position, Suit, Vulnerability};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of features a rule may reference. Schema files name these
/// in snake_case; an unrecognized name is a load-time error, never a silent
/// mismatch at match time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Hcp,
    TotalPoints,
    QuickTricksX2,
    ClubLength,
    DiamondLength,
    HeartLength,
    SpadeLength,
    LongestLength,
    LongestSuit,
    Balanced,
    SemiBalanced,
    Seat,
    RuleOfTwenty,
    RuleOfFifteen,
    StopperClubs,
    StopperDiamonds,
    StopperHearts,
    StopperSpades,
    GoodLongestSuit,
    WeOpened,
    TheyOpened,
    PartnerOpened,
    HasActed,
    Contested,
    PartnerSuitLength,
    LongestSuitIsTheirs,
    StopperInTheirSuit,
    LastBidLevel,
    Vulnerable,
}

impl FeatureKey {
    pub fn parse(name: &str) -> Option<Self> {
        serde_yaml::from_str(name).ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            FeatureKey::Hcp => "hcp",
            FeatureKey::TotalPoints => "total_points",
            FeatureKey::QuickTricksX2 => "quick_tricks_x2",
            FeatureKey::ClubLength => "club_length",
            FeatureKey::DiamondLength => "diamond_length",
            FeatureKey::HeartLength => "heart_length",
            FeatureKey::SpadeLength => "spade_length",
            FeatureKey::LongestLength => "longest_length",
            FeatureKey::LongestSuit => "longest_suit",
            FeatureKey::Balanced => "balanced",
            FeatureKey::SemiBalanced => "semi_balanced",
            FeatureKey::Seat => "seat",
            FeatureKey::RuleOfTwenty => "rule_of_twenty",
            FeatureKey::RuleOfFifteen => "rule_of_fifteen",
            FeatureKey::StopperClubs => "stopper_clubs",
            FeatureKey::StopperDiamonds => "stopper_diamonds",
            FeatureKey::StopperHearts => "stopper_hearts",
            FeatureKey::StopperSpades => "stopper_spades",
            FeatureKey::GoodLongestSuit => "good_longest_suit",
            FeatureKey::WeOpened => "we_opened",
            FeatureKey::TheyOpened => "they_opened",
            FeatureKey::PartnerOpened => "partner_opened",
            FeatureKey::HasActed => "has_acted",
            FeatureKey::Contested => "contested",
            FeatureKey::PartnerSuitLength => "partner_suit_length",
            FeatureKey::LongestSuitIsTheirs => "longest_suit_is_theirs",
            FeatureKey::StopperInTheirSuit => "stopper_in_their_suit",
            FeatureKey::LastBidLevel => "last_bid_level",
            FeatureKey::Vulnerable => "vulnerable",
        }
    }

    /// The value type this key always carries; used when decoding schema
    /// scalars against it.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            FeatureKey::Balanced
                | FeatureKey::SemiBalanced
                | FeatureKey::RuleOfTwenty
                | FeatureKey::RuleOfFifteen
                | FeatureKey::StopperClubs
                | FeatureKey::StopperDiamonds
                | FeatureKey::StopperHearts
                | FeatureKey::StopperSpades
                | FeatureKey::GoodLongestSuit
                | FeatureKey::WeOpened
                | FeatureKey::TheyOpened
                | FeatureKey::PartnerOpened
                | FeatureKey::HasActed
                | FeatureKey::Contested
                | FeatureKey::LongestSuitIsTheirs
                | FeatureKey::StopperInTheirSuit
                | FeatureKey::Vulnerable
        )
    }

    pub fn is_suit(self) -> bool {
        matches!(self, FeatureKey::LongestSuit)
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One feature's value. Integers cover counts and points; suits cover the
/// categorical features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i16),
    Bool(bool),
    Suit(Suit),
}

impl FeatureValue {
    pub fn as_int(self) -> Option<i16> {
        match self {
            FeatureValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Bool(v) => write!(f, "{}", v),
            FeatureValue::Suit(s) => write!(f, "{}", s),
        }
    }
}

/// A fully evaluated feature snapshot for one seat at one decision point.
/// Immutable once extracted; every rule in a decision scores against the
/// same vector.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    pub hcp: u8,
    pub total_points: u8,
    pub quick_tricks_x2: u8,
    pub lengths: [u8; 4],
    pub longest_length: u8,
    pub longest_suit: Suit,
    pub balanced: bool,
    pub semi_balanced: bool,
    pub seat: u8,
    pub rule_of_twenty: bool,
    pub rule_of_fifteen: bool,
    pub stoppers: [bool; 4],
    pub good_longest_suit: bool,
    pub we_opened: bool,
    pub they_opened: bool,
    pub partner_opened: bool,
    pub has_acted: bool,
    pub contested: bool,
    pub partner_suit: Option<Suit>,
    pub partner_suit_length: u8,
    /// Their first-bid suit, when the opponents have shown one.
    pub their_suit: Option<Suit>,
    pub longest_suit_is_theirs: bool,
    pub stopper_in_their_suit: bool,
    pub last_bid_level: u8,
    pub vulnerable: bool,
}

impl FeatureVector {
    /// Extract everything the matcher and templates need. `auction` must be
    /// positioned so that its current player is the seat holding `hand`.
    pub fn extract(hand: &Hand, auction: &Auction, vulnerability: Vulnerability) -> Self {
        let seat_pos = auction.current_player();
        let dist = hand.distribution();
        let lengths = [dist.clubs, dist.diamonds, dist.hearts, dist.spades];
        let longest_suit = hand.longest_suit();

        let opener = auction.opener();
        let we_opened = opener.is_some_and(|o| o.partnership() == seat_pos.partnership());
        let they_opened = opener.is_some_and(|o| o.partnership() != seat_pos.partnership());
        let partner_opened = opener == Some(seat_pos.partner());

        let partner_suit = partner_first_suit(auction, seat_pos.partner());
        let partner_suit_length = partner_suit.map_or(0, |s| hand.length(s));
        let their_suit = opponents_first_suit(auction, seat_pos);

        Self {
            hcp: hand.hcp(),
            total_points: hand.total_points(),
            quick_tricks_x2: hand.quick_tricks_x2(),
            lengths,
            longest_length: dist.sorted_lengths()[0],
            longest_suit,
            balanced: hand.is_balanced(),
            semi_balanced: matches!(hand.shape(), coach_core::Shape::SemiBalanced),
            seat: auction.current_seat_number(),
            rule_of_twenty: hand.rule_of_twenty(),
            rule_of_fifteen: hand.rule_of_fifteen(),
            stoppers: [
                hand.has_stopper(Suit::Clubs),
                hand.has_stopper(Suit::Diamonds),
                hand.has_stopper(Suit::Hearts),
                hand.has_stopper(Suit::Spades),
            ],
            good_longest_suit: hand.has_good_suit(longest_suit),
            we_opened,
            they_opened,
            partner_opened,
            has_acted: auction.player_has_acted(seat_pos),
            contested: auction.is_contested(),
            partner_suit,
            partner_suit_length,
            their_suit,
            longest_suit_is_theirs: their_suit == Some(longest_suit),
            stopper_in_their_suit: their_suit.is_some_and(|s| hand.has_stopper(s)),
            last_bid_level: auction.last_bid().and_then(|(_, c)| c.level()).unwrap_or(0),
            vulnerable: vulnerability.is_vulnerable(seat_pos),
        }
    }

    pub fn get(&self, key: FeatureKey) -> FeatureValue {
        match key {
            FeatureKey::Hcp => FeatureValue::Int(self.hcp as i16),
            FeatureKey::TotalPoints => FeatureValue::Int(self.total_points as i16),
            FeatureKey::QuickTricksX2 => FeatureValue::Int(self.quick_tricks_x2 as i16),
            FeatureKey::ClubLength => FeatureValue::Int(self.lengths[0] as i16),
            FeatureKey::DiamondLength => FeatureValue::Int(self.lengths[1] as i16),
            FeatureKey::HeartLength => FeatureValue::Int(self.lengths[2] as i16),
            FeatureKey::SpadeLength => FeatureValue::Int(self.lengths[3] as i16),
            FeatureKey::LongestLength => FeatureValue::Int(self.longest_length as i16),
            FeatureKey::LongestSuit => FeatureValue::Suit(self.longest_suit),
            FeatureKey::Balanced => FeatureValue::Bool(self.balanced),
            FeatureKey::SemiBalanced => FeatureValue::Bool(self.semi_balanced),
            FeatureKey::Seat => FeatureValue::Int(self.seat as i16),
            FeatureKey::RuleOfTwenty => FeatureValue::Bool(self.rule_of_twenty),
            FeatureKey::RuleOfFifteen => FeatureValue::Bool(self.rule_of_fifteen),
            FeatureKey::StopperClubs => FeatureValue::Bool(self.stoppers[0]),
            FeatureKey::StopperDiamonds => FeatureValue::Bool(self.stoppers[1]),
            FeatureKey::StopperHearts => FeatureValue::Bool(self.stoppers[2]),
            FeatureKey::StopperSpades => FeatureValue::Bool(self.stoppers[3]),
            FeatureKey::GoodLongestSuit => FeatureValue::Bool(self.good_longest_suit),
            FeatureKey::WeOpened => FeatureValue::Bool(self.we_opened),
            FeatureKey::TheyOpened => FeatureValue::Bool(self.they_opened),
            FeatureKey::PartnerOpened => FeatureValue::Bool(self.partner_opened),
            FeatureKey::HasActed => FeatureValue::Bool(self.has_acted),
            FeatureKey::Contested => FeatureValue::Bool(self.contested),
            FeatureKey::PartnerSuitLength => FeatureValue::Int(self.partner_suit_length as i16),
            FeatureKey::LongestSuitIsTheirs => FeatureValue::Bool(self.longest_suit_is_theirs),
            FeatureKey::StopperInTheirSuit => FeatureValue::Bool(self.stopper_in_their_suit),
            FeatureKey::LastBidLevel => FeatureValue::Int(self.last_bid_level as i16),
            FeatureKey::Vulnerable => FeatureValue::Bool(self.vulnerable),
        }
    }
}

/// Partner's first genuinely bid suit, if any.
fn partner_first_suit(auction: &Auction, partner: Position) -> Option<Suit> {
    auction
        .iter()
        .filter(|(pos, _)| *pos == partner)
        .find_map(|(_, call)| call.suit())
}

/// The opponents' first genuinely bid suit, if any.
fn opponents_first_suit(auction: &Auction, seat: Position) -> Option<Suit> {
    auction
        .iter()
        .filter(|(pos, _)| pos.partnership() != seat.partnership())
        .find_map(|(_, call)| call.suit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::Position;

    #[test]
    fn test_key_parse_round_trip() {
        for key in [
            FeatureKey::Hcp,
            FeatureKey::LongestSuit,
            FeatureKey::RuleOfTwenty,
            FeatureKey::PartnerSuitLength,
        ] {
            assert_eq!(FeatureKey::parse(key.name()), Some(key));
        }
        assert_eq!(FeatureKey::parse("no_such_feature"), None);
    }

    #[test]
    fn test_extract_hand_intrinsics() {
        // C.D.H.S: 3-2-3-5, 10 HCP, good spades.
        let hand = Hand::parse("AJ4.73.T86.KQ752");
        let auction = Auction::new(Position::North);
        let fv = FeatureVector::extract(&hand, &auction, Vulnerability::None);
        assert_eq!(fv.hcp, 10);
        assert_eq!(fv.lengths, [3, 2, 3, 5]);
        assert_eq!(fv.longest_suit, Suit::Spades);
        assert_eq!(fv.longest_length, 5);
        assert!(fv.good_longest_suit);
        assert!(!fv.we_opened && !fv.they_opened);
        assert_eq!(fv.seat, 1);
    }

    #[test]
    fn test_extract_auction_relationships() {
        let hand = Hand::parse("AJ4.73.T86.KQ752");
        // N opens 1H; it is East's turn: they opened.
        let auction = Auction::bidding(Position::North, "1H");
        let fv = FeatureVector::extract(&hand, &auction, Vulnerability::None);
        assert!(fv.they_opened);
        assert!(!fv.we_opened);
        assert_eq!(fv.last_bid_level, 1);
        assert_eq!(fv.seat, 2);

        // N opens 1H, E passes; South's partner opened.
        let auction = Auction::bidding(Position::North, "1H P");
        let fv = FeatureVector::extract(&hand, &auction, Vulnerability::None);
        assert!(fv.we_opened);
        assert!(fv.partner_opened);
        assert_eq!(fv.partner_suit, Some(Suit::Hearts));
        assert_eq!(fv.partner_suit_length, 3);
    }

    #[test]
    fn test_extract_contested_and_vulnerable() {
        let hand = Hand::parse("AJ4.73.T86.KQ752");
        let auction = Auction::bidding(Position::North, "1H 2C P");
        let fv = FeatureVector::extract(&hand, &auction, Vulnerability::EW);
        assert!(fv.contested);
        // Current player is West (EW vulnerable).
        assert!(fv.vulnerable);
    }

    #[test]
    fn test_get_matches_fields() {
        let hand = Hand::parse("AJ4.73.T86.KQ752");
        let auction = Auction::new(Position::North);
        let fv = FeatureVector::extract(&hand, &auction, Vulnerability::None);
        assert_eq!(fv.get(FeatureKey::Hcp), FeatureValue::Int(10));
        assert_eq!(fv.get(FeatureKey::SpadeLength), FeatureValue::Int(5));
        assert_eq!(
            fv.get(FeatureKey::LongestSuit),
            FeatureValue::Suit(Suit::Spades)
        );
        assert_eq!(fv.get(FeatureKey::Balanced), FeatureValue::Bool(false));
    }
}
