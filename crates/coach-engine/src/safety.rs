//! The Governor: an independent hard-floor audit of bid soundness.
//!
//! This module never selects or rewrites a bid. It answers one question —
//! is this call sound for this hand in this context — and is callable
//! standalone against any (hand, call, auction, vulnerability) triple. Its
//! floors are independent of the schema's quality score: a rule may fuzzily
//! match while the Governor still flags the action as unsound.

use coach_core::{Auction, Call, Hand, Suit, Vulnerability};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub valid: bool,
    /// The floor table that decided the verdict.
    pub rule: &'static str,
    pub reason: String,
    pub hcp: u8,
    pub required_hcp: u8,
}

impl Verdict {
    fn ok(rule: &'static str, reason: String, hcp: u8, required_hcp: u8) -> Self {
        Self {
            valid: true,
            rule,
            reason,
            hcp,
            required_hcp,
        }
    }

    fn fail(rule: &'static str, reason: String, hcp: u8, required_hcp: u8) -> Self {
        Self {
            valid: false,
            rule,
            reason,
            hcp,
            required_hcp,
        }
    }
}

/// Adjudicate a call's soundness. Pass, Double of partner, and other calls
/// outside the floor tables are always valid.
pub fn validate(
    hand: &Hand,
    call: &Call,
    auction: &Auction,
    vulnerability: Vulnerability,
) -> Verdict {
    let hcp = hand.hcp();
    let seat = auction.current_player();
    let opener = auction.opener();

    match call {
        Call::Double => {
            let they_opened = opener.is_some_and(|o| o.partnership() != seat.partnership());
            let partner_acted = auction.player_has_acted(seat.partner());
            if they_opened && !partner_acted {
                validate_takeout_double(hand, hcp)
            } else {
                Verdict::ok("no_floor", "no floor applies to this double".into(), hcp, 0)
            }
        }
        Call::Bid { level, strain } => {
            if opener.is_none() {
                validate_opening(hand, hcp, *level, strain.to_suit(), seat, vulnerability)
            } else if opener == Some(seat.partner()) && !auction.player_has_acted(seat) {
                validate_response(hand, hcp, *level, strain.to_suit(), auction)
            } else if opener.is_some_and(|o| o.partnership() != seat.partnership())
                && !auction.partnership_has_bid(seat.partnership())
            {
                validate_overcall(hand, hcp, *level, *strain, call, auction)
            } else {
                Verdict::ok("no_floor", "no floor applies here".into(), hcp, 0)
            }
        }
        _ => Verdict::ok("no_floor", "pass and redouble are never audited".into(), hcp, 0),
    }
}

/// Openings: 12+ HCP, or 10-11 with the Rule of 20 (HCP plus the two
/// longest suit lengths reaching 20), the latter denied at unfavorable
/// vulnerability. Weak openings at the 2- and 3-level use the preempt band
/// instead.
fn validate_opening(
    hand: &Hand,
    hcp: u8,
    level: u8,
    suit: Option<Suit>,
    seat: coach_core::Position,
    vulnerability: Vulnerability,
) -> Verdict {
    // Strong, artificial 2C is its own animal.
    if level == 2 && suit == Some(Suit::Clubs) {
        return if hcp >= 22 {
            Verdict::ok("strong_two_clubs", format!("{} HCP meets the 22+ floor", hcp), hcp, 22)
        } else {
            Verdict::fail(
                "strong_two_clubs",
                format!("{} HCP is below the 22 needed for a strong 2C", hcp),
                hcp,
                22,
            )
        };
    }

    // Preemptive openings: weak band plus length.
    if level >= 2 {
        if let Some(suit) = suit {
            let needed_length = if level == 2 { 6 } else { 7 };
            let length = hand.length(suit);
            if !(5..=10).contains(&hcp) {
                return Verdict::fail(
                    "preempt_band",
                    format!("{} HCP is outside the 5-10 preempt band", hcp),
                    hcp,
                    5,
                );
            }
            if length < needed_length {
                return Verdict::fail(
                    "preempt_length",
                    format!(
                        "only {} cards in the suit; a level-{} preempt needs {}",
                        length, level, needed_length
                    ),
                    hcp,
                    5,
                );
            }
            return Verdict::ok(
                "preempt_band",
                format!("{} HCP with a {}-card suit", hcp, length),
                hcp,
                5,
            );
        }
    }

    if hcp >= 12 {
        return Verdict::ok("opening_floor", format!("{} HCP meets the 12+ floor", hcp), hcp, 12);
    }
    if (10..=11).contains(&hcp) && hand.rule_of_twenty() {
        if vulnerability.is_unfavorable_for(seat) {
            return Verdict::fail(
                "rule_of_20",
                "Rule of 20 openings are off at unfavorable vulnerability".into(),
                hcp,
                12,
            );
        }
        return Verdict::ok(
            "rule_of_20",
            format!(
                "{} HCP + {} cards in the two longest suits makes 20",
                hcp,
                hand.two_longest_lengths()
            ),
            hcp,
            10,
        );
    }
    Verdict::fail(
        "opening_floor",
        format!("{} HCP is below an opening bid", hcp),
        hcp,
        12,
    )
}

/// Responses: the Rule of 6 — HCP at least `6 + (level - 1)` — with length
/// compensation: a 6-card suit, or a 4-card raise of partner's suit, each
/// buy one point of relief. The floor never drops below 4.
fn validate_response(
    hand: &Hand,
    hcp: u8,
    level: u8,
    suit: Option<Suit>,
    auction: &Auction,
) -> Verdict {
    let mut required = 6 + level.saturating_sub(1);
    let mut relief = Vec::new();

    if let Some(suit) = suit {
        if hand.length(suit) >= 6 {
            required = required.saturating_sub(1);
            relief.push("a 6-card suit");
        }
        let partner_suit = auction
            .iter()
            .filter(|(pos, _)| *pos == auction.current_player().partner())
            .find_map(|(_, call)| call.suit());
        if partner_suit == Some(suit) && hand.length(suit) >= 4 {
            required = required.saturating_sub(1);
            relief.push("4-card support");
        }
    }
    let required = required.max(4);

    if hcp >= required {
        Verdict::ok(
            "rule_of_6",
            format!("{} HCP meets the level-{} response floor of {}", hcp, level, required),
            hcp,
            required,
        )
    } else {
        let relief_note = if relief.is_empty() {
            String::new()
        } else {
            format!(" (even with {})", relief.join(" and "))
        };
        Verdict::fail(
            "rule_of_6",
            format!(
                "{} HCP is below the {} needed to respond at the {}-level{}",
                hcp, required, level, relief_note
            ),
            hcp,
            required,
        )
    }
}

/// Overcalls. Jumps use the weak (5-10, 6+ cards) or strong (15+) bands;
/// the 11-14 band is rejected outright as awkward. Simple overcalls use
/// level-dependent floors adjusted by suit quality.
fn validate_overcall(
    hand: &Hand,
    hcp: u8,
    level: u8,
    strain: coach_core::Strain,
    call: &Call,
    auction: &Auction,
) -> Verdict {
    let Some(suit) = strain.to_suit() else {
        // Notrump overcall: a strong balanced action.
        return if hcp >= 15 {
            Verdict::ok("notrump_overcall", format!("{} HCP meets the 15+ floor", hcp), hcp, 15)
        } else {
            Verdict::fail(
                "notrump_overcall",
                format!("{} HCP is below the 15 needed for a notrump overcall", hcp),
                hcp,
                15,
            )
        };
    };
    let length = hand.length(suit);

    if auction.is_jump(call) {
        if (5..=10).contains(&hcp) {
            return if length >= 6 {
                Verdict::ok(
                    "weak_jump_overcall",
                    format!("{} HCP with a {}-card suit", hcp, length),
                    hcp,
                    5,
                )
            } else {
                Verdict::fail(
                    "weak_jump_overcall",
                    format!("a weak jump overcall needs 6+ cards, found {}", length),
                    hcp,
                    5,
                )
            };
        }
        if hcp >= 15 {
            return Verdict::ok(
                "strong_jump_overcall",
                format!("{} HCP meets the 15+ floor", hcp),
                hcp,
                15,
            );
        }
        // 11-14: too strong to preempt, too weak to force.
        return Verdict::fail(
            "jump_overcall_band",
            format!("{} HCP is the awkward 11-14 band; jump overcalls are 5-10 or 15+", hcp),
            hcp,
            15,
        );
    }

    let mut required: i16 = if level <= 1 { 8 } else { 10 };
    if level <= 1 && length >= 6 {
        required -= 1;
    }
    if level >= 2 {
        if hand.has_good_suit(suit) {
            required -= 1;
        } else if hand.top_honors(suit, 5) <= 1 {
            required += 2;
        }
    }
    let required = required.max(0) as u8;

    if hcp >= required {
        Verdict::ok(
            "overcall_floor",
            format!("{} HCP meets the level-{} overcall floor of {}", hcp, level, required),
            hcp,
            required,
        )
    } else {
        Verdict::fail(
            "overcall_floor",
            format!(
                "{} HCP is below the {} needed to overcall at the {}-level",
                hcp, required, level
            ),
            hcp,
            required,
        )
    }
}

/// Takeout doubles: 12+ HCP, or 10+ with a two-suited hand carrying nine
/// cards in its two longest suits.
fn validate_takeout_double(hand: &Hand, hcp: u8) -> Verdict {
    if hcp >= 12 {
        return Verdict::ok(
            "takeout_double",
            format!("{} HCP meets the 12+ floor", hcp),
            hcp,
            12,
        );
    }
    if hcp >= 10 && hand.two_longest_lengths() >= 9 {
        return Verdict::ok(
            "takeout_double_shape",
            format!("{} HCP with a 9-card two-suiter", hcp),
            hcp,
            10,
        );
    }
    Verdict::fail(
        "takeout_double",
        format!("{} HCP is below the 12 needed for a takeout double", hcp),
        hcp,
        12,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::{Position, Strain};

    fn empty_auction() -> Auction {
        Auction::new(Position::North)
    }

    #[test]
    fn test_sound_opening() {
        // 14 HCP.
        let hand = Hand::parse("A32.K32.Q32.AJ32");
        let verdict = validate(
            &hand,
            &Call::bid(1, Strain::Spades),
            &empty_auction(),
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "opening_floor");
        assert_eq!(verdict.required_hcp, 12);
    }

    #[test]
    fn test_rule_of_20_boundary() {
        // 11 HCP, 5-4: 11+5+4 = 20 — opens at equal/favorable colours.
        let hand = Hand::parse("32.AJ432.KQ54.J2");
        let verdict = validate(
            &hand,
            &Call::bid(1, Strain::Diamonds),
            &empty_auction(),
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "rule_of_20");

        // The identical shape at 10 HCP makes only 19: rejected.
        let light = Hand::parse("32.AJ432.KQ54.32");
        let verdict = validate(
            &light,
            &Call::bid(1, Strain::Diamonds),
            &empty_auction(),
            Vulnerability::None,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.required_hcp, 12);
    }

    #[test]
    fn test_rule_of_20_denied_at_unfavorable() {
        let hand = Hand::parse("32.AJ432.KQ54.J2");
        // Dealer North is NS; NS vulnerable, EW not: unfavorable.
        let verdict = validate(
            &hand,
            &Call::bid(1, Strain::Diamonds),
            &empty_auction(),
            Vulnerability::NS,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.rule, "rule_of_20");
    }

    #[test]
    fn test_strong_two_clubs() {
        // 27 HCP.
        let hand = Hand::parse("AK2.AK2.AK2.AQ32");
        let verdict = validate(
            &hand,
            &Call::bid(2, Strain::Clubs),
            &empty_auction(),
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "strong_two_clubs");

        let weak = Hand::parse("A32.K32.Q32.AJ32");
        assert!(
            !validate(
                &weak,
                &Call::bid(2, Strain::Clubs),
                &empty_auction(),
                Vulnerability::None
            )
            .valid
        );
    }

    #[test]
    fn test_weak_two_needs_six_cards() {
        // 6 HCP, 6 hearts.
        let hand = Hand::parse("432.32.KQJ432.32");
        let verdict = validate(
            &hand,
            &Call::bid(2, Strain::Hearts),
            &empty_auction(),
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "preempt_band");

        // Only 5 hearts: rejected on length.
        let short = Hand::parse("5432.32.KQJ43.32");
        let verdict = validate(
            &short,
            &Call::bid(2, Strain::Hearts),
            &empty_auction(),
            Vulnerability::None,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.rule, "preempt_length");
    }

    #[test]
    fn test_response_rule_of_6() {
        // Partner (North) opened 1H; East passed; South responds.
        let auction = Auction::bidding(Position::North, "1H P");
        // 6 HCP: a 1-level response is sound.
        let hand = Hand::parse("J32.J32.432.KJ32");
        let verdict = validate(
            &hand,
            &Call::bid(1, Strain::Spades),
            &auction,
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "rule_of_6");
        assert_eq!(verdict.required_hcp, 6);

        // The same hand at the 2-level needs 7.
        let verdict = validate(
            &hand,
            &Call::bid(2, Strain::Clubs),
            &auction,
            Vulnerability::None,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.required_hcp, 7);
    }

    #[test]
    fn test_response_length_compensation() {
        let auction = Auction::bidding(Position::North, "1H P");
        // 6 HCP with 4-card heart support: the 2-level raise floor drops to 6.
        let hand = Hand::parse("J32.432.KJ32.J32");
        assert_eq!(hand.hcp(), 6);
        let verdict = validate(
            &hand,
            &Call::bid(2, Strain::Hearts),
            &auction,
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.required_hcp, 6);
    }

    #[test]
    fn test_one_level_overcall_floor() {
        let auction = Auction::bidding(Position::North, "1D");
        // 8 HCP, 5 spades: sound.
        let hand = Hand::parse("K32.32.T86.KQ752");
        assert_eq!(hand.hcp(), 8);
        let verdict = validate(
            &hand,
            &Call::bid(1, Strain::Spades),
            &auction,
            Vulnerability::None,
        );
        assert!(verdict.valid);

        // 7 HCP with only 5 cards: below the floor.
        let light = Hand::parse("Q32.32.T96.KQ752");
        assert_eq!(light.hcp(), 7);
        assert!(
            !validate(
                &light,
                &Call::bid(1, Strain::Spades),
                &auction,
                Vulnerability::None
            )
            .valid
        );

        // 7 HCP with a 6-card suit: the floor relaxes to 7.
        let long = Hand::parse("Q3.32.T96.KQ7532");
        assert_eq!(long.hcp(), 7);
        assert!(
            validate(
                &long,
                &Call::bid(1, Strain::Spades),
                &auction,
                Vulnerability::None
            )
            .valid
        );
    }

    #[test]
    fn test_two_level_overcall_quality_adjustment() {
        let auction = Auction::bidding(Position::North, "1S");
        // 9 HCP, good 5-card heart suit (KQJ): floor 10-1 = 9 — sound.
        let hand = Hand::parse("432.432.KQJ32.K2");
        assert_eq!(hand.hcp(), 9);
        let verdict = validate(
            &hand,
            &Call::bid(2, Strain::Hearts),
            &auction,
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.required_hcp, 9);

        // 11 HCP but a ragged suit (one top-5 honor): floor 10+2 = 12.
        let ragged = Hand::parse("AQ2.Q2.J8732.Q32");
        assert_eq!(ragged.hcp(), 11);
        let verdict = validate(
            &ragged,
            &Call::bid(2, Strain::Hearts),
            &auction,
            Vulnerability::None,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.required_hcp, 12);
    }

    #[test]
    fn test_jump_overcall_bands() {
        let auction = Auction::bidding(Position::North, "1C");
        // 2H over 1C is a jump. 8 HCP, 6 hearts: weak band.
        let weak = Hand::parse("432.32.KQJ432.32");
        let verdict = validate(
            &weak,
            &Call::bid(2, Strain::Hearts),
            &auction,
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "weak_jump_overcall");

        // 17 HCP: strong band.
        let strong = Hand::parse("A2.K2.KQJ432.A2");
        assert_eq!(strong.hcp(), 17);
        let verdict = validate(
            &strong,
            &Call::bid(2, Strain::Hearts),
            &auction,
            Vulnerability::None,
        );
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "strong_jump_overcall");

        // 12 HCP: the awkward band, rejected.
        let awkward = Hand::parse("A32.32.KQJ432.Q2");
        assert_eq!(awkward.hcp(), 12);
        let verdict = validate(
            &awkward,
            &Call::bid(2, Strain::Hearts),
            &auction,
            Vulnerability::None,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.rule, "jump_overcall_band");
    }

    #[test]
    fn test_takeout_double_floors() {
        let auction = Auction::bidding(Position::North, "1C");
        // 13 HCP: sound.
        let hand = Hand::parse("2.KJ63.AQ54.K854");
        assert!(validate(&hand, &Call::Double, &auction, Vulnerability::None).valid);

        // 10 HCP, 5-4 two-suiter: sound via shape.
        let shapely = Hand::parse("2.AJ432.KQ54.432");
        assert_eq!(shapely.hcp(), 10);
        let verdict = validate(&shapely, &Call::Double, &auction, Vulnerability::None);
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "takeout_double_shape");

        // 10 HCP flat: rejected.
        let flat = Hand::parse("432.AJ43.KQ5.432");
        assert_eq!(flat.hcp(), 10);
        assert!(!validate(&flat, &Call::Double, &auction, Vulnerability::None).valid);
    }

    #[test]
    fn test_no_floor_for_pass() {
        let hand = Hand::parse("432.432.432.5432");
        let verdict = validate(&hand, &Call::Pass, &empty_auction(), Vulnerability::None);
        assert!(verdict.valid);
        assert_eq!(verdict.rule, "no_floor");
    }

    #[test]
    fn test_standalone_arbitrary_context() {
        // The Governor audits any (hand, call, context) triple, including
        // ones the engine itself would never propose.
        let hand = Hand::parse("432.432.432.5432");
        let verdict = validate(
            &hand,
            &Call::bid(7, Strain::NoTrump),
            &empty_auction(),
            Vulnerability::Both,
        );
        assert!(!verdict.valid);
        assert_eq!(verdict.hcp, 0);
    }
}
