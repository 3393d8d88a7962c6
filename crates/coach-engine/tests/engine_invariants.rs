//! End-to-end checks against the built-in rule set: legality under
//! arbitrary auctions, forcing behavior, convention selection, and a full
//! four-seat auto-auction.

use coach_core::{Auction, Call, Hand, Position, Strain, Vulnerability};
use coach_engine::{BiddingState, DealContext, ForcingDirective, Orchestrator, SchemaStore};

fn engine() -> Orchestrator {
    Orchestrator::new(SchemaStore::builtin())
}

#[test]
fn builtin_opens_one_notrump() {
    let orchestrator = engine();
    // 16 HCP, 4-3-3-3.
    let hand = Hand::parse("A432.KQ4.K54.A32");
    let auction = Auction::new(Position::North);
    let mut ctx = DealContext::new();
    let (call, explanation) = orchestrator
        .get_next_bid(&hand, &auction, Vulnerability::None, &mut ctx)
        .unwrap();
    assert_eq!(call, Call::bid(1, Strain::NoTrump));
    assert!(explanation.contains("16"), "got: {}", explanation);
}

#[test]
fn builtin_uses_stayman_with_a_four_card_major() {
    let orchestrator = engine();
    // 8 HCP with four hearts, responding to partner's 1NT.
    let hand = Hand::parse("432.432.KJ72.A32");
    let auction = Auction::bidding(Position::North, "1N P");
    let mut ctx = DealContext::new();
    let (call, _) = orchestrator
        .get_next_bid(&hand, &auction, Vulnerability::None, &mut ctx)
        .unwrap();
    assert_eq!(call, Call::bid(2, Strain::Clubs));
    // Stayman is forcing for one round.
    assert_eq!(ctx.forcing(), coach_engine::ForcingLevel::ForcingOneRound);
}

#[test]
fn builtin_transfers_with_a_five_card_major() {
    let orchestrator = engine();
    // Weak hand, five spades: transfer beats passing.
    let hand = Hand::parse("432.32.432.KQ752");
    let auction = Auction::bidding(Position::North, "1N P");
    let mut ctx = DealContext::new();
    let (call, _) = orchestrator
        .get_next_bid(&hand, &auction, Vulnerability::None, &mut ctx)
        .unwrap();
    assert_eq!(call, Call::bid(2, Strain::Hearts));
}

#[test]
fn builtin_declines_to_overcall_in_their_suit() {
    let orchestrator = engine();
    // The only long suit is spades — the suit they opened.
    let hand = Hand::parse("43.K64.KT4.QJT43");
    let auction = Auction::bidding(Position::North, "1S");
    let mut ctx = DealContext::new();
    let (call, explanation) = orchestrator
        .get_next_bid(&hand, &auction, Vulnerability::None, &mut ctx)
        .unwrap();
    assert_eq!(call, Call::Pass);
    assert!(!explanation.is_empty());
}

#[test]
fn legality_invariant_across_auctions() {
    let orchestrator = engine();
    let hands = [
        "A432.KQ4.K54.A32",
        "AJ4.73.T86.KQ752",
        "432.32.KQJ432.32",
        "432.432.432.5432",
        "AK2.AK2.AK2.AQ32",
    ];
    let auctions = [
        "",
        "P",
        "1C",
        "1N P",
        "1S 2H",
        "1C P 1H P",
        "3D",
        "1C 1D 1H 1S",
        "2C P",
        "4N P 5C P",
    ];
    for hand_str in hands {
        let hand = Hand::parse(hand_str);
        for auction_str in auctions {
            let auction = Auction::bidding(Position::North, auction_str);
            let mut ctx = DealContext::new();
            if let Ok((call, explanation)) =
                orchestrator.get_next_bid(&hand, &auction, Vulnerability::None, &mut ctx)
            {
                assert!(
                    auction.would_be_legal(&call),
                    "illegal {} for hand {} after '{}'",
                    call,
                    hand_str,
                    auction_str
                );
                assert!(!explanation.is_empty());
            }
        }
    }
}

#[test]
fn forcing_invariant_game_force_never_passes() {
    let orchestrator = engine();
    // A yarborough that would love to pass, but the partnership is in a
    // game force with no interference.
    let hand = Hand::parse("5432.432.432.432");
    let auction = Auction::bidding(Position::North, "2C P");
    let mut ctx = DealContext::new();
    ctx.record(Some(ForcingDirective::GameForce), 0);
    match orchestrator.get_next_bid(&hand, &auction, Vulnerability::None, &mut ctx) {
        Ok((call, _)) => assert_ne!(call, Call::Pass, "passed in an uncontested game force"),
        // A labeled failure is acceptable; a silent pass is not.
        Err(err) => assert!(err.to_string().contains("bidding engine failure")),
    }
}

#[test]
fn auto_auction_terminates_and_stays_valid() {
    let orchestrator = engine();
    let hands = [
        Hand::parse("A432.KQ4.K54.A32"),   // North, 16
        Hand::parse("KQJT.32.J98.T984"),   // East, 7
        Hand::parse("985.AJT98.32.K65"),   // South, 8
        Hand::parse("76.765.AQT76.QJ7"),   // West, 9
    ];
    let mut auction = Auction::new(Position::North);
    // One context per partnership, per the ownership model.
    let mut contexts = [DealContext::new(), DealContext::new()];

    for _ in 0..60 {
        if auction.is_finished() {
            break;
        }
        let seat = auction.current_player();
        let hand = &hands[seat.idx()];
        let ctx = &mut contexts[seat.partnership().idx()];
        let (call, explanation) = orchestrator
            .get_next_bid(hand, &auction, Vulnerability::None, ctx)
            .unwrap_or_else(|err| panic!("engine failure at {}: {}", seat, err));
        assert!(
            auction.would_be_legal(&call),
            "illegal {} from {} in {:?}",
            call,
            seat,
            auction.calls
        );
        assert!(!explanation.is_empty());
        auction.add_call(call);
    }

    assert!(auction.is_finished(), "auction ran away: {:?}", auction.calls);
    assert!(auction.is_valid());
    // The belief model can replay whatever the engine produced; North's
    // 1NT opening pins the range inside 15-17 (later calls may tighten it).
    let state = BiddingState::build(&auction);
    assert!(coach_core::Range::new(15u8, 17).encloses(&state.belief(Position::North).hcp));
}

#[test]
fn evaluate_user_bid_compares_against_engine_choice() {
    let orchestrator = engine();
    // 16 balanced: the engine opens 1NT; the user tries 2NT.
    let hand = Hand::parse("A432.KQ4.K54.A32");
    let auction = Auction::new(Position::North);
    let ctx = DealContext::new();
    let feedback = orchestrator
        .evaluate_user_bid(
            &hand,
            Call::bid(2, Strain::NoTrump),
            &auction,
            Vulnerability::None,
            &ctx,
        )
        .unwrap();
    assert_eq!(feedback.engine_call, Call::bid(1, Strain::NoTrump));
    assert_eq!(feedback.user_rule.as_deref(), Some("open_2nt"));
    // 16 HCP against a 20-21 bid: the unmet constraint is strength.
    let unmet = feedback.unmet.expect("expected an unmet constraint");
    assert!(unmet.contains("hcp"), "got: {}", unmet);
    assert!(feedback.governor.valid);
}

#[test]
fn beliefs_follow_the_auto_bid_stayman_auction() {
    // Drive the engine through a Stayman start and check the belief model
    // reads the auction the same way.
    let orchestrator = engine();
    let opener = Hand::parse("A32.KQ4.KJ54.A32"); // 16, four hearts
    let responder = Hand::parse("432.432.AQ72.K32"); // 9, four hearts

    let mut auction = Auction::new(Position::North);
    let mut ns = DealContext::new();
    let (call, _) = orchestrator
        .get_next_bid(&opener, &auction, Vulnerability::None, &mut ns)
        .unwrap();
    assert_eq!(call, Call::bid(1, Strain::NoTrump));
    auction.add_call(call);
    auction.add_call(Call::Pass);

    let (call, _) = orchestrator
        .get_next_bid(&responder, &auction, Vulnerability::None, &mut ns)
        .unwrap();
    assert_eq!(call, Call::bid(2, Strain::Clubs));
    auction.add_call(call);
    auction.add_call(Call::Pass);

    let (call, _) = orchestrator
        .get_next_bid(&opener, &auction, Vulnerability::None, &mut ns)
        .unwrap();
    assert_eq!(call, Call::bid(2, Strain::Hearts));
    auction.add_call(call);
    auction.add_call(Call::Pass);

    let state = BiddingState::build(&auction);
    let north = state.belief(Position::North);
    assert_eq!(north.hcp, coach_core::Range::new(15, 17));
    assert_eq!(north.suit_length(coach_core::Suit::Hearts).min, 4);
    assert!(state.belief(Position::South).has_tag("stayman_asked"));
}
