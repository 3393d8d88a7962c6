//! Convention detection: Stayman, Jacoby transfers, and Blackwood.
//!
//! A convention redefines one specific call in one specific context; when a
//! detection fires, its meaning *overrides* the generic response/rebid
//! classification for that call. Detection scans what this seat and its
//! partner have already shown (via belief tags) rather than re-parsing the
//! auction.

use crate::forcing::ForcingLevel;
use crate::model::tables::{BeliefDelta, CallMeaning};
use crate::model::SeatBelief;
use coach_core::{Call, Strain, Suit};

/// Context the replay hands to detection for each call.
pub(crate) struct ConventionContext<'a> {
    pub bidder: &'a SeatBelief,
    pub partner: &'a SeatBelief,
    pub agreed_suit: Option<Suit>,
    pub forcing: ForcingLevel,
}

/// A recognized convention call and the narrowing it implies.
#[derive(Debug)]
pub(crate) struct ConventionMeaning {
    pub name: &'static str,
    pub meaning: CallMeaning,
}

fn meaning(name: &'static str, delta: BeliefDelta) -> Option<ConventionMeaning> {
    Some(ConventionMeaning {
        name,
        meaning: CallMeaning {
            shows: delta,
            denies: None,
            forcing: None,
        },
    })
}

pub(crate) fn detect(ctx: &ConventionContext, call: &Call) -> Option<ConventionMeaning> {
    let (level, strain) = match call {
        Call::Bid { level, strain } => (*level, *strain),
        _ => return None,
    };

    // Stayman: 2C over partner's 1NT, 3C over partner's 2NT.
    let over_1nt = ctx.partner.has_tag("opened_1nt");
    let over_2nt = ctx.partner.has_tag("opened_2nt");
    if (over_1nt && level == 2 || over_2nt && level == 3) && strain == Strain::Clubs {
        return meaning(
            "stayman_ask",
            BeliefDelta::hcp_floor(if over_1nt { 8 } else { 4 }).tagged("stayman_asked"),
        );
    }

    // Stayman response by the notrump opener.
    if ctx.bidder.has_tag("opened_1nt") && ctx.partner.has_tag("stayman_asked") && level == 2 {
        return match strain {
            Strain::Diamonds => meaning(
                "stayman_deny",
                BeliefDelta::default()
                    .with_suit_max(Suit::Hearts, 3)
                    .with_suit_max(Suit::Spades, 3)
                    .tagged("stayman_denied_majors"),
            ),
            Strain::Hearts => meaning(
                "stayman_hearts",
                BeliefDelta::default()
                    .with_suit_min(Suit::Hearts, 4)
                    .tagged("stayman_showed_hearts"),
            ),
            // 2S goes up the line, so it also denies four hearts.
            Strain::Spades => meaning(
                "stayman_spades",
                BeliefDelta::default()
                    .with_suit_min(Suit::Spades, 4)
                    .with_suit_max(Suit::Hearts, 3)
                    .tagged("stayman_showed_spades"),
            ),
            _ => None,
        };
    }

    // Jacoby transfers over 1NT (2D→hearts, 2H→spades) and 2NT (3D/3H).
    // Only the responder's first move reads as a transfer; after Stayman
    // the same calls are natural continuations.
    let transfer_level = if over_1nt {
        2
    } else if over_2nt {
        3
    } else {
        0
    };
    if transfer_level != 0 && level == transfer_level && !ctx.bidder.has_tag("stayman_asked") {
        match strain {
            Strain::Diamonds => {
                return meaning(
                    "jacoby_transfer",
                    BeliefDelta::default()
                        .with_suit_min(Suit::Hearts, 5)
                        .tagged("transfer_to_hearts"),
                )
            }
            Strain::Hearts => {
                return meaning(
                    "jacoby_transfer",
                    BeliefDelta::default()
                        .with_suit_min(Suit::Spades, 5)
                        .tagged("transfer_to_spades"),
                )
            }
            _ => {}
        }
    }

    // Transfer completion and super-accept by the notrump opener.
    if ctx.bidder.has_tag("opened_1nt") || ctx.bidder.has_tag("opened_2nt") {
        let target = if ctx.partner.has_tag("transfer_to_hearts") {
            Some(Suit::Hearts)
        } else if ctx.partner.has_tag("transfer_to_spades") {
            Some(Suit::Spades)
        } else {
            None
        };
        if let (Some(target), Some(suit)) = (target, call.suit()) {
            if suit == target && !ctx.bidder.has_tag("transfer_completed") {
                // A jump completion is a super-accept: maximum with a fit.
                if level == 3 && ctx.bidder.has_tag("opened_1nt") {
                    return meaning(
                        "transfer_super_accept",
                        BeliefDelta::hcp_floor(17)
                            .with_suit_min(target, 4)
                            .tagged("transfer_completed")
                            .tagged("super_accepted"),
                    );
                }
                return meaning(
                    "transfer_complete",
                    BeliefDelta::default().tagged("transfer_completed"),
                );
            }
        }
    }

    // Blackwood: 4NT once a suit is agreed or the auction is game-forcing.
    if level == 4 && strain == Strain::NoTrump {
        if ctx.agreed_suit.is_some() || ctx.forcing == ForcingLevel::GameForce {
            return meaning(
                "blackwood_ask",
                BeliefDelta::default().tagged("blackwood_asked"),
            );
        }
        return None;
    }

    // Blackwood responses: 5C=0/4, 5D=1, 5H=2, 5S=3 aces.
    if ctx.partner.has_tag("blackwood_asked") && level == 5 {
        let tag = match strain {
            Strain::Clubs => "aces_shown_0_or_4",
            Strain::Diamonds => "aces_shown_1",
            Strain::Hearts => "aces_shown_2",
            Strain::Spades => "aces_shown_3",
            Strain::NoTrump => return None,
        };
        return meaning("blackwood_response", BeliefDelta::default().tagged(tag));
    }

    None
}
