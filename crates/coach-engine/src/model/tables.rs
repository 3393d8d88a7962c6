//! Data-driven meaning tables: what each classified call shows explicitly
//! and denies implicitly. Keeping these as plain data (instead of inline
//! branching) lets a consistency check validate every entry at test time:
//! a denial must always leave the explicit range non-empty.

use crate::forcing::ForcingLevel;
use coach_core::{Auction, Call, Strain, Suit};

/// A narrowing to apply to one seat's belief. Explicit shows and implicit
/// denials use the same vocabulary; a denial is just a delta whose bounds
/// come from what the player chose *not* to do.
#[derive(Debug, Clone, Default)]
pub struct BeliefDelta {
    pub hcp_min: Option<u8>,
    pub hcp_max: Option<u8>,
    pub suit_min: Vec<(Suit, u8)>,
    pub suit_max: Vec<(Suit, u8)>,
    /// Balanced shape: every suit narrows to [2, 5].
    pub balanced: bool,
    pub limited: bool,
    pub tags: Vec<&'static str>,
}

impl BeliefDelta {
    pub fn hcp(min: u8, max: u8) -> Self {
        Self {
            hcp_min: Some(min),
            hcp_max: Some(max),
            ..Self::default()
        }
    }

    pub fn hcp_floor(min: u8) -> Self {
        Self {
            hcp_min: Some(min),
            ..Self::default()
        }
    }

    pub fn hcp_ceiling(max: u8) -> Self {
        Self {
            hcp_max: Some(max),
            ..Self::default()
        }
    }

    pub fn with_suit_min(mut self, suit: Suit, len: u8) -> Self {
        self.suit_min.push((suit, len));
        self
    }

    pub fn with_suit_max(mut self, suit: Suit, len: u8) -> Self {
        self.suit_max.push((suit, len));
        self
    }

    pub fn with_suit_exact(self, suit: Suit, len: u8) -> Self {
        self.with_suit_min(suit, len).with_suit_max(suit, len)
    }

    pub fn balanced(mut self) -> Self {
        self.balanced = true;
        self
    }

    pub fn limited(mut self) -> Self {
        self.limited = true;
        self
    }

    pub fn tagged(mut self, tag: &'static str) -> Self {
        self.tags.push(tag);
        self
    }

    /// Fold another delta into this one (shows + denial combined).
    pub fn merge(mut self, other: BeliefDelta) -> Self {
        self.hcp_min = match (self.hcp_min, other.hcp_min) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.hcp_max = match (self.hcp_max, other.hcp_max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.suit_min.extend(other.suit_min);
        self.suit_max.extend(other.suit_max);
        self.balanced |= other.balanced;
        self.limited |= other.limited;
        self.tags.extend(other.tags);
        self
    }

    /// True if the combined bounds still describe at least one hand.
    pub fn is_satisfiable(&self) -> bool {
        if let (Some(min), Some(max)) = (self.hcp_min, self.hcp_max) {
            if min > max {
                return false;
            }
        }
        for suit in Suit::ALL {
            let mut min = 0u8;
            let mut max = 13u8;
            for (s, l) in &self.suit_min {
                if *s == suit {
                    min = min.max(*l);
                }
            }
            for (s, l) in &self.suit_max {
                if *s == suit {
                    max = max.min(*l);
                }
            }
            if self.balanced {
                min = min.max(2);
                max = max.min(5);
            }
            if min > max {
                return false;
            }
        }
        true
    }
}

/// One opening-table entry: the explicit range plus the implicit denial, as
/// a pair so the consistency check can reason about them together.
#[derive(Debug, Clone)]
pub struct CallMeaning {
    pub shows: BeliefDelta,
    pub denies: Option<BeliefDelta>,
    pub forcing: Option<ForcingLevel>,
}

impl CallMeaning {
    fn shows(shows: BeliefDelta) -> Self {
        Self {
            shows,
            denies: None,
            forcing: None,
        }
    }

    fn denying(mut self, denies: BeliefDelta) -> Self {
        self.denies = Some(denies);
        self
    }

    fn forcing(mut self, level: ForcingLevel) -> Self {
        self.forcing = Some(level);
        self
    }

    /// The full narrowing to apply: explicit shows folded with the denial.
    pub fn combined(&self) -> BeliefDelta {
        match &self.denies {
            Some(denies) => self.shows.clone().merge(denies.clone()),
            None => self.shows.clone(),
        }
    }
}

/// Explicit range table for opening bids, keyed by the exact call.
pub fn opening_meaning(call: &Call) -> Option<CallMeaning> {
    let (level, strain) = match call {
        Call::Bid { level, strain } => (*level, *strain),
        _ => return None,
    };
    let meaning = match (level, strain) {
        (1, Strain::NoTrump) => CallMeaning::shows(
            BeliefDelta::hcp(15, 17)
                .balanced()
                .limited()
                .tagged("opened_1nt"),
        ),
        (2, Strain::NoTrump) => CallMeaning::shows(
            BeliefDelta::hcp(20, 21)
                .balanced()
                .limited()
                .tagged("opened_2nt"),
        ),
        (3, Strain::NoTrump) => {
            CallMeaning::shows(BeliefDelta::hcp(25, 27).limited().tagged("opened_3nt"))
        }
        (2, Strain::Clubs) => CallMeaning::shows(
            BeliefDelta::hcp(22, 40).tagged("opened_strong_2c"),
        )
        .forcing(ForcingLevel::GameForce),
        (2, _) => {
            let suit = strain.to_suit()?;
            CallMeaning::shows(
                BeliefDelta::hcp(6, 10)
                    .with_suit_exact(suit, 6)
                    .limited()
                    .tagged("opened_weak_two"),
            )
        }
        (3, _) => {
            let suit = strain.to_suit()?;
            CallMeaning::shows(
                BeliefDelta::hcp(5, 9)
                    .with_suit_min(suit, 7)
                    .limited()
                    .tagged("opened_preempt"),
            )
        }
        (1, _) => {
            let suit = strain.to_suit()?;
            let floor = if suit.is_major() { 5 } else { 3 };
            CallMeaning::shows(BeliefDelta::hcp(11, 21).with_suit_min(suit, floor))
        }
        _ => return None,
    };
    Some(meaning)
}

/// Shapes a responder's first bid can take, derived from level/strain
/// deltas against partner's opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    SimpleRaise,
    JumpRaise,
    NewSuitOne,
    NewSuitTwo,
    JumpShift,
    OneNoTrump,
    TwoNoTrump,
    ThreeNoTrump,
}

/// Classify a responder's first bid against the opening. Convention bids
/// (Stayman, transfers, Blackwood) are detected elsewhere and override
/// this classification.
pub fn classify_response(opening: &Call, response: &Call, auction: &Auction) -> Option<ResponseShape> {
    let (open_level, open_strain) = (opening.level()?, opening.strain()?);
    let (level, strain) = (response.level()?, response.strain()?);

    if strain == Strain::NoTrump {
        return match level {
            1 => Some(ResponseShape::OneNoTrump),
            2 => Some(ResponseShape::TwoNoTrump),
            3 => Some(ResponseShape::ThreeNoTrump),
            _ => None,
        };
    }
    if strain == open_strain {
        if level == open_level + 1 {
            return Some(ResponseShape::SimpleRaise);
        }
        if level == open_level + 2 {
            return Some(ResponseShape::JumpRaise);
        }
        return None;
    }
    if auction.is_jump(response) {
        return Some(ResponseShape::JumpShift);
    }
    match level {
        1 => Some(ResponseShape::NewSuitOne),
        2 => Some(ResponseShape::NewSuitTwo),
        _ => None,
    }
}

/// Meaning of a classified response. `opening_suit` is partner's suit for
/// raises; the response's own suit applies to new-suit shapes.
pub fn response_meaning(
    shape: ResponseShape,
    opening_suit: Option<Suit>,
    response: &Call,
) -> CallMeaning {
    match shape {
        ResponseShape::SimpleRaise => {
            let mut delta = BeliefDelta::hcp_floor(6).limited();
            if let Some(suit) = opening_suit {
                delta = delta.with_suit_min(suit, 3);
            }
            // A simple raise denies game-going values.
            CallMeaning::shows(delta).denying(BeliefDelta::hcp_ceiling(10))
        }
        ResponseShape::JumpRaise => {
            let mut delta = BeliefDelta::hcp(10, 12).limited();
            if let Some(suit) = opening_suit {
                delta = delta.with_suit_min(suit, 4);
            }
            CallMeaning::shows(delta)
        }
        ResponseShape::NewSuitOne => {
            let mut delta = BeliefDelta::hcp_floor(6);
            if let Some(suit) = response.suit() {
                delta = delta.with_suit_min(suit, 4);
            }
            CallMeaning::shows(delta).forcing(ForcingLevel::ForcingOneRound)
        }
        ResponseShape::NewSuitTwo => {
            let mut delta = BeliefDelta::hcp_floor(10);
            if let Some(suit) = response.suit() {
                delta = delta.with_suit_min(suit, 4);
            }
            CallMeaning::shows(delta).forcing(ForcingLevel::ForcingOneRound)
        }
        ResponseShape::JumpShift => {
            let mut delta = BeliefDelta::hcp_floor(17);
            if let Some(suit) = response.suit() {
                delta = delta.with_suit_min(suit, 5);
            }
            CallMeaning::shows(delta).forcing(ForcingLevel::GameForce)
        }
        ResponseShape::OneNoTrump => CallMeaning::shows(BeliefDelta::hcp(6, 10).limited()),
        ResponseShape::TwoNoTrump => {
            CallMeaning::shows(BeliefDelta::hcp(11, 12).balanced().limited())
        }
        ResponseShape::ThreeNoTrump => {
            CallMeaning::shows(BeliefDelta::hcp(13, 15).balanced().limited())
        }
    }
}

/// Shapes an opener's second bid can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebidShape {
    RepeatMinimum,
    RepeatJump,
    NoTrumpRebid,
    Reverse,
    NewSuit,
    RaisePartner,
}

/// Classify the opener's rebid against the opening bid. A reverse — a new
/// suit at the 2-level ranking above the opening suit — is recognized here;
/// it always shows extras.
pub fn classify_rebid(
    opening: &Call,
    rebid: &Call,
    partner_suit: Option<Suit>,
    auction: &Auction,
) -> Option<RebidShape> {
    let open_strain = opening.strain()?;
    let (level, strain) = (rebid.level()?, rebid.strain()?);

    if strain == Strain::NoTrump {
        return Some(RebidShape::NoTrumpRebid);
    }
    if strain == open_strain {
        return if auction.is_jump(rebid) {
            Some(RebidShape::RepeatJump)
        } else {
            Some(RebidShape::RepeatMinimum)
        };
    }
    if rebid.suit() == partner_suit {
        return Some(RebidShape::RaisePartner);
    }
    if level == 2 && strain > open_strain && open_strain != Strain::NoTrump {
        return Some(RebidShape::Reverse);
    }
    Some(RebidShape::NewSuit)
}

pub fn rebid_meaning(shape: RebidShape, opening: &Call, rebid: &Call) -> CallMeaning {
    match shape {
        RebidShape::RepeatMinimum => {
            let mut delta = BeliefDelta::hcp(12, 15).limited();
            if let Some(suit) = rebid.suit() {
                delta = delta.with_suit_min(suit, 6);
            }
            CallMeaning::shows(delta)
        }
        RebidShape::RepeatJump => {
            let mut delta = BeliefDelta::hcp(16, 18).limited();
            if let Some(suit) = rebid.suit() {
                delta = delta.with_suit_min(suit, 6);
            }
            CallMeaning::shows(delta)
        }
        RebidShape::NoTrumpRebid => {
            let meaning = if rebid.level() == Some(1) {
                BeliefDelta::hcp(12, 14).balanced().limited()
            } else {
                BeliefDelta::hcp(18, 19).balanced().limited()
            };
            CallMeaning::shows(meaning)
        }
        RebidShape::Reverse => {
            let mut delta = BeliefDelta::hcp_floor(17).tagged("reversed");
            if let Some(suit) = rebid.suit() {
                delta = delta.with_suit_min(suit, 4);
            }
            if let Some(suit) = opening.suit() {
                delta = delta.with_suit_min(suit, 5);
            }
            // A reverse denies a minimum opening; the floor IS the denial.
            CallMeaning::shows(delta).forcing(ForcingLevel::ForcingOneRound)
        }
        RebidShape::NewSuit => {
            let mut delta = BeliefDelta::hcp(12, 18);
            if let Some(suit) = rebid.suit() {
                delta = delta.with_suit_min(suit, 4);
            }
            CallMeaning::shows(delta)
        }
        RebidShape::RaisePartner => {
            let mut delta = BeliefDelta::hcp(12, 16).limited();
            if let Some(suit) = rebid.suit() {
                delta = delta.with_suit_min(suit, 4);
            }
            CallMeaning::shows(delta)
        }
    }
}

/// Meaning of an opponent's first action over our opening.
pub fn overcall_meaning(call: &Call, auction: &Auction) -> Option<CallMeaning> {
    let suit = call.suit();
    if call.strain() == Some(Strain::NoTrump) {
        return Some(CallMeaning::shows(
            BeliefDelta::hcp(15, 18).balanced().limited(),
        ));
    }
    let suit = suit?;
    let meaning = if auction.is_jump(call) {
        CallMeaning::shows(
            BeliefDelta::hcp(5, 10)
                .with_suit_min(suit, 6)
                .limited()
                .tagged("weak_jump_overcall"),
        )
    } else {
        CallMeaning::shows(BeliefDelta::hcp(8, 16).with_suit_min(suit, 5).tagged("overcalled"))
    };
    Some(meaning)
}

/// A takeout double: opening values, short in the opener's suit, support
/// everywhere else.
pub fn takeout_double_meaning(opener_suit: Option<Suit>) -> CallMeaning {
    let mut delta = BeliefDelta::hcp_floor(12).tagged("takeout_double");
    if let Some(short) = opener_suit {
        delta = delta.with_suit_max(short, 2);
        for suit in Suit::ALL {
            if suit != short {
                delta = delta.with_suit_min(suit, 3);
            }
        }
    }
    CallMeaning::shows(delta)
}
