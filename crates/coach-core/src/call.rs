use crate::strain::{Strain, Suit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One action in an auction. The derived order on `Bid` (level first, then
/// strain rank) is the total order bids must strictly climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Call {
    Pass,
    Double,
    Redouble,
    Bid { level: u8, strain: Strain },
}

impl Call {
    pub fn bid(level: u8, strain: Strain) -> Self {
        Call::Bid { level, strain }
    }

    pub fn is_bid(&self) -> bool {
        matches!(self, Call::Bid { .. })
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Call::Bid { level, .. } => Some(*level),
            _ => None,
        }
    }

    pub fn strain(&self) -> Option<Strain> {
        match self {
            Call::Bid { strain, .. } => Some(*strain),
            _ => None,
        }
    }

    /// The suit of this call, if it is a suited bid (None for NT bids too).
    pub fn suit(&self) -> Option<Suit> {
        self.strain().and_then(Strain::to_suit)
    }

    /// True if `self` is a bid that strictly exceeds `other` under the
    /// (level, strain) order.
    pub fn outbids(&self, other: &Call) -> bool {
        match (self, other) {
            (Call::Bid { .. }, Call::Bid { .. }) => self > other,
            _ => false,
        }
    }

    pub fn render(self) -> String {
        match self {
            Call::Pass => "P".to_string(),
            Call::Double => "X".to_string(),
            Call::Redouble => "XX".to_string(),
            Call::Bid { level, strain } => format!("{}{}", level, strain.to_char()),
        }
    }
}

impl FromStr for Call {
    type Err = ();

    /// Accepts "P"/"PASS", "X"/"DBL", "XX"/"RDBL", and bids like "1C",
    /// "3NT", or "2♥". Symbol and letter spellings parse to the same value,
    /// which is what makes auction-pattern comparison spelling-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_uppercase().as_str() {
            "P" | "PASS" => return Ok(Call::Pass),
            "X" | "DBL" | "DOUBLE" => return Ok(Call::Double),
            "XX" | "RDBL" | "REDOUBLE" => return Ok(Call::Redouble),
            _ => {}
        }
        let mut chars = s.chars();
        let level = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or(())? as u8;
        if !(1..=7).contains(&level) {
            return Err(());
        }
        let strain_char = chars.next().ok_or(())?;
        let strain = Strain::from_char(strain_char).ok_or(())?;
        // Allow a trailing 'T' so "1NT" parses alongside "1N".
        match chars.next() {
            None => Ok(Call::Bid { level, strain }),
            Some('T') | Some('t') if strain == Strain::NoTrump => Ok(Call::Bid { level, strain }),
            Some(_) => Err(()),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
