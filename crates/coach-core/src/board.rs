use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Position {
    #[default]
    North,
    East,
    South,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partnership {
    NS,
    EW,
}

impl Partnership {
    pub fn contains(self, pos: Position) -> bool {
        match self {
            Partnership::NS => matches!(pos, Position::North | Position::South),
            Partnership::EW => matches!(pos, Position::East | Position::West),
        }
    }

    pub fn idx(self) -> usize {
        match self {
            Partnership::NS => 0,
            Partnership::EW => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Partnership::NS => Partnership::EW,
            Partnership::EW => Partnership::NS,
        }
    }
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::North,
        Position::East,
        Position::South,
        Position::West,
    ];

    pub fn partnership(self) -> Partnership {
        match self {
            Position::North | Position::South => Partnership::NS,
            Position::East | Position::West => Partnership::EW,
        }
    }

    /// Next seat in clockwise bidding order.
    pub fn next(self) -> Self {
        match self {
            Position::North => Position::East,
            Position::East => Position::South,
            Position::South => Position::West,
            Position::West => Position::North,
        }
    }

    pub fn idx(self) -> usize {
        match self {
            Position::North => 0,
            Position::East => 1,
            Position::South => 2,
            Position::West => 3,
        }
    }

    pub fn partner(self) -> Self {
        self.next().next()
    }

    /// Left-hand opponent.
    pub fn lho(self) -> Self {
        self.next()
    }

    /// Right-hand opponent.
    pub fn rho(self) -> Self {
        self.partner().next()
    }

    pub fn to_char(self) -> char {
        match self {
            Position::North => 'N',
            Position::East => 'E',
            Position::South => 'S',
            Position::West => 'W',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Position::North),
            'E' => Some(Position::East),
            'S' => Some(Position::South),
            'W' => Some(Position::West),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Vulnerability {
    #[default]
    None,
    NS,
    EW,
    Both,
}

impl Vulnerability {
    pub fn is_vulnerable(self, pos: Position) -> bool {
        match self {
            Vulnerability::None => false,
            Vulnerability::NS => pos.partnership() == Partnership::NS,
            Vulnerability::EW => pos.partnership() == Partnership::EW,
            Vulnerability::Both => true,
        }
    }

    /// Unfavorable ("red against white"): this side vulnerable, opponents
    /// not. Marginal actions are priced out at this colour.
    pub fn is_unfavorable_for(self, pos: Position) -> bool {
        self.is_vulnerable(pos) && !self.is_vulnerable(pos.lho())
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s.trim() {
            "NS" | "N-S" => Vulnerability::NS,
            "EW" | "E-W" => Vulnerability::EW,
            "Both" | "All" => Vulnerability::Both,
            _ => Vulnerability::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_cycle() {
        assert_eq!(Position::North.next(), Position::East);
        assert_eq!(Position::West.next(), Position::North);
        assert_eq!(Position::North.partner(), Position::South);
        assert_eq!(Position::East.lho(), Position::South);
        assert_eq!(Position::East.rho(), Position::North);
    }

    #[test]
    fn test_partnership() {
        assert_eq!(Position::North.partnership(), Partnership::NS);
        assert!(Partnership::EW.contains(Position::West));
        assert!(!Partnership::EW.contains(Position::North));
        assert_eq!(Partnership::NS.opponent(), Partnership::EW);
    }

    #[test]
    fn test_vulnerability() {
        assert!(Vulnerability::NS.is_vulnerable(Position::South));
        assert!(!Vulnerability::NS.is_vulnerable(Position::East));
        assert!(Vulnerability::Both.is_vulnerable(Position::West));
    }

    #[test]
    fn test_unfavorable() {
        // NS vulnerable, EW not: unfavorable for North, favorable for East.
        assert!(Vulnerability::NS.is_unfavorable_for(Position::North));
        assert!(!Vulnerability::NS.is_unfavorable_for(Position::East));
        // Equal colours are never "unfavorable".
        assert!(!Vulnerability::Both.is_unfavorable_for(Position::North));
        assert!(!Vulnerability::None.is_unfavorable_for(Position::North));
    }

    #[test]
    fn test_from_str_loose() {
        assert_eq!(Vulnerability::from_str_loose("N-S"), Vulnerability::NS);
        assert_eq!(Vulnerability::from_str_loose("All"), Vulnerability::Both);
        assert_eq!(Vulnerability::from_str_loose("nope"), Vulnerability::None);
    }
}
