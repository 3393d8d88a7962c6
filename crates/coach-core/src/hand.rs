use crate::card::{Card, Rank};
use crate::strain::Suit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shape {
    /// No singletons, no voids, max one doubleton (4-3-3-3, 4-4-3-2, 5-3-3-2)
    Balanced,
    /// One singleton OR two doubletons, no voids, longest suit 6 or less
    SemiBalanced,
    /// Everything else
    Unbalanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Distribution {
    pub clubs: u8,
    pub diamonds: u8,
    pub hearts: u8,
    pub spades: u8,
}

impl Distribution {
    pub fn length(&self, suit: Suit) -> u8 {
        match suit {
            Suit::Clubs => self.clubs,
            Suit::Diamonds => self.diamonds,
            Suit::Hearts => self.hearts,
            Suit::Spades => self.spades,
        }
    }

    pub fn set_length(&mut self, suit: Suit, length: u8) {
        match suit {
            Suit::Clubs => self.clubs = length,
            Suit::Diamonds => self.diamonds = length,
            Suit::Hearts => self.hearts = length,
            Suit::Spades => self.spades = length,
        }
    }

    /// Suit lengths in descending order.
    pub fn sorted_lengths(&self) -> [u8; 4] {
        let mut d = [self.clubs, self.diamonds, self.hearts, self.spades];
        d.sort_unstable_by(|a, b| b.cmp(a));
        d
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Hand {
    pub cards: Vec<Card>,
}

impl Hand {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Parse a hand string in "Clubs.Diamonds.Hearts.Spades" format.
    /// Panics on invalid input — use for tests and known-good data only.
    pub fn parse(s: &str) -> Self {
        crate::parse::parse_hand(s).expect("invalid hand")
    }

    pub fn hcp(&self) -> u8 {
        self.cards.iter().map(|c| c.rank.hcp()).sum()
    }

    pub fn length(&self, suit: Suit) -> u8 {
        self.cards.iter().filter(|c| c.suit == suit).count() as u8
    }

    pub fn distribution(&self) -> Distribution {
        Distribution {
            clubs: self.length(Suit::Clubs),
            diamonds: self.length(Suit::Diamonds),
            hearts: self.length(Suit::Hearts),
            spades: self.length(Suit::Spades),
        }
    }

    /// HCP plus one point per card over four in each suit (length points).
    pub fn total_points(&self) -> u8 {
        let length_points: u8 = Suit::ALL
            .iter()
            .map(|&s| self.length(s).saturating_sub(4))
            .sum();
        self.hcp() + length_points
    }

    pub fn shape(&self) -> Shape {
        let sorted = self.distribution().sorted_lengths();
        let longest = sorted[0];
        let doubletons = sorted.iter().filter(|&&l| l == 2).count();
        let singletons = sorted.iter().filter(|&&l| l == 1).count();
        let voids = sorted.iter().filter(|&&l| l == 0).count();

        if singletons == 0 && voids == 0 && doubletons <= 1 {
            Shape::Balanced
        } else if longest <= 6 && voids == 0 && (singletons == 1 || doubletons == 2) {
            Shape::SemiBalanced
        } else {
            Shape::Unbalanced
        }
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self.shape(), Shape::Balanced)
    }

    /// The longest suit; ties break toward the higher-ranking suit.
    pub fn longest_suit(&self) -> Suit {
        let mut longest = Suit::Clubs;
        let mut max_len = 0;
        for suit in Suit::ALL {
            let len = self.length(suit);
            if len >= max_len {
                max_len = len;
                longest = suit;
            }
        }
        longest
    }

    /// All suits tied for the longest length.
    pub fn longest_suits(&self) -> Vec<Suit> {
        let dist = self.distribution();
        let max_len = dist.sorted_lengths()[0];
        Suit::ALL
            .iter()
            .copied()
            .filter(|&s| dist.length(s) == max_len)
            .collect()
    }

    /// The combined length of the two longest suits (the shape half of the
    /// Rule of 20).
    pub fn two_longest_lengths(&self) -> u8 {
        let sorted = self.distribution().sorted_lengths();
        sorted[0] + sorted[1]
    }

    pub fn rule_of_twenty(&self) -> bool {
        self.hcp() + self.two_longest_lengths() >= 20
    }

    pub fn rule_of_fifteen(&self) -> bool {
        self.hcp() + self.length(Suit::Spades) >= 15
    }

    /// Count honors in a suit among the top `n` of {A, K, Q, J, T}.
    pub fn top_honors(&self, suit: Suit, n: u8) -> u8 {
        const HONORS: [Rank; 5] = [Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Ten];
        let top_n = &HONORS[..n as usize];
        self.cards
            .iter()
            .filter(|c| c.suit == suit && top_n.contains(&c.rank))
            .count() as u8
    }

    /// Good suit quality: 2 of the top 3 honors, or 3 of the top 5.
    pub fn has_good_suit(&self, suit: Suit) -> bool {
        self.top_honors(suit, 3) >= 2 || self.top_honors(suit, 5) >= 3
    }

    /// Stopper: A, Kx, Qxx, or Jxxx — an honor protected by enough length
    /// to survive the opponents cashing from the top.
    pub fn has_stopper(&self, suit: Suit) -> bool {
        let len = self.length(suit);
        let holds = |rank| self.cards.iter().any(|c| c.suit == suit && c.rank == rank);
        holds(Rank::Ace)
            || (holds(Rank::King) && len >= 2)
            || (holds(Rank::Queen) && len >= 3)
            || (holds(Rank::Jack) && len >= 4)
    }

    /// Quick tricks in half-trick units (doubled to stay integral):
    /// AK=4, AQ=3, A=2, KQ=2, Kx=1 per suit.
    pub fn quick_tricks_x2(&self) -> u8 {
        Suit::ALL
            .iter()
            .map(|&suit| {
                let holds = |rank| self.cards.iter().any(|c| c.suit == suit && c.rank == rank);
                let ace = holds(Rank::Ace);
                let king = holds(Rank::King);
                let queen = holds(Rank::Queen);
                match (ace, king, queen) {
                    (true, true, _) => 4,
                    (true, false, true) => 3,
                    (true, false, false) => 2,
                    (false, true, true) => 2,
                    (false, true, false) if self.length(suit) >= 2 => 1,
                    _ => 0,
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hcp() {
        let hand = Hand::parse("J.Q.K.A2");
        assert_eq!(hand.hcp(), 10);
    }

    #[test]
    fn test_distribution() {
        let hand = Hand::parse("..Q.AK");
        let dist = hand.distribution();
        assert_eq!(dist.spades, 2);
        assert_eq!(dist.hearts, 1);
        assert_eq!(dist.diamonds, 0);
        assert_eq!(dist.clubs, 0);
    }

    #[test]
    fn test_total_points_counts_length() {
        // 6 clubs: 2 length points on top of 10 HCP.
        let hand = Hand::parse("AKQ432.52.73.862");
        assert_eq!(hand.hcp(), 9);
        assert_eq!(hand.total_points(), 11);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(Hand::parse("AKQ.AKQ.AKQ.AKQJ").shape(), Shape::Balanced);
        assert_eq!(Hand::parse("AK.AKQ.AKQ.AKQJT").shape(), Shape::Balanced);
        assert_eq!(Hand::parse("AK.AK.AKQJ.AKQJT").shape(), Shape::SemiBalanced);
        assert_eq!(Hand::parse("A.AKQ.AKQJ.AKQJT").shape(), Shape::SemiBalanced);
        assert_eq!(Hand::parse(".AKQJ.AKQJ.AKQJT").shape(), Shape::Unbalanced);
        assert_eq!(Hand::parse("A.AK.AKQ.AKQJT98").shape(), Shape::Unbalanced);
    }

    #[test]
    fn test_longest_suit_tie_breaks_high() {
        // 5-5 in hearts and spades: spades wins the tie.
        let hand = Hand::parse("A.AK.AKQJT.AKQJT");
        assert_eq!(hand.longest_suit(), Suit::Spades);
        let longest = hand.longest_suits();
        assert_eq!(longest.len(), 2);
        assert!(longest.contains(&Suit::Hearts));
    }

    #[test]
    fn test_rule_of_twenty() {
        // 11 HCP, 5-4 in the long suits: 11+5+4 = 20.
        let hand = Hand::parse("32.AJ432.KQ54.J2");
        assert_eq!(hand.hcp(), 11);
        assert_eq!(hand.two_longest_lengths(), 9);
        assert!(hand.rule_of_twenty());
        // 10 HCP with the same shape misses.
        let light = Hand::parse("32.AJ432.KQ54.32");
        assert_eq!(light.hcp(), 10);
        assert!(!light.rule_of_twenty());
    }

    #[test]
    fn test_stoppers() {
        let hand = Hand::parse("AJ32.QJ2.K2.J432");
        assert!(hand.has_stopper(Suit::Clubs)); // Ace
        assert!(hand.has_stopper(Suit::Diamonds)); // Qxx
        assert!(hand.has_stopper(Suit::Hearts)); // Kx
        assert!(hand.has_stopper(Suit::Spades)); // Jxxx
        let weak = Hand::parse("432.Q2.K.T9876543");
        assert!(!weak.has_stopper(Suit::Clubs));
        assert!(!weak.has_stopper(Suit::Diamonds)); // Qx is not enough
        assert!(!weak.has_stopper(Suit::Hearts)); // bare K
    }

    #[test]
    fn test_top_honors() {
        let hand = Hand::parse("..KJT42.");
        assert_eq!(hand.top_honors(Suit::Hearts, 3), 1);
        assert_eq!(hand.top_honors(Suit::Hearts, 5), 3);
        assert!(hand.has_good_suit(Suit::Hearts));
        let poor = Hand::parse("..K8432.");
        assert!(!poor.has_good_suit(Suit::Hearts));
    }

    #[test]
    fn test_quick_tricks() {
        // AK spades (4) + AQ hearts (3) + Kx diamonds (1) = 8 half-tricks.
        let hand = Hand::parse("5432.K2.AQ32.AK2");
        assert_eq!(hand.quick_tricks_x2(), 8);
        // Bare king is not a quick trick.
        let hand = Hand::parse("5432.K.65432.432");
        assert_eq!(hand.quick_tricks_x2(), 0);
    }
}
