//! The web layer ships these types as JSON; keep the wire shape stable.

use coach_core::{Auction, Call, Position, Range, Strain, Vulnerability};

#[test]
fn call_json_round_trip() {
    for s in ["P", "X", "XX", "1C", "3N", "7S"] {
        let call: Call = s.parse().unwrap();
        let json = serde_json::to_string(&call).unwrap();
        let back: Call = serde_json::from_str(&json).unwrap();
        assert_eq!(call, back);
    }
}

#[test]
fn auction_json_round_trip() {
    let auction = Auction::bidding(Position::South, "1N P 2C P 2H P");
    let json = serde_json::to_string(&auction).unwrap();
    let back: Auction = serde_json::from_str(&json).unwrap();
    assert_eq!(back.dealer, Position::South);
    assert_eq!(back.calls, auction.calls);
    assert_eq!(back.current_player(), auction.current_player());
}

#[test]
fn bid_serializes_with_level_and_strain() {
    let json = serde_json::to_string(&Call::bid(1, Strain::NoTrump)).unwrap();
    assert!(json.contains("level"), "unexpected shape: {json}");
    assert!(json.contains("NoTrump"), "unexpected shape: {json}");
}

#[test]
fn range_json_round_trip() {
    let range = Range::new(15u8, 17);
    let json = serde_json::to_string(&range).unwrap();
    let back: Range<u8> = serde_json::from_str(&json).unwrap();
    assert_eq!(range, back);
}

#[test]
fn vulnerability_json_is_plain_string() {
    let json = serde_json::to_string(&Vulnerability::EW).unwrap();
    assert_eq!(json, "\"EW\"");
}
