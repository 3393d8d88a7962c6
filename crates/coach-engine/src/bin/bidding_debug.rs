//! Replay an auction from one seat's point of view and dump everything the
//! engine sees: features, ranked candidates, the chosen call, forcing
//! state, and all four seat beliefs.
//!
//! Example:
//!   bidding-debug --hand "AJ4.73.T86.KQ752" --auction "1H P" --dealer N

use clap::Parser;
use coach_core::{Auction, Position, Vulnerability};
use coach_engine::model::BiddingState;
use coach_engine::{parse_calls, DealContext, FeatureVector, Orchestrator, SchemaStore};

#[derive(Parser)]
#[command(name = "bidding-debug", about = "Inspect one bid decision")]
struct Args {
    /// Hand in Clubs.Diamonds.Hearts.Spades format, e.g. "AJ4.73.T86.KQ752"
    #[arg(long)]
    hand: String,

    /// Auction so far, space- or comma-separated, e.g. "1N P 2C P"
    #[arg(long, default_value = "")]
    auction: String,

    /// Dealer seat: N, E, S, or W
    #[arg(long, default_value = "N")]
    dealer: String,

    /// Vulnerability: None, NS, EW, or Both
    #[arg(long, default_value = "None")]
    vulnerability: String,

    /// Emit candidates as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let hand = coach_core::parse::parse_hand(&args.hand)?;
    let dealer = args
        .dealer
        .chars()
        .next()
        .and_then(Position::from_char)
        .unwrap_or(Position::North);
    let vulnerability = Vulnerability::from_str_loose(&args.vulnerability);

    let mut auction = Auction::new(dealer);
    for call in parse_calls(&args.auction) {
        auction.add_call(call);
    }
    if !auction.is_valid() {
        return Err(format!("invalid auction: {}", args.auction).into());
    }

    let orchestrator = Orchestrator::new(SchemaStore::builtin());
    let features = FeatureVector::extract(&hand, &auction, vulnerability);
    let candidates = orchestrator.get_bid_candidates(&hand, &auction, vulnerability);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    println!(
        "Seat {} holding {} ({} HCP)",
        auction.current_player(),
        args.hand,
        features.hcp
    );
    println!("Candidates:");
    for candidate in &candidates {
        println!(
            "  {:<3} q={:.2} p={:<3} {} — {}",
            candidate.call.render(),
            candidate.quality,
            candidate.priority,
            candidate.rule_id,
            candidate.explanation
        );
    }

    let mut ctx = DealContext::new();
    match orchestrator.get_next_bid(&hand, &auction, vulnerability, &mut ctx) {
        Ok((call, explanation)) => {
            println!("Chosen: {} — {}", call.render(), explanation);
            println!("Forcing after this call: {}", ctx.forcing());
        }
        Err(err) => println!("Engine failure: {}", err),
    }

    let state = BiddingState::build(&auction);
    println!("Beliefs:");
    for seat in Position::ALL {
        println!("  {}: {}", seat, state.belief(seat));
    }
    Ok(())
}
