//! Basic demonstration of the skirmish simulation.
//!
//! Run with: cargo run --example basic_demo
//! Set RUST_LOG=skirmish_sim=debug to see captures, purchases and deaths.

use skirmish_sim::{MatchEvent, MatchMode, MapId, Position, Side, SimConfig, SkirmishMatch, UnitKind};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Skirmish - Simulation Demo ===\n");

    let mut sim = SkirmishMatch::with_config(SimConfig::default().with_seed(7));
    sim.begin_match(MapId::ClassicBridge, MatchMode::Single);

    // Place a small force in the bottom half, then start the battle.
    for (i, kind) in [UnitKind::Tank, UnitKind::Tank, UnitKind::Troop, UnitKind::Troop, UnitKind::Troop]
        .into_iter()
        .enumerate()
    {
        let anchor = Position::new(250.0 + i as f32 * 75.0, 480.0);
        if let Err(err) = sim.place_unit(Side::Player, anchor, kind) {
            println!("  placement skipped: {err}");
        }
    }
    sim.end_phase().expect("single-player setup ends on request");

    println!("Initial state:");
    print_summary(&mut sim);

    // Push everyone toward the hostile centre city.
    let ids: Vec<_> = sim
        .units()
        .iter()
        .filter(|u| u.side == Side::Player)
        .map(|u| skirmish_sim::UnitId(u.id))
        .collect();
    let moved = sim.issue_move_order(&ids, Position::new(400.0, 60.0)).expect("battle is active");
    println!("\n--- Ordered {moved} units north ---\n");

    // Run 60 seconds of match time at 60 ticks/sec, reporting every 10 seconds.
    for second in 1..=60 {
        sim.step(1.0);
        for event in sim.drain_events() {
            match event {
                MatchEvent::CityCaptured { city, to, .. } => println!("  city {} -> {:?}", city.0, to),
                MatchEvent::MatchEnded(outcome) => println!("  match ended: {outcome:?}"),
                _ => {}
            }
        }
        if second % 10 == 0 {
            println!("--- Tick {} (t={:.1}s) ---", sim.current_tick(), sim.current_time());
            print_summary(&mut sim);
        }
        if sim.outcome().is_some() {
            break;
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().expect("snapshot serializes"));
}

fn print_summary(sim: &mut SkirmishMatch) {
    let snapshot = sim.snapshot();
    for side in [Side::Player, Side::Hostile] {
        let units: Vec<_> = snapshot.units_of(side).collect();
        let health: i32 = units.iter().map(|u| u.health).sum();
        println!(
            "  {:?}: {} units, {} hp total, {} cities, treasury {:.0}",
            side,
            units.len(),
            health,
            sim.cities().owned_count(side),
            sim.treasury().get(side),
        );
    }
}
