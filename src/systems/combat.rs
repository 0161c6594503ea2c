//! Combat system - proximity pairing and stochastic damage exchange.
//!
//! The system has three phases:
//!
//! 1. **Gather** - for every live player unit, query the spatial grid for
//!    hostile units strictly inside the engagement radius. Each attacker's
//!    query is independent and only reads the grid, so with the `parallel`
//!    feature this runs on rayon. Pair order is preserved either way.
//!
//! 2. **Roll and apply** - each pair independently rolls the hit
//!    probability. On success both units take the damage of the other's
//!    category. Damage is accumulated per entity first and then applied, so
//!    a unit can be hit by several pairings in one tick.
//!
//! 3. **Remove and judge** - dead units are reported, counted into the
//!    match stats and despawned. The win/loss check then looks only at what
//!    is still alive.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cities::CityRegistry;
use crate::components::*;
use crate::config::SimConfig;
use crate::events::{EventQueue, MatchEvent};
use crate::resources::{MatchPhase, MatchStats, Outcome, SimRng, SimTick};
use crate::spatial::SpatialGrid;

/// Damage accumulated during one tick, applied after all pairs have rolled.
#[derive(Default, Debug, Clone)]
pub struct CombatResults {
    pub damage: HashMap<Entity, i32>,
    /// Number of pairs that exchanged fire.
    pub exchanges: u32,
}

impl CombatResults {
    pub fn add(&mut self, entity: Entity, amount: i32) {
        *self.damage.entry(entity).or_insert(0) += amount;
    }
}

/// Player attacker extracted for the gather phase.
#[derive(Debug, Clone, Copy)]
struct Attacker {
    entity: Entity,
    x: f32,
    y: f32,
}

/// Every (player, hostile) pair closer than `radius`, in attacker order.
fn gather_pairs(attackers: &[Attacker], grid: &SpatialGrid, radius: f32) -> Vec<(Entity, Entity)> {
    let pairs_for = |a: &Attacker| -> Vec<(Entity, Entity)> {
        grid.query_enemies(a.x, a.y, radius, Side::Player)
            .into_iter()
            .map(|enemy| (a.entity, enemy.entity))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let pairs: Vec<(Entity, Entity)> = attackers.par_iter().map(pairs_for).flatten().collect();

    #[cfg(not(feature = "parallel"))]
    let pairs: Vec<(Entity, Entity)> = attackers.iter().flat_map(pairs_for).collect();

    pairs
}

/// Result of the win/loss check, or `None` while both sides are still in it.
///
/// The loss condition is checked first, so a tick that empties both sides
/// counts against the player.
pub fn decide_outcome(
    player_cities: usize,
    player_units: usize,
    hostile_cities: usize,
    hostile_units: usize,
) -> Option<Outcome> {
    if player_cities == 0 && player_units == 0 {
        Some(Outcome::Loss)
    } else if hostile_cities == 0 && hostile_units == 0 {
        Some(Outcome::Win)
    } else {
        None
    }
}

/// System that resolves one tick of combat.
#[allow(clippy::too_many_arguments)]
pub fn combat_system(
    mut commands: Commands,
    config: Res<SimConfig>,
    grid: Res<SpatialGrid>,
    tick: Res<SimTick>,
    cities: Res<CityRegistry>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<EventQueue>,
    mut stats: ResMut<MatchStats>,
    mut phase: ResMut<MatchPhase>,
    mut query: Query<(Entity, &UnitId, &Side, &UnitKind, &Position, &mut Health)>,
) {
    let attackers: Vec<Attacker> = query
        .iter()
        .filter(|(_, _, side, _, _, health)| **side == Side::Player && health.is_alive())
        .map(|(entity, _, _, _, pos, _)| Attacker { entity, x: pos.x, y: pos.y })
        .collect();

    let pairs = gather_pairs(&attackers, &grid, config.engagement_radius);

    // Rolls stay sequential so a seeded match replays identically.
    let hit_probability = config.hit_probability.clamp(0.0, 1.0);
    let mut results = CombatResults::default();
    for (player, hostile) in pairs {
        if !rng.0.gen_bool(hit_probability) {
            continue;
        }
        let (Ok((_, _, _, player_kind, _, _)), Ok((_, _, _, hostile_kind, _, _))) =
            (query.get(player), query.get(hostile))
        else {
            continue;
        };
        results.add(player, hostile_kind.damage(&config));
        results.add(hostile, player_kind.damage(&config));
        results.exchanges += 1;
    }

    let mut live = [0usize; 2];
    for (entity, id, side, kind, pos, mut health) in query.iter_mut() {
        if let Some(&amount) = results.damage.get(&entity) {
            health.damage(amount);
        }
        if health.is_alive() {
            live[side.tag() as usize] += 1;
            continue;
        }

        match side {
            Side::Player => stats.losses += 1,
            Side::Hostile => stats.kills += 1,
        }
        tracing::debug!(id = id.0, ?side, ?kind, "unit destroyed");
        events.push(MatchEvent::UnitDied { id: *id, side: *side, kind: *kind, position: *pos });
        commands.entity(entity).despawn();
    }

    if phase.outcome().is_some() {
        return;
    }
    let outcome = decide_outcome(
        cities.owned_count(Side::Player),
        live[Side::Player.tag() as usize],
        cities.owned_count(Side::Hostile),
        live[Side::Hostile.tag() as usize],
    );
    if let Some(outcome) = outcome {
        *phase = MatchPhase::Resolved(outcome);
        stats.end_time = Some(tick.time);
        events.push(MatchEvent::MatchEnded(outcome));
        tracing::info!(?outcome, kills = stats.kills, losses = stats.losses, "match resolved");
    }
}
