//! Spawn placement - best-effort search for a free point near an anchor.
//!
//! Candidates are drawn on a ring around the anchor and clamped into the
//! arena. The first one that is outside every mountain and clear of all live
//! units wins. After the attempt budget runs out the spawn simply fails.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::components::*;
use crate::config::SimConfig;
use crate::events::{EventQueue, MatchEvent};
use crate::resources::NextUnitId;
use crate::terrain::TerrainModel;

/// Search for a valid spawn point around `anchor`.
pub fn find_spawn_point<R: Rng + ?Sized>(
    rng: &mut R,
    anchor: Position,
    terrain: &TerrainModel,
    occupied: &[Position],
    config: &SimConfig,
) -> Option<Position> {
    if !anchor.x.is_finite() || !anchor.y.is_finite() {
        return None;
    }
    let margin = config.spawn_edge_margin;
    for _ in 0..config.spawn_attempts {
        let angle = rng.gen_range(0.0..TAU);
        let radius = rng.gen_range(config.spawn_ring_min..=config.spawn_ring_max);
        let x = (anchor.x + angle.cos() * radius).clamp(margin, config.arena_width - margin);
        let y = (anchor.y + angle.sin() * radius).clamp(margin, config.arena_height - margin);

        if terrain.is_impassable(x, y) {
            continue;
        }
        let candidate = Position::new(x, y);
        let crowded = occupied
            .iter()
            .any(|other| other.distance_to(&candidate) < config.separation_radius);
        if !crowded {
            return Some(candidate);
        }
    }
    None
}

/// Positions of every live unit.
pub fn occupied_positions(world: &mut World) -> Vec<Position> {
    let mut query = world.query::<(&Position, &Health)>();
    query
        .iter(world)
        .filter(|(_, health)| health.is_alive())
        .map(|(pos, _)| *pos)
        .collect()
}

/// Try to place a new unit near `anchor`. Returns the new id, or `None` if no spot was found.
pub fn spawn_unit(world: &mut World, side: Side, anchor: Position, kind: UnitKind) -> Option<UnitId> {
    let occupied = occupied_positions(world);
    let point = world.resource_scope(|world, mut rng: Mut<crate::resources::SimRng>| {
        let terrain = world.resource::<TerrainModel>();
        let config = world.resource::<SimConfig>();
        find_spawn_point(&mut rng.0, anchor, terrain, &occupied, config)
    });

    let Some(position) = point else {
        tracing::debug!(?side, ?kind, x = anchor.x, y = anchor.y, "spawn failed: no free point");
        return None;
    };

    let id = world.resource_mut::<NextUnitId>().allocate();
    let bundle = UnitBundle::new(id, side, kind, position, world.resource::<SimConfig>());
    world.spawn(bundle);
    world.resource_mut::<EventQueue>().push(MatchEvent::UnitSpawned { id, side, kind, position });
    Some(id)
}
