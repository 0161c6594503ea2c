//! Read-only snapshot of a match.
//!
//! The `MatchSnapshot` struct provides a serializable view of the match
//! that a presentation layer can render without touching the ECS world.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cities::CityRegistry;
use crate::components::*;
use crate::maps::MapId;
use crate::resources::{MapInfo, MatchMode, MatchPhase, MatchStats, SimTick, Treasury};
use crate::territory::TerritoryGrid;

/// Snapshot of a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u32,
    pub side: Side,
    pub kind: UnitKind,
    pub x: f32,
    pub y: f32,
    pub goal_x: f32,
    pub goal_y: f32,
    pub health: i32,
    pub health_max: i32,
}

impl UnitSnapshot {
    /// Every live unit in the world, ordered by id.
    pub fn collect(world: &mut World) -> Vec<Self> {
        let mut query = world.query::<(&UnitId, &Side, &UnitKind, &Position, &Goal, &Health)>();
        let mut units: Vec<Self> = query
            .iter(world)
            .filter(|(_, _, _, _, _, health)| health.is_alive())
            .map(|(id, side, kind, pos, goal, health)| Self {
                id: id.0,
                side: *side,
                kind: *kind,
                x: pos.x,
                y: pos.y,
                goal_x: goal.x,
                goal_y: goal.y,
                health: health.current,
                health_max: health.max,
            })
            .collect();
        units.sort_by_key(|u| u.id);
        units
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySnapshot {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub owner: Owner,
}

/// Territory tints as `u8` (0 unpainted, 1 player, 2 hostile), row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritorySnapshot {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub tints: Vec<u8>,
}

/// Complete match state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: u64,
    /// Elapsed match time in seconds.
    pub time: f32,
    pub phase: MatchPhase,
    pub mode: MatchMode,
    pub map: MapId,
    /// Live units, ordered by id.
    pub units: Vec<UnitSnapshot>,
    pub cities: Vec<CitySnapshot>,
    pub treasury: Treasury,
    pub stats: MatchStats,
    pub territory: TerritorySnapshot,
}

impl MatchSnapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World) -> Self {
        let units = UnitSnapshot::collect(world);

        let cities = world
            .resource::<CityRegistry>()
            .iter()
            .map(|(city_ref, city)| CitySnapshot {
                index: city_ref.0,
                x: city.position.x,
                y: city.position.y,
                owner: city.owner,
            })
            .collect();

        let grid = world.resource::<TerritoryGrid>();
        let territory = TerritorySnapshot {
            width: grid.width,
            height: grid.height,
            cell_size: grid.cell_size,
            tints: grid.cells().iter().map(|t| *t as u8).collect(),
        };

        let tick = *world.resource::<SimTick>();
        Self {
            tick: tick.tick,
            time: tick.time,
            phase: *world.resource::<MatchPhase>(),
            mode: *world.resource::<MatchMode>(),
            map: world.resource::<MapInfo>().id,
            units,
            cities,
            treasury: *world.resource::<Treasury>(),
            stats: *world.resource::<MatchStats>(),
            territory,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn units_of(&self, side: Side) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.iter().filter(move |u| u.side == side)
    }
}
