//! Match-wide resources: clocks, phase, treasuries, stats, RNG.

use bevy_ecs::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::components::Side;
use crate::maps::MapId;
use crate::terrain::Region;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Simulation tick counter and elapsed match time.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick {
    pub tick: u64,
    pub time: f32,
}

impl SimTick {
    pub fn advance(&mut self, dt: f32) {
        self.tick = self.tick.wrapping_add(1);
        self.time += dt;
    }
}

/// Single-player against the AI, or two humans sharing the process.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    #[default]
    Single,
    Versus,
}

/// Result from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

/// Where the match is in its lifecycle.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Pre-battle placement for one side.
    Setup(Side),
    /// Real-time single-player battle.
    Active,
    /// Versus: `Side` is issuing orders.
    Orders(Side),
    /// Versus: the simulation plays out for `remaining` more ticks.
    Resolving { remaining: u32 },
    Resolved(Outcome),
}

impl MatchPhase {
    /// Whether movement, combat and AI run this tick.
    pub fn units_in_motion(self) -> bool {
        matches!(self, MatchPhase::Active | MatchPhase::Resolving { .. })
    }

    pub fn outcome(self) -> Option<Outcome> {
        match self {
            MatchPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// Run condition: units move and fight.
pub fn units_in_motion(phase: Res<MatchPhase>) -> bool {
    phase.units_in_motion()
}

/// Run condition: the hostile side is computer-controlled.
pub fn ai_enabled(mode: Res<MatchMode>) -> bool {
    *mode == MatchMode::Single
}

/// Money per side. Fractional; not clamped at zero.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    pub player: f32,
    pub hostile: f32,
}

impl Treasury {
    pub fn get(&self, side: Side) -> f32 {
        match side {
            Side::Player => self.player,
            Side::Hostile => self.hostile,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut f32 {
        match side {
            Side::Player => &mut self.player,
            Side::Hostile => &mut self.hostile,
        }
    }
}

/// Passive ledger read at match end. Times are match seconds.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Hostile units destroyed.
    pub kills: u32,
    /// Player units destroyed.
    pub losses: u32,
    pub money_earned: f32,
    pub start_time: f32,
    pub end_time: Option<f32>,
}

impl MatchStats {
    pub fn duration(&self) -> Option<f32> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Source of the simulation's randomness.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(ChaCha8Rng::seed_from_u64(seed)),
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }
}

/// Monotonic unit id allocator.
#[derive(Resource, Debug, Default)]
pub struct NextUnitId(pub u32);

impl NextUnitId {
    pub fn allocate(&mut self) -> crate::components::UnitId {
        self.0 += 1;
        crate::components::UnitId(self.0)
    }
}

/// Tick counters for the periodic AI decisions.
#[derive(Resource, Debug, Default)]
pub struct AiTimers {
    pub think: u32,
    pub buy: u32,
}

/// Map in play and its spawn zones.
#[derive(Resource, Debug, Clone, Copy)]
pub struct MapInfo {
    pub id: MapId,
    pub player_zone: Region,
    pub hostile_zone: Region,
}

impl MapInfo {
    pub fn spawn_zone(&self, side: Side) -> Region {
        match side {
            Side::Player => self.player_zone,
            Side::Hostile => self.hostile_zone,
        }
    }
}
