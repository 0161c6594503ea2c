//! Public API for the simulation.
//!
//! `SkirmishMatch` owns one match: the ECS world holding every piece of match
//! state, and the schedule that advances it. Clients (a renderer, a test, a
//! headless tool) drive it through semantic commands and read it back through
//! snapshots and drained events.
//!
//! ## Fixed Timestep
//!
//! `advance_tick(dt)` runs exactly one tick. `step(frame_dt)` accumulates
//! frame time and runs as many fixed ticks (default 60 Hz) as have elapsed,
//! so behavior does not depend on frame rate.

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::cities::{CityRef, CityRegistry};
use crate::components::*;
use crate::config::SimConfig;
use crate::error::CommandError;
use crate::events::{EventQueue, MatchEvent};
use crate::maps::{MapId, MapTemplate};
use crate::resources::*;
use crate::spatial::{spatial_grid_refresh_system, spatial_grid_update_system, SpatialGrid};
use crate::systems::*;
use crate::terrain::TerrainModel;
use crate::territory::TerritoryGrid;
use crate::world::{MatchSnapshot, UnitSnapshot};

/// A single skirmish match.
pub struct SkirmishMatch {
    config: SimConfig,
    world: World,
    schedule: Schedule,
    /// Accumulated frame time for the fixed timestep.
    time_accumulator: f32,
}

impl SkirmishMatch {
    /// Create a single-player match on the default map.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a single-player match on the default map with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut sim = Self {
            world: World::new(),
            schedule: build_schedule(),
            config,
            time_accumulator: 0.0,
        };
        sim.begin_match(MapId::default(), MatchMode::Single);
        sim
    }

    /// Throw away the current match and start a fresh one.
    pub fn begin_match(&mut self, map: MapId, mode: MatchMode) {
        let template = map.template(self.config.arena_width, self.config.arena_height);
        self.world = build_world(&self.config, &template, mode);
        // Systems bind to the world they first run against.
        self.schedule = build_schedule();
        self.time_accumulator = 0.0;

        let opening_troops = self.config.ai_opening_troops;
        if mode == MatchMode::Single {
            let (x, y) = template.hostile_zone.center();
            self.deploy(Side::Hostile, Position::new(x, y), opening_troops);
        }

        if template.instant_start && mode == MatchMode::Single {
            let (x, y) = template.player_zone.center();
            self.deploy(Side::Player, Position::new(x, y), opening_troops);
            self.start_battle();
        }

        tracing::info!(%map, ?mode, phase = ?self.phase(), "match begun");
    }

    /// Spawn up to `count` troops around `anchor`. Failed placements are skipped.
    fn deploy(&mut self, side: Side, anchor: Position, count: usize) -> usize {
        let placed = (0..count)
            .filter(|_| spawn_unit(&mut self.world, side, anchor, UnitKind::Troop).is_some())
            .count();
        if placed < count {
            tracing::debug!(?side, placed, count, "opening deployment short");
        }
        placed
    }

    fn start_battle(&mut self) {
        let time = self.world.resource::<SimTick>().time;
        self.world.resource_mut::<Treasury>().player = self.config.player_opening_treasury;
        self.world.resource_mut::<MatchStats>().start_time = time;
        self.set_phase(MatchPhase::Active);
    }

    fn set_phase(&mut self, phase: MatchPhase) {
        *self.world.resource_mut::<MatchPhase>() = phase;
        tracing::info!(?phase, "phase changed");
    }

    /// Side allowed to order and buy right now.
    fn acting_side(&self) -> Result<Side, CommandError> {
        match self.phase() {
            MatchPhase::Active => Ok(Side::Player),
            MatchPhase::Orders(side) => Ok(side),
            other => Err(CommandError::WrongPhase(other)),
        }
    }

    /// Number of live units on `side`.
    pub fn unit_count(&mut self, side: Side) -> usize {
        let mut query = self.world.query::<(&Side, &Health)>();
        query
            .iter(&self.world)
            .filter(|(s, health)| **s == side && health.is_alive())
            .count()
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Place a unit during `side`'s setup phase. Placement is free but must
    /// fall inside the side's spawn zone and respect the unit cap.
    pub fn place_unit(&mut self, side: Side, position: Position, kind: UnitKind) -> Result<UnitId, CommandError> {
        let phase = self.phase();
        if phase != MatchPhase::Setup(side) {
            return Err(CommandError::WrongPhase(phase));
        }
        let zone = self.world.resource::<MapInfo>().spawn_zone(side);
        if !zone.contains(position.x, position.y) {
            return Err(CommandError::OutsideSpawnZone);
        }
        if self.unit_count(side) >= self.config.unit_cap {
            return Err(CommandError::UnitCapReached);
        }
        spawn_unit(&mut self.world, side, position, kind).ok_or(CommandError::PlacementFailed)
    }

    /// Finish the current phase.
    ///
    /// Single player: `Setup(Player)` starts the battle. Versus:
    /// `Setup(Player)` → `Setup(Hostile)` → `Orders(Player)` →
    /// `Orders(Hostile)` → `Resolving`. Other phases do not end on request.
    pub fn end_phase(&mut self) -> Result<MatchPhase, CommandError> {
        let mode = *self.world.resource::<MatchMode>();
        let phase = self.phase();
        match (mode, phase) {
            (MatchMode::Single, MatchPhase::Setup(Side::Player)) => self.start_battle(),
            (MatchMode::Versus, MatchPhase::Setup(Side::Player)) => {
                self.set_phase(MatchPhase::Setup(Side::Hostile));
            }
            (MatchMode::Versus, MatchPhase::Setup(Side::Hostile)) => {
                let opening = self.config.player_opening_treasury;
                *self.world.resource_mut::<Treasury>() = Treasury { player: opening, hostile: opening };
                let time = self.world.resource::<SimTick>().time;
                self.world.resource_mut::<MatchStats>().start_time = time;
                self.set_phase(MatchPhase::Orders(Side::Player));
            }
            (MatchMode::Versus, MatchPhase::Orders(Side::Player)) => {
                self.set_phase(MatchPhase::Orders(Side::Hostile));
            }
            (MatchMode::Versus, MatchPhase::Orders(Side::Hostile)) => {
                self.set_phase(MatchPhase::Resolving { remaining: self.config.turn_ticks });
            }
            _ => return Err(CommandError::WrongPhase(phase)),
        }
        Ok(self.phase())
    }

    /// Send the acting side's units toward `destination`. Each unit gets its
    /// own jittered goal. Unknown, dead or foreign ids are skipped.
    ///
    /// Returns how many units were re-targeted.
    pub fn issue_move_order(&mut self, ids: &[UnitId], destination: Position) -> Result<usize, CommandError> {
        let side = self.acting_side()?;
        let jitter = self.config.goal_jitter.abs();

        let mut moved = 0;
        self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let mut query = world.query::<(&UnitId, &Side, &Health, &mut Goal)>();
            for (id, unit_side, health, mut goal) in query.iter_mut(world) {
                if *unit_side != side || !health.is_alive() || !ids.contains(id) {
                    continue;
                }
                *goal = Goal::new(
                    destination.x + rng.0.gen_range(-jitter..=jitter) as f32,
                    destination.y + rng.0.gen_range(-jitter..=jitter) as f32,
                );
                moved += 1;
            }
        });
        Ok(moved)
    }

    /// Buy a unit for the acting side at one of its cities. The money is only
    /// taken once the unit is actually placed.
    pub fn purchase_unit(&mut self, city: CityRef, kind: UnitKind) -> Result<UnitId, CommandError> {
        let side = self.acting_side()?;
        let anchor = {
            let cities = self.world.resource::<CityRegistry>();
            let found = cities.get(city).ok_or(CommandError::UnknownCity(city))?;
            if !found.owner.is(side) {
                return Err(CommandError::NotOwner(city));
            }
            found.position
        };
        let cost = kind.cost(&self.config);
        let available = self.world.resource::<Treasury>().get(side);
        if available < cost {
            return Err(CommandError::InsufficientFunds { cost, available });
        }

        let id = spawn_unit(&mut self.world, side, anchor, kind).ok_or(CommandError::PlacementFailed)?;
        *self.world.resource_mut::<Treasury>().get_mut(side) -= cost;
        self.world
            .resource_mut::<EventQueue>()
            .push(MatchEvent::UnitPurchased { side, kind, city, cost });
        tracing::debug!(?side, ?kind, city = city.0, cost, "unit purchased");
        Ok(id)
    }

    /// Best-effort spawn outside the phase rules, e.g. for scripted scenarios.
    pub fn spawn_unit(&mut self, side: Side, anchor: Position, kind: UnitKind) -> Result<UnitId, CommandError> {
        spawn_unit(&mut self.world, side, anchor, kind).ok_or(CommandError::PlacementFailed)
    }

    // ========================================================================
    // TIME
    // ========================================================================

    /// Run exactly one tick of `dt` seconds. Does nothing once the match is resolved.
    pub fn advance_tick(&mut self, dt: f32) {
        if self.outcome().is_some() {
            return;
        }
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<SimTick>().advance(dt);
        self.schedule.run(&mut self.world);

        let tick = self.world.resource::<SimTick>().tick;
        tracing::trace!(tick, "tick complete");
    }

    /// Advance by a frame of `dt` seconds using the fixed timestep.
    /// Returns the number of ticks run.
    pub fn step(&mut self, dt: f32) -> u32 {
        let fixed_dt = self.config.fixed_timestep;
        if fixed_dt <= 0.0 {
            return 0;
        }

        self.time_accumulator += dt;
        let mut ticks = 0;
        while self.time_accumulator >= fixed_dt {
            self.advance_tick(fixed_dt);
            self.time_accumulator -= fixed_dt;
            ticks += 1;
        }
        ticks
    }

    // ========================================================================
    // READ ACCESS
    // ========================================================================

    /// Take every event emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.world.resource_mut::<EventQueue>().drain()
    }

    /// Get a snapshot of the current match state.
    pub fn snapshot(&mut self) -> MatchSnapshot {
        MatchSnapshot::from_world(&mut self.world)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> Result<String, serde_json::Error> {
        self.snapshot().to_json()
    }

    /// Live units, ordered by id.
    pub fn units(&mut self) -> Vec<UnitSnapshot> {
        UnitSnapshot::collect(&mut self.world)
    }

    pub fn cities(&self) -> &CityRegistry {
        self.world.resource::<CityRegistry>()
    }

    pub fn territory(&self) -> &TerritoryGrid {
        self.world.resource::<TerritoryGrid>()
    }

    pub fn terrain(&self) -> &TerrainModel {
        self.world.resource::<TerrainModel>()
    }

    pub fn treasury(&self) -> Treasury {
        *self.world.resource::<Treasury>()
    }

    pub fn stats(&self) -> MatchStats {
        *self.world.resource::<MatchStats>()
    }

    pub fn phase(&self) -> MatchPhase {
        *self.world.resource::<MatchPhase>()
    }

    pub fn mode(&self) -> MatchMode {
        *self.world.resource::<MatchMode>()
    }

    pub fn map(&self) -> MapInfo {
        *self.world.resource::<MapInfo>()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.phase().outcome()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimTick>().tick
    }

    /// Get the elapsed match time.
    pub fn current_time(&self) -> f32 {
        self.world.resource::<SimTick>().time
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SkirmishMatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Fresh world for a match on `template`, before any unit exists.
fn build_world(config: &SimConfig, template: &MapTemplate, mode: MatchMode) -> World {
    let mut world = World::new();

    // Core resources
    world.insert_resource(config.clone());
    world.insert_resource(DeltaTime(config.fixed_timestep));
    world.insert_resource(SimTick::default());
    world.insert_resource(SimRng::new(config.seed));
    world.insert_resource(NextUnitId::default());
    world.insert_resource(EventQueue::default());
    world.insert_resource(AiTimers::default());
    world.insert_resource(SpatialGrid::new(config.territory_cell_size));

    // Map
    world.insert_resource(template.terrain.clone());
    world.insert_resource(CityRegistry::new(template.cities.clone()));
    world.insert_resource(TerritoryGrid::with_layout(
        config.territory_width(),
        config.territory_height(),
        config.territory_cell_size,
        template.layout,
    ));
    world.insert_resource(MapInfo {
        id: template.id,
        player_zone: template.player_zone,
        hostile_zone: template.hostile_zone,
    });

    // Match
    world.insert_resource(mode);
    world.insert_resource(MatchPhase::Setup(Side::Player));
    world.insert_resource(Treasury {
        player: config.player_setup_treasury,
        hostile: config.hostile_opening_treasury,
    });
    world.insert_resource(MatchStats {
        money_earned: config.player_opening_treasury,
        ..MatchStats::default()
    });

    world
}

fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            economy_system,
            territory_paint_system,
            city_capture_system,
            (
                (ai_retarget_system, ai_purchase_system).chain().run_if(ai_enabled),
                spatial_grid_update_system,
                movement_system,
                spatial_grid_refresh_system,
                combat_system,
                turn_countdown_system,
            )
                .chain()
                .run_if(units_in_motion),
        )
            .chain(),
    );
    schedule
}
