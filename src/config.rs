//! Tuning knobs for a match.
//!
//! Every balance constant lives here so tests and tools can override them.
//! Distances are world units, speeds are world units per tick, money is per second.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for simulation tuning.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds used by `SkirmishMatch::step` (60 Hz).
    pub fixed_timestep: f32,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    // Arena
    pub arena_width: f32,
    pub arena_height: f32,
    /// Size of one territory cell in world units.
    pub territory_cell_size: f32,
    /// Radius of the disk a unit paints, in cells.
    pub paint_radius_cells: i32,

    // Units
    pub troop_speed: f32,
    pub tank_speed: f32,
    pub troop_max_health: i32,
    pub tank_max_health: i32,
    pub troop_damage: i32,
    pub tank_damage: i32,
    pub troop_cost: f32,
    pub tank_cost: f32,
    /// Units per side.
    pub unit_cap: usize,

    // Movement
    /// Below this distance to its goal a unit stops seeking.
    pub arrival_radius: f32,
    pub separation_radius: f32,
    /// Speed multiplier while standing in a slow region.
    pub slow_zone_multiplier: f32,

    // Combat
    pub engagement_radius: f32,
    /// Chance per qualifying pair per tick that damage is exchanged.
    pub hit_probability: f64,

    // Spawning
    pub spawn_attempts: u32,
    pub spawn_ring_min: f32,
    pub spawn_ring_max: f32,
    /// Spawn candidates are clamped this far inside the arena edge.
    pub spawn_edge_margin: f32,

    // Economy
    pub player_base_income: f32,
    pub hostile_base_income: f32,
    pub city_income: f32,
    /// Player treasury during the placement phase.
    pub player_setup_treasury: f32,
    /// Player treasury once the battle starts.
    pub player_opening_treasury: f32,
    pub hostile_opening_treasury: f32,

    // AI
    pub ai_think_interval: u32,
    pub ai_buy_interval: u32,
    pub ai_tank_threshold: f32,
    pub ai_confidence_threshold: f32,
    /// Goals are offset by a uniform integer in `-jitter..=jitter` on each axis.
    pub goal_jitter: i32,
    /// Hostile troops deployed at the start of a single-player match.
    pub ai_opening_troops: usize,

    // Versus
    /// Ticks simulated per resolution turn.
    pub turn_ticks: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            seed: None,

            arena_width: 800.0,
            arena_height: 600.0,
            territory_cell_size: 20.0,
            paint_radius_cells: 2,

            troop_speed: 2.5,
            tank_speed: 4.0,
            troop_max_health: 80,
            tank_max_health: 150,
            troop_damage: 5,
            tank_damage: 8,
            troop_cost: 350.0,
            tank_cost: 500.0,
            unit_cap: 20,

            arrival_radius: 2.0,
            separation_radius: 12.0,
            slow_zone_multiplier: 0.5,

            engagement_radius: 18.0,
            hit_probability: 0.1,

            spawn_attempts: 50,
            spawn_ring_min: 30.0,
            spawn_ring_max: 60.0,
            spawn_edge_margin: 10.0,

            player_base_income: 10.0,
            hostile_base_income: 15.0,
            city_income: 20.0,
            player_setup_treasury: 10_000.0,
            player_opening_treasury: 500.0,
            hostile_opening_treasury: 1_200.0,

            ai_think_interval: 20,
            ai_buy_interval: 45,
            ai_tank_threshold: 600.0,
            ai_confidence_threshold: 0.5,
            goal_jitter: 15,
            ai_opening_troops: 20,

            turn_ticks: 300,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Absent fields keep their defaults.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn territory_width(&self) -> usize {
        (self.arena_width / self.territory_cell_size).floor().max(1.0) as usize
    }

    pub fn territory_height(&self) -> usize {
        (self.arena_height / self.territory_cell_size).floor().max(1.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_is_40_by_30() {
        let config = SimConfig::default();
        assert_eq!(config.territory_width(), 40);
        assert_eq!(config.territory_height(), 30);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "hit_probability": 0.5, "seed": 9 }"#).unwrap();
        assert_eq!(config.hit_probability, 0.5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.unit_cap, 20);
        assert_eq!(config.engagement_radius, 18.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(SimConfig::from_json("{ not json").is_err());
    }
}
