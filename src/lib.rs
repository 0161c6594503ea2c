//! Skirmish - Simulation Core
//!
//! A fixed-timestep ECS simulation of a two-sided skirmish: units paint
//! territory, capture cities, fight on contact and earn income for their side.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod cities;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod maps;
pub mod resources;
pub mod spatial;
pub mod systems;
pub mod terrain;
pub mod territory;
pub mod world;

pub use api::SkirmishMatch;
pub use cities::{City, CityRef, CityRegistry};
pub use components::*;
pub use config::SimConfig;
pub use error::CommandError;
pub use events::{EventQueue, MatchEvent};
pub use maps::{MapId, MapTemplate, UnknownMap};
pub use resources::{MatchMode, MatchPhase, MatchStats, Outcome, Treasury};
pub use spatial::{SpatialEntry, SpatialGrid};
pub use terrain::{Region, TerrainModel};
pub use territory::{TerritoryGrid, TerritoryLayout, Tint};
pub use world::{CitySnapshot, MatchSnapshot, TerritorySnapshot, UnitSnapshot};
