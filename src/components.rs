//! ECS Components for the skirmish simulation.
//!
//! Components are pure data containers attached to unit entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in the arena (x = left/right, y = top/bottom, y grows downward).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Point a unit is walking toward. Independent of the current position.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub x: f32,
    pub y: f32,
}

impl Goal {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// A goal that holds the unit where it stands.
    pub fn hold(pos: Position) -> Self {
        Self { x: pos.x, y: pos.y }
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Process-unique unit identifier. Allocated from a monotonic counter, never reused.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Which side a unit fights for.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Hostile,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Hostile,
            Side::Hostile => Side::Player,
        }
    }

    /// Compact tag used by the spatial grid.
    pub fn tag(self) -> u8 {
        match self {
            Side::Player => 0,
            Side::Hostile => 1,
        }
    }
}

/// City ownership. A city starts in any of these and never returns to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Neutral,
    Player,
    Hostile,
}

impl From<Side> for Owner {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Owner::Player,
            Side::Hostile => Owner::Hostile,
        }
    }
}

impl Owner {
    pub fn is(self, side: Side) -> bool {
        self == Owner::from(side)
    }
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Unit category. Fixed at creation; drives speed, health, damage and price.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Troop,
    Tank,
}

impl UnitKind {
    /// Base movement speed in world units per tick.
    pub fn speed(self, config: &SimConfig) -> f32 {
        match self {
            UnitKind::Troop => config.troop_speed,
            UnitKind::Tank => config.tank_speed,
        }
    }

    pub fn max_health(self, config: &SimConfig) -> i32 {
        match self {
            UnitKind::Troop => config.troop_max_health,
            UnitKind::Tank => config.tank_max_health,
        }
    }

    /// Damage this unit deals to its opponent in one exchange.
    pub fn damage(self, config: &SimConfig) -> i32 {
        match self {
            UnitKind::Troop => config.troop_damage,
            UnitKind::Tank => config.tank_damage,
        }
    }

    pub fn cost(self, config: &SimConfig) -> f32 {
        match self {
            UnitKind::Troop => config.troop_cost,
            UnitKind::Tank => config.tank_cost,
        }
    }
}

/// Hit points. `current` never exceeds `max`; a unit at or below zero is removed the same tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Subtract damage, flooring at zero so the health invariant holds until removal.
    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete unit entity.
#[derive(Bundle)]
pub struct UnitBundle {
    pub id: UnitId,
    pub side: Side,
    pub kind: UnitKind,
    pub position: Position,
    pub goal: Goal,
    pub health: Health,
}

impl UnitBundle {
    /// A fresh unit at full health whose goal is its spawn point.
    pub fn new(id: UnitId, side: Side, kind: UnitKind, position: Position, config: &SimConfig) -> Self {
        Self {
            id,
            side,
            kind,
            position,
            goal: Goal::hold(position),
            health: Health::new(kind.max_health(config)),
        }
    }
}
