//! Terrain model - static obstacle and slow-zone geometry.
//!
//! The terrain is two lists of axis-aligned rectangles: impassable mountains
//! and rivers that halve traversal speed. It is immutable once a match starts.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Region {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Obstacle and slow-zone geometry for the current map.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainModel {
    pub mountains: Vec<Region>,
    pub rivers: Vec<Region>,
}

impl TerrainModel {
    pub fn new(mountains: Vec<Region>, rivers: Vec<Region>) -> Self {
        Self { mountains, rivers }
    }

    pub fn is_impassable(&self, x: f32, y: f32) -> bool {
        self.mountains.iter().any(|m| m.contains(x, y))
    }

    pub fn is_slow(&self, x: f32, y: f32) -> bool {
        self.rivers.iter().any(|r| r.contains(x, y))
    }

    /// Movement speed multiplier at a world position.
    pub fn movement_multiplier(&self, x: f32, y: f32, slow_multiplier: f32) -> f32 {
        if self.is_slow(x, y) {
            slow_multiplier
        } else {
            1.0
        }
    }
}
