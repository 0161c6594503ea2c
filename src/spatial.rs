//! Spatial partitioning for efficient neighbor queries.
//!
//! Separation and engagement checks only look at nearby buckets instead of
//! every unit on the field. The grid is rebuilt from scratch before movement
//! and again before combat, so it always reflects the positions that pass sees.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::components::{Health, Position, Side};

/// Grid-based spatial partitioning structure.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    count: usize,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub side: Side,
}

impl SpatialEntry {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            count: 0,
        }
    }

    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.count = 0;
    }

    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, side: Side) {
        let cell = self.world_to_cell(x, y);
        self.cells.entry(cell).or_default().push(SpatialEntry { entity, x, y, side });
        self.count += 1;
    }

    /// All entries strictly closer than `radius` to the point, in no particular order.
    pub fn query_within(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let cells_to_check = (radius / self.cell_size).ceil() as i32;
        let center_cell = self.world_to_cell(x, y);

        let mut results = Vec::new();
        for dx in -cells_to_check..=cells_to_check {
            for dy in -cells_to_check..=cells_to_check {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(entries) = self.cells.get(&cell) {
                    for entry in entries {
                        let dist_sq = (entry.x - x).powi(2) + (entry.y - y).powi(2);
                        if dist_sq < radius_sq {
                            results.push(*entry);
                        }
                    }
                }
            }
        }
        results
    }

    /// Entries of the opposing side strictly within `radius`.
    pub fn query_enemies(&self, x: f32, y: f32, radius: f32, side: Side) -> Vec<SpatialEntry> {
        let mut results = self.query_within(x, y, radius);
        results.retain(|e| e.side != side);
        results
    }

    pub fn total_count(&self) -> usize {
        self.count
    }
}

/// System that rebuilds the spatial grid from live units.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &Position, &Side, &Health)>,
) {
    grid.clear();
    for (entity, pos, side, health) in query.iter() {
        if health.is_alive() {
            grid.insert(entity, pos.x, pos.y, *side);
        }
    }
}

/// Same rebuild, scheduled after movement so combat sees post-move positions.
pub fn spatial_grid_refresh_system(
    grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &Position, &Side, &Health)>,
) {
    spatial_grid_update_system(grid, query);
}
