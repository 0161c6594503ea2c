//! Territory grid - low-resolution ownership raster painted by unit presence.
//!
//! Each cell holds a tint. Units stamp a small disk of their side's tint every
//! tick. Nothing ever erases a tint: a painted cell only changes when the
//! opposing side paints over it.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Position, Side};

/// Ownership marker on a territory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tint {
    #[default]
    Unpainted = 0,
    Player = 1,
    Hostile = 2,
}

impl From<Side> for Tint {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Tint::Player,
            Side::Hostile => Tint::Hostile,
        }
    }
}

/// Initial paint job for a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerritoryLayout {
    /// Every cell unpainted.
    Blank,
    /// Top half hostile, bottom half player.
    HorizontalSplit,
    /// Left half player, right half hostile.
    VerticalSplit,
    /// Bottom-left player, top-right hostile, the other two quadrants unpainted.
    Quadrants,
}

/// Grid of tints, row-major, one cell per `cell_size` world units.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryGrid {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    cells: Vec<Tint>,
}

impl TerritoryGrid {
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![Tint::Unpainted; width * height],
        }
    }

    /// Create a grid with the given template split already painted.
    pub fn with_layout(width: usize, height: usize, cell_size: f32, layout: TerritoryLayout) -> Self {
        let mut grid = Self::new(width, height, cell_size);
        let (half_w, half_h) = (width / 2, height / 2);
        match layout {
            TerritoryLayout::Blank => {}
            TerritoryLayout::HorizontalSplit => {
                grid.fill_cells(0, 0, width, half_h, Tint::Hostile);
                grid.fill_cells(0, half_h, width, height, Tint::Player);
            }
            TerritoryLayout::VerticalSplit => {
                grid.fill_cells(0, 0, half_w, height, Tint::Player);
                grid.fill_cells(half_w, 0, width, height, Tint::Hostile);
            }
            TerritoryLayout::Quadrants => {
                grid.fill_cells(0, half_h, half_w, height, Tint::Player);
                grid.fill_cells(half_w, 0, width, half_h, Tint::Hostile);
            }
        }
        grid
    }

    /// Fill the half-open cell rectangle `[x0, x1) x [y0, y1)`.
    fn fill_cells(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, tint: Tint) {
        for gy in y0..y1.min(self.height) {
            for gx in x0..x1.min(self.width) {
                if let Some(i) = self.cell_index(gx, gy) {
                    self.cells[i] = tint;
                }
            }
        }
    }

    fn cell_index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Tint at grid coordinates, `None` outside the grid.
    pub fn get(&self, gx: usize, gy: usize) -> Option<Tint> {
        self.cell_index(gx, gy).map(|i| self.cells[i])
    }

    /// Convert world coordinates to grid coordinates, clamped into the grid.
    pub fn world_to_grid(&self, world_x: f32, world_y: f32) -> (usize, usize) {
        let gx = (world_x / self.cell_size).floor() as i32;
        let gy = (world_y / self.cell_size).floor() as i32;

        let gx = gx.clamp(0, self.width as i32 - 1) as usize;
        let gy = gy.clamp(0, self.height as i32 - 1) as usize;

        (gx, gy)
    }

    /// World position of a cell's center.
    pub fn grid_to_world(&self, gx: usize, gy: usize) -> Position {
        Position::new(
            (gx as f32 + 0.5) * self.cell_size,
            (gy as f32 + 0.5) * self.cell_size,
        )
    }

    /// Stamp a disk of `side`'s tint around `pos`. Cells outside the grid are skipped.
    pub fn paint(&mut self, pos: Position, side: Side, radius_cells: i32) {
        let cx = (pos.x / self.cell_size).floor() as i32;
        let cy = (pos.y / self.cell_size).floor() as i32;
        let tint = Tint::from(side);
        let r_sq = radius_cells * radius_cells;

        for dy in -radius_cells..=radius_cells {
            for dx in -radius_cells..=radius_cells {
                if dx * dx + dy * dy > r_sq {
                    continue;
                }
                let (gx, gy) = (cx + dx, cy + dy);
                if gx < 0 || gy < 0 {
                    continue;
                }
                if let Some(i) = self.cell_index(gx as usize, gy as usize) {
                    self.cells[i] = tint;
                }
            }
        }
    }

    /// Tint of the cell nearest to a world position.
    pub fn sample_owner_at(&self, pos: Position) -> Tint {
        let (gx, gy) = self.world_to_grid(pos.x, pos.y);
        self.cells[gy * self.width + gx]
    }

    pub fn count(&self, tint: Tint) -> usize {
        self.cells.iter().filter(|&&c| c == tint).count()
    }

    /// Row-major raw tints, for overlays.
    pub fn cells(&self) -> &[Tint] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_horizontal_split() {
        let grid = TerritoryGrid::with_layout(40, 30, 20.0, TerritoryLayout::HorizontalSplit);
        assert_eq!(grid.sample_owner_at(Position::new(400.0, 50.0)), Tint::Hostile);
        assert_eq!(grid.sample_owner_at(Position::new(400.0, 550.0)), Tint::Player);
        assert_eq!(grid.count(Tint::Unpainted), 0);
    }

    #[test]
    fn test_quadrants_leave_two_unpainted() {
        let grid = TerritoryGrid::with_layout(40, 30, 20.0, TerritoryLayout::Quadrants);
        assert_eq!(grid.sample_owner_at(Position::new(100.0, 500.0)), Tint::Player);
        assert_eq!(grid.sample_owner_at(Position::new(700.0, 100.0)), Tint::Hostile);
        assert_eq!(grid.sample_owner_at(Position::new(100.0, 100.0)), Tint::Unpainted);
        assert_eq!(grid.sample_owner_at(Position::new(700.0, 500.0)), Tint::Unpainted);
    }

    #[test]
    fn test_paint_disk() {
        let mut grid = TerritoryGrid::new(40, 30, 20.0);
        grid.paint(Position::new(210.0, 210.0), Side::Player, 2);
        // radius-2 disk covers 13 cells
        assert_eq!(grid.count(Tint::Player), 13);
        assert_eq!(grid.get(10, 10), Some(Tint::Player));
        assert_eq!(grid.get(12, 10), Some(Tint::Player));
        assert_eq!(grid.get(12, 12), Some(Tint::Unpainted));
    }

    #[test]
    fn test_paint_clamps_at_edges() {
        let mut grid = TerritoryGrid::new(40, 30, 20.0);
        grid.paint(Position::new(1.0, 1.0), Side::Hostile, 2);
        assert_eq!(grid.get(0, 0), Some(Tint::Hostile));
        assert_eq!(grid.count(Tint::Hostile), 6);
    }

    #[test]
    fn test_sample_out_of_bounds_clamps() {
        let grid = TerritoryGrid::with_layout(40, 30, 20.0, TerritoryLayout::VerticalSplit);
        assert_eq!(grid.sample_owner_at(Position::new(-500.0, -500.0)), Tint::Player);
        assert_eq!(grid.sample_owner_at(Position::new(5000.0, 5000.0)), Tint::Hostile);
    }

    fn arb_side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Player), Just(Side::Hostile)]
    }

    proptest! {
        #[test]
        fn painted_cells_never_revert(
            strokes in prop::collection::vec((-50.0f32..850.0, -50.0f32..650.0, arb_side()), 1..60)
        ) {
            let mut grid = TerritoryGrid::with_layout(40, 30, 20.0, TerritoryLayout::Quadrants);
            for (x, y, side) in strokes {
                let before = grid.cells().to_vec();
                grid.paint(Position::new(x, y), side, 2);
                for (old, new) in before.iter().zip(grid.cells()) {
                    if *old != Tint::Unpainted {
                        prop_assert_ne!(*new, Tint::Unpainted);
                    }
                }
            }
        }
    }
}
