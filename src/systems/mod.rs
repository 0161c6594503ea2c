//! ECS Systems for the skirmish simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Tick Order
//!
//! Data flows strictly downward; nothing re-enters an earlier stage.
//!
//! **Always (every in-match phase):**
//! - `economy_system` - Accrues income per side
//! - `territory_paint_system` - Stamps unit footprints onto the grid
//! - `city_capture_system` - Hands cities to the tint beneath them
//!
//! **Only while units are in motion (`Active`, `Resolving`):**
//! - `ai_retarget_system`, `ai_purchase_system` - Single-player only
//! - `spatial_grid_update_system` - Snapshot positions for separation
//! - `movement_system` - Goal seeking, separation, terrain sliding
//! - `spatial_grid_refresh_system` - Snapshot post-move positions
//! - `combat_system` - Pairing, damage, removal, win/loss
//! - `turn_countdown_system` - Versus turn timer

pub mod ai;
pub mod combat;
pub mod economy;
pub mod movement;
pub mod spawn;
pub mod territory;
pub mod turn;

pub use ai::*;
pub use combat::*;
pub use economy::*;
pub use movement::*;
pub use spawn::*;
pub use territory::*;
pub use turn::*;
