//! Movement system - goal seeking, local separation and terrain sliding.
//!
//! Separation is computed against the spatial grid, which holds every unit's
//! position from before this pass. All units therefore react to the same
//! picture of the field regardless of iteration order.
//!
//! There is no pathfinding. A unit blocked by a mountain slides along its
//! edge and can stall against concave shapes.

use bevy_ecs::prelude::*;

use crate::components::*;
use crate::config::SimConfig;
use crate::spatial::SpatialGrid;
use crate::terrain::TerrainModel;

/// Sum of push-away forces from units closer than `radius`.
///
/// Each neighbor at distance `d` pushes with magnitude `(radius - d) / 2`.
/// Coincident units (`d == 0`) contribute nothing.
pub fn separation_vector<I>(pos: Position, neighbors: I, radius: f32) -> (f32, f32)
where
    I: IntoIterator<Item = Position>,
{
    let mut sep_x = 0.0;
    let mut sep_y = 0.0;
    for other in neighbors {
        let dx = pos.x - other.x;
        let dy = pos.y - other.y;
        let d = (dx * dx + dy * dy).sqrt();
        if d > 0.0 && d < radius {
            let force = (radius - d) / 2.0;
            sep_x += (dx / d) * force;
            sep_y += (dy / d) * force;
        }
    }
    (sep_x, sep_y)
}

/// Compute where a unit ends up this tick.
pub fn step_unit(
    pos: Position,
    goal: Goal,
    kind: UnitKind,
    separation: (f32, f32),
    terrain: &TerrainModel,
    config: &SimConfig,
) -> Position {
    let dx = goal.x - pos.x;
    let dy = goal.y - pos.y;
    let dist = (dx * dx + dy * dy).sqrt();

    let (mut vx, mut vy) = separation;
    if dist > config.arrival_radius {
        let speed = kind.speed(config)
            * terrain.movement_multiplier(pos.x, pos.y, config.slow_zone_multiplier);
        let move_dist = dist.min(speed);
        vx += (dx / dist) * move_dist;
        vy += (dy / dist) * move_dist;
    }

    let nx = pos.x + vx;
    let ny = pos.y + vy;
    if !terrain.is_impassable(nx, ny) {
        Position::new(nx, ny)
    } else if !terrain.is_impassable(nx, pos.y) {
        Position::new(nx, pos.y)
    } else if !terrain.is_impassable(pos.x, ny) {
        Position::new(pos.x, ny)
    } else {
        pos
    }
}

/// System that moves every live unit one tick toward its goal.
pub fn movement_system(
    config: Res<SimConfig>,
    terrain: Res<TerrainModel>,
    grid: Res<SpatialGrid>,
    mut query: Query<(Entity, &mut Position, &Goal, &UnitKind, &Health)>,
) {
    for (entity, mut pos, goal, kind, health) in query.iter_mut() {
        if !health.is_alive() {
            continue;
        }

        let neighbors = grid
            .query_within(pos.x, pos.y, config.separation_radius)
            .into_iter()
            .filter(|e| e.entity != entity)
            .map(|e| e.position());
        let separation = separation_vector(*pos, neighbors, config.separation_radius);

        *pos = step_unit(*pos, *goal, *kind, separation, &terrain, &config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::spatial_grid_update_system;
    use crate::terrain::Region;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_goal_seek_caps_at_speed() {
        let config = SimConfig::default();
        let terrain = TerrainModel::default();
        let next = step_unit(
            Position::new(0.0, 0.0),
            Goal::new(100.0, 0.0),
            UnitKind::Tank,
            (0.0, 0.0),
            &terrain,
            &config,
        );
        assert!(approx(next.x, 4.0));
        assert!(approx(next.y, 0.0));
    }

    #[test]
    fn test_goal_seek_does_not_overshoot() {
        let config = SimConfig::default();
        let next = step_unit(
            Position::new(0.0, 0.0),
            Goal::new(3.0, 0.0),
            UnitKind::Tank,
            (0.0, 0.0),
            &TerrainModel::default(),
            &config,
        );
        assert!(approx(next.x, 3.0));
    }

    #[test]
    fn test_river_halves_speed() {
        let config = SimConfig::default();
        let terrain = TerrainModel::new(Vec::new(), vec![Region::new(-10.0, -10.0, 10.0, 10.0)]);
        for kind in [UnitKind::Troop, UnitKind::Tank] {
            let next = step_unit(Position::new(0.0, 0.0), Goal::new(0.0, 100.0), kind, (0.0, 0.0), &terrain, &config);
            assert!(approx(next.y, kind.speed(&config) / 2.0));
        }
    }

    #[test]
    fn test_separation_only_when_arrived() {
        // Goal equals position; one neighbor at distance 6 pushes with (12 - 6) / 2 = 3.
        let config = SimConfig::default();
        let pos = Position::new(50.0, 50.0);
        let sep = separation_vector(pos, [Position::new(56.0, 50.0)], config.separation_radius);
        assert!(approx(sep.0, -3.0));
        assert!(approx(sep.1, 0.0));

        let next = step_unit(pos, Goal::hold(pos), UnitKind::Troop, sep, &TerrainModel::default(), &config);
        assert!(approx(next.x, 47.0));
        assert!(approx(next.y, 50.0));
    }

    #[test]
    fn test_coincident_units_do_not_push() {
        let pos = Position::new(5.0, 5.0);
        assert_eq!(separation_vector(pos, [pos], 12.0), (0.0, 0.0));
    }

    #[test]
    fn test_slides_along_mountain_edge() {
        let config = SimConfig::default();
        // Wall directly above; moving diagonally up-right keeps only the x component.
        let terrain = TerrainModel::new(vec![Region::new(-100.0, -100.0, 100.0, -1.0)], Vec::new());
        let next = step_unit(
            Position::new(0.0, 0.0),
            Goal::new(100.0, -100.0),
            UnitKind::Tank,
            (0.0, 0.0),
            &terrain,
            &config,
        );
        assert!(next.x > 0.0);
        assert!(approx(next.y, 0.0));
    }

    #[test]
    fn test_stalls_in_corner() {
        let config = SimConfig::default();
        let terrain = TerrainModel::new(
            vec![
                Region::new(-100.0, -100.0, 100.0, -1.0),
                Region::new(1.0, -100.0, 100.0, 100.0),
            ],
            Vec::new(),
        );
        let start = Position::new(0.0, 0.0);
        let next = step_unit(start, Goal::new(100.0, -100.0), UnitKind::Tank, (0.0, 0.0), &terrain, &config);
        assert_eq!(next, start);
    }

    #[test]
    fn test_movement_system_pushes_crowded_units_apart() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(TerrainModel::default());
        world.insert_resource(SpatialGrid::new(20.0));

        let a = world
            .spawn((Position::new(100.0, 100.0), Goal::new(100.0, 100.0), UnitKind::Troop, Side::Player, Health::new(80)))
            .id();
        let b = world
            .spawn((Position::new(106.0, 100.0), Goal::new(106.0, 100.0), UnitKind::Troop, Side::Hostile, Health::new(80)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems((spatial_grid_update_system, movement_system).chain());
        schedule.run(&mut world);

        let pa = *world.get::<Position>(a).unwrap();
        let pb = *world.get::<Position>(b).unwrap();
        assert!(approx(pa.x, 97.0));
        assert!(approx(pb.x, 109.0));
    }
}
