//! AI systems for the computer-controlled hostile side.
//!
//! Two independent periodic decisions:
//!
//! - **Retargeting** scores the neighborhood of every hostile unit with an
//!   influence kernel and walks the unit toward the strongest nearby cell.
//!   Weak neighborhoods fall back to the nearest city the hostile side does
//!   not hold, and failing that the nearest player unit.
//! - **Purchasing** buys one unit at a random hostile city when the budget
//!   and unit cap allow.
//!
//! Both only run in single-player matches.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cities::{CityRef, CityRegistry};
use crate::components::*;
use crate::config::SimConfig;
use crate::events::{EventQueue, MatchEvent};
use crate::resources::{AiTimers, SimRng, Treasury};
use crate::systems::spawn::spawn_unit;
use crate::territory::{TerritoryGrid, Tint};

/// Weights applied around a scored cell. Heaviest at the center.
pub const INFLUENCE_KERNEL: [[f32; 5]; 5] = [
    [0.05, 0.1, 0.1, 0.1, 0.05],
    [0.1, 0.2, 0.2, 0.2, 0.1],
    [0.1, 0.2, 1.0, 0.2, 0.1],
    [0.1, 0.2, 0.2, 0.2, 0.1],
    [0.05, 0.1, 0.1, 0.1, 0.05],
];

const KERNEL_REACH: i32 = 2;

/// Presence from the hostile side's point of view, one value per territory cell.
#[derive(Debug, Clone)]
pub struct InfluenceMap {
    pub width: usize,
    pub height: usize,
    source: Vec<f32>,
}

impl InfluenceMap {
    const FRIENDLY_UNIT: f32 = 1.0;
    const ENEMY_UNIT: f32 = -1.0;
    const FRIENDLY_TERRITORY: f32 = 0.1;

    /// Rasterize units and hostile territory onto the grid's cells.
    pub fn build<I>(grid: &TerritoryGrid, units: I) -> Self
    where
        I: IntoIterator<Item = (Position, Side)>,
    {
        let mut source: Vec<f32> = grid
            .cells()
            .iter()
            .map(|tint| if *tint == Tint::Hostile { Self::FRIENDLY_TERRITORY } else { 0.0 })
            .collect();

        for (pos, side) in units {
            let (gx, gy) = grid.world_to_grid(pos.x, pos.y);
            source[gy * grid.width + gx] += match side {
                Side::Hostile => Self::FRIENDLY_UNIT,
                Side::Player => Self::ENEMY_UNIT,
            };
        }

        Self { width: grid.width, height: grid.height, source }
    }

    fn source_at(&self, gx: i32, gy: i32) -> f32 {
        if gx < 0 || gy < 0 || gx as usize >= self.width || gy as usize >= self.height {
            return 0.0;
        }
        self.source[gy as usize * self.width + gx as usize]
    }

    /// Kernel-weighted sum of the source around a cell.
    pub fn score(&self, gx: usize, gy: usize) -> f32 {
        let mut total = 0.0;
        for ky in -KERNEL_REACH..=KERNEL_REACH {
            for kx in -KERNEL_REACH..=KERNEL_REACH {
                let weight = INFLUENCE_KERNEL[(ky + KERNEL_REACH) as usize][(kx + KERNEL_REACH) as usize];
                total += weight * self.source_at(gx as i32 + kx, gy as i32 + ky);
            }
        }
        total
    }

    /// Score of a cell with the asking unit's own presence at `own` removed.
    pub fn score_excluding(&self, gx: usize, gy: usize, own: (usize, usize)) -> f32 {
        let kx = own.0 as i32 - gx as i32;
        let ky = own.1 as i32 - gy as i32;
        let mut score = self.score(gx, gy);
        if kx.abs() <= KERNEL_REACH && ky.abs() <= KERNEL_REACH {
            score -= INFLUENCE_KERNEL[(ky + KERNEL_REACH) as usize][(kx + KERNEL_REACH) as usize]
                * Self::FRIENDLY_UNIT;
        }
        score
    }

    /// Highest-scoring cell within reach of `own` that the hostile side has not painted yet.
    pub fn best_candidate(&self, grid: &TerritoryGrid, own: (usize, usize)) -> Option<((usize, usize), f32)> {
        let mut best: Option<((usize, usize), f32)> = None;
        for dy in -KERNEL_REACH..=KERNEL_REACH {
            for dx in -KERNEL_REACH..=KERNEL_REACH {
                let gx = own.0 as i32 + dx;
                let gy = own.1 as i32 + dy;
                if gx < 0 || gy < 0 {
                    continue;
                }
                let (gx, gy) = (gx as usize, gy as usize);
                match grid.get(gx, gy) {
                    None | Some(Tint::Hostile) => continue,
                    Some(_) => {}
                }
                let score = self.score_excluding(gx, gy, own);
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some(((gx, gy), score));
                }
            }
        }
        best
    }
}

/// Where a hostile unit standing at `pos` should head next.
///
/// Returns `None` when there is nothing worth walking to, in which case the
/// unit keeps its current goal.
pub fn choose_goal<R: Rng + ?Sized>(
    rng: &mut R,
    pos: Position,
    influence: &InfluenceMap,
    grid: &TerritoryGrid,
    cities: &CityRegistry,
    player_units: &[Position],
    config: &SimConfig,
) -> Option<Goal> {
    let own = grid.world_to_grid(pos.x, pos.y);
    if let Some(((gx, gy), score)) = influence.best_candidate(grid, own) {
        if score >= config.ai_confidence_threshold {
            let center = grid.grid_to_world(gx, gy);
            let jitter = config.goal_jitter.abs();
            return Some(Goal::new(
                center.x + rng.gen_range(-jitter..=jitter) as f32,
                center.y + rng.gen_range(-jitter..=jitter) as f32,
            ));
        }
    }

    if let Some((_, city)) = cities.nearest_not_owned_by(Side::Hostile, pos) {
        return Some(Goal::hold(city.position));
    }

    player_units
        .iter()
        .min_by(|a, b| pos.distance_to(a).total_cmp(&pos.distance_to(b)))
        .map(|target| Goal::hold(*target))
}

/// System that periodically re-aims every hostile unit.
pub fn ai_retarget_system(
    config: Res<SimConfig>,
    grid: Res<TerritoryGrid>,
    cities: Res<CityRegistry>,
    mut timers: ResMut<AiTimers>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&Position, &Side, &Health, &mut Goal)>,
) {
    timers.think += 1;
    if timers.think < config.ai_think_interval {
        return;
    }
    timers.think = 0;

    let live: Vec<(Position, Side)> = query
        .iter()
        .filter(|(_, _, health, _)| health.is_alive())
        .map(|(pos, side, _, _)| (*pos, *side))
        .collect();
    let influence = InfluenceMap::build(&grid, live.iter().copied());
    let player_units: Vec<Position> = live
        .iter()
        .filter(|(_, side)| *side == Side::Player)
        .map(|(pos, _)| *pos)
        .collect();

    let mut retargeted = 0u32;
    for (pos, side, health, mut goal) in query.iter_mut() {
        if *side != Side::Hostile || !health.is_alive() {
            continue;
        }
        if let Some(next) = choose_goal(&mut rng.0, *pos, &influence, &grid, &cities, &player_units, &config) {
            *goal = next;
            retargeted += 1;
        }
    }
    tracing::trace!(retargeted, "hostile retarget pass");
}

/// What the hostile side would buy right now, if anything.
pub fn purchase_decision(
    treasury: f32,
    live_units: usize,
    has_city: bool,
    config: &SimConfig,
) -> Option<UnitKind> {
    if !has_city || live_units >= config.unit_cap || treasury < config.troop_cost {
        return None;
    }
    if treasury >= config.ai_tank_threshold {
        Some(UnitKind::Tank)
    } else {
        Some(UnitKind::Troop)
    }
}

/// Make one hostile purchase attempt. The treasury is debited before the
/// spawn is tried, so a failed placement still costs the money.
pub fn hostile_purchase(world: &mut World) -> Option<UnitKind> {
    let live_units = {
        let mut query = world.query::<(&Side, &Health)>();
        query
            .iter(world)
            .filter(|(side, health)| **side == Side::Hostile && health.is_alive())
            .count()
    };
    let owned = world.resource::<CityRegistry>().owned_by(Side::Hostile);
    let treasury = world.resource::<Treasury>().hostile;
    let kind = purchase_decision(treasury, live_units, !owned.is_empty(), world.resource::<SimConfig>())?;

    let city: CityRef = *owned.choose(&mut world.resource_mut::<SimRng>().0)?;
    let anchor = world.resource::<CityRegistry>().get(city)?.position;
    let cost = kind.cost(world.resource::<SimConfig>());

    world.resource_mut::<Treasury>().hostile -= cost;
    world
        .resource_mut::<EventQueue>()
        .push(MatchEvent::UnitPurchased { side: Side::Hostile, kind, city, cost });

    let placed = spawn_unit(world, Side::Hostile, anchor, kind);
    tracing::debug!(?kind, city = city.0, placed = placed.is_some(), "hostile purchase");
    Some(kind)
}

/// Exclusive system that runs a hostile purchase on its own interval.
pub fn ai_purchase_system(world: &mut World) {
    let interval = world.resource::<SimConfig>().ai_buy_interval;
    {
        let mut timers = world.resource_mut::<AiTimers>();
        timers.buy += 1;
        if timers.buy < interval {
            return;
        }
        timers.buy = 0;
    }
    hostile_purchase(world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::City;
    use crate::resources::NextUnitId;
    use crate::terrain::TerrainModel;
    use crate::territory::TerritoryLayout;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn purchase_world(hostile_treasury: f32, cities: Vec<City>) -> World {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(TerrainModel::default());
        world.insert_resource(CityRegistry::new(cities));
        world.insert_resource(Treasury { player: 0.0, hostile: hostile_treasury });
        world.insert_resource(SimRng::new(Some(5)));
        world.insert_resource(NextUnitId::default());
        world.insert_resource(EventQueue::default());
        world.insert_resource(AiTimers::default());
        world
    }

    #[test]
    fn test_purchase_buys_tank_when_rich() {
        let mut world = purchase_world(700.0, vec![City::new(400.0, 100.0, Owner::Hostile)]);
        assert_eq!(hostile_purchase(&mut world), Some(UnitKind::Tank));
        assert!((world.resource::<Treasury>().hostile - 200.0).abs() < 1e-4);

        let mut query = world.query::<(&Side, &UnitKind)>();
        let (side, kind) = query.single(&world);
        assert_eq!(*side, Side::Hostile);
        assert_eq!(*kind, UnitKind::Tank);
    }

    #[test]
    fn test_purchase_rules() {
        let config = SimConfig::default();
        assert_eq!(purchase_decision(599.0, 0, true, &config), Some(UnitKind::Troop));
        assert_eq!(purchase_decision(600.0, 0, true, &config), Some(UnitKind::Tank));
        assert_eq!(purchase_decision(349.0, 0, true, &config), None);
        assert_eq!(purchase_decision(5000.0, 20, true, &config), None);
        assert_eq!(purchase_decision(5000.0, 0, false, &config), None);
    }

    #[test]
    fn test_no_purchase_without_city() {
        let mut world = purchase_world(5000.0, vec![City::new(400.0, 100.0, Owner::Player)]);
        assert_eq!(hostile_purchase(&mut world), None);
        assert_eq!(world.resource::<Treasury>().hostile, 5000.0);
        assert!(world.resource::<EventQueue>().0.is_empty());
    }

    #[test]
    fn test_purchase_waits_for_interval() {
        let mut world = purchase_world(5000.0, vec![City::new(400.0, 100.0, Owner::Hostile)]);
        let mut schedule = Schedule::default();
        schedule.add_systems(ai_purchase_system);
        for _ in 0..44 {
            schedule.run(&mut world);
        }
        assert_eq!(world.resource::<Treasury>().hostile, 5000.0);
        schedule.run(&mut world);
        assert_eq!(world.resource::<Treasury>().hostile, 4500.0);
    }

    fn retarget_world(cities: Vec<City>) -> World {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(TerritoryGrid::new(40, 30, 20.0));
        world.insert_resource(CityRegistry::new(cities));
        world.insert_resource(SimRng::new(Some(3)));
        world.insert_resource(AiTimers::default());
        world
    }

    fn unit(id: u32, side: Side, x: f32, y: f32) -> UnitBundle {
        UnitBundle::new(UnitId(id), side, UnitKind::Troop, Position::new(x, y), &SimConfig::default())
    }

    #[test]
    fn test_retarget_waits_for_interval() {
        let mut world = retarget_world(vec![City::new(700.0, 500.0, Owner::Player)]);
        let scout = world.spawn(unit(1, Side::Hostile, 400.0, 100.0)).id();
        let mut schedule = Schedule::default();
        schedule.add_systems(ai_retarget_system);

        for _ in 0..19 {
            schedule.run(&mut world);
        }
        assert_eq!(*world.get::<Goal>(scout).unwrap(), Goal::new(400.0, 100.0));
        assert_eq!(world.resource::<AiTimers>().think, 19);

        schedule.run(&mut world);
        assert_eq!(*world.get::<Goal>(scout).unwrap(), Goal::new(700.0, 500.0));
        assert_eq!(world.resource::<AiTimers>().think, 0);
    }

    #[test]
    fn test_retarget_ignores_dead_units() {
        let mut world = retarget_world(vec![City::new(100.0, 100.0, Owner::Hostile)]);
        let scout = world.spawn(unit(1, Side::Hostile, 400.0, 100.0)).id();
        let fallen = world
            .spawn((
                UnitId(2),
                Side::Hostile,
                UnitKind::Troop,
                Position::new(300.0, 300.0),
                Goal::new(300.0, 300.0),
                Health { current: 0, max: 80 },
            ))
            .id();
        // A dead player unit right next to the scout is not a target.
        world.spawn((
            UnitId(3),
            Side::Player,
            UnitKind::Troop,
            Position::new(410.0, 110.0),
            Goal::new(410.0, 110.0),
            Health { current: 0, max: 80 },
        ));
        world.spawn(unit(4, Side::Player, 600.0, 500.0));

        let mut schedule = Schedule::default();
        schedule.add_systems(ai_retarget_system);
        for _ in 0..20 {
            schedule.run(&mut world);
        }

        assert_eq!(*world.get::<Goal>(scout).unwrap(), Goal::new(600.0, 500.0));
        assert_eq!(*world.get::<Goal>(fallen).unwrap(), Goal::new(300.0, 300.0));
    }

    #[test]
    fn test_kernel_center_dominates() {
        let grid = TerritoryGrid::new(10, 10, 20.0);
        let map = InfluenceMap::build(&grid, [(Position::new(50.0, 50.0), Side::Hostile)]);
        assert!((map.score(2, 2) - 1.0).abs() < 1e-6);
        assert!((map.score(3, 2) - 0.2).abs() < 1e-6);
        assert!((map.score(4, 4) - 0.05).abs() < 1e-6);
        assert_eq!(map.score(8, 8), 0.0);
        // The unit's own presence is not counted.
        assert!(map.score_excluding(2, 2, (2, 2)).abs() < 1e-6);
    }

    #[test]
    fn test_candidates_skip_hostile_territory() {
        let grid = TerritoryGrid::with_layout(40, 30, 20.0, TerritoryLayout::HorizontalSplit);
        let map = InfluenceMap::build(&grid, std::iter::empty());
        // Row 15 is the first player row; from row 14 only rows 15 and 16 qualify.
        let ((_, gy), _) = map.best_candidate(&grid, (10, 14)).unwrap();
        assert!(gy >= 15);
        // Deep in hostile territory nothing qualifies.
        assert!(map.best_candidate(&grid, (10, 2)).is_none());
    }

    #[test]
    fn test_weak_influence_falls_back_to_city_then_unit() {
        let config = SimConfig::default();
        let grid = TerritoryGrid::new(40, 30, 20.0);
        let map = InfluenceMap::build(&grid, std::iter::empty());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pos = Position::new(400.0, 100.0);

        let cities = CityRegistry::new(vec![
            City::new(100.0, 100.0, Owner::Hostile),
            City::new(700.0, 500.0, Owner::Player),
        ]);
        let goal = choose_goal(&mut rng, pos, &map, &grid, &cities, &[], &config).unwrap();
        assert_eq!(goal, Goal::new(700.0, 500.0));

        let all_hostile = CityRegistry::new(vec![City::new(100.0, 100.0, Owner::Hostile)]);
        let targets = [Position::new(600.0, 100.0), Position::new(420.0, 120.0)];
        let goal = choose_goal(&mut rng, pos, &map, &grid, &all_hostile, &targets, &config).unwrap();
        assert_eq!(goal, Goal::new(420.0, 120.0));

        assert!(choose_goal(&mut rng, pos, &map, &grid, &all_hostile, &[], &config).is_none());
    }

    #[test]
    fn test_strong_influence_targets_cell_with_jitter() {
        let config = SimConfig::default();
        let grid = TerritoryGrid::new(40, 30, 20.0);
        let pos = Position::new(205.0, 205.0);
        let friends = [
            (pos, Side::Hostile),
            (Position::new(245.0, 205.0), Side::Hostile),
            (Position::new(245.0, 205.0), Side::Hostile),
        ];
        let map = InfluenceMap::build(&grid, friends);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let cities = CityRegistry::new(vec![City::new(700.0, 500.0, Owner::Player)]);

        let goal = choose_goal(&mut rng, pos, &map, &grid, &cities, &[], &config).unwrap();
        // Strongest cell is (12, 10), centered at (250, 210).
        assert!((goal.x - 250.0).abs() <= 15.0);
        assert!((goal.y - 210.0).abs() <= 15.0);
    }
}
