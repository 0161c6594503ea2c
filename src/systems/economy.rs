//! Economy system - continuous income keyed to city ownership.

use bevy_ecs::prelude::*;

use crate::cities::CityRegistry;
use crate::components::Side;
use crate::config::SimConfig;
use crate::resources::{DeltaTime, MatchStats, Treasury};

/// Income per second for `side` holding `cities` cities.
pub fn income_rate(side: Side, cities: usize, config: &SimConfig) -> f32 {
    let base = match side {
        Side::Player => config.player_base_income,
        Side::Hostile => config.hostile_base_income,
    };
    base + cities as f32 * config.city_income
}

/// System that accrues income for both sides. Player income is also
/// recorded in the match stats.
pub fn economy_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    cities: Res<CityRegistry>,
    mut treasury: ResMut<Treasury>,
    mut stats: ResMut<MatchStats>,
) {
    let delta = dt.0;
    for side in [Side::Player, Side::Hostile] {
        let earned = income_rate(side, cities.owned_count(side), &config) * delta;
        *treasury.get_mut(side) += earned;
        if side == Side::Player {
            stats.money_earned += earned;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::City;
    use crate::components::Owner;

    #[test]
    fn test_income_rates() {
        let config = SimConfig::default();
        assert_eq!(income_rate(Side::Player, 0, &config), 10.0);
        assert_eq!(income_rate(Side::Hostile, 0, &config), 15.0);
        assert_eq!(income_rate(Side::Player, 3, &config), 70.0);
    }

    #[test]
    fn test_fractional_accrual() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.5));
        world.insert_resource(SimConfig::default());
        world.insert_resource(CityRegistry::new(vec![
            City::new(0.0, 0.0, Owner::Player),
            City::new(0.0, 0.0, Owner::Hostile),
            City::new(0.0, 0.0, Owner::Hostile),
        ]));
        world.insert_resource(Treasury::default());
        world.insert_resource(MatchStats::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(economy_system);
        schedule.run(&mut world);

        let treasury = world.resource::<Treasury>();
        assert!((treasury.player - 15.0).abs() < 1e-4);
        assert!((treasury.hostile - 27.5).abs() < 1e-4);
        assert!((world.resource::<MatchStats>().money_earned - 15.0).abs() < 1e-4);
    }
}
