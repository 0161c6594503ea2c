//! Versus turn countdown.

use bevy_ecs::prelude::*;

use crate::components::{Goal, Position, Side};
use crate::events::{EventQueue, MatchEvent};
use crate::resources::MatchPhase;

/// System that counts down a resolution turn. When it runs out, every unit
/// is told to hold where it stands and the player gets the next orders phase.
pub fn turn_countdown_system(
    mut phase: ResMut<MatchPhase>,
    mut events: ResMut<EventQueue>,
    mut query: Query<(&Position, &mut Goal)>,
) {
    let MatchPhase::Resolving { remaining } = *phase else {
        return;
    };

    let remaining = remaining.saturating_sub(1);
    if remaining > 0 {
        *phase = MatchPhase::Resolving { remaining };
        return;
    }

    for (pos, mut goal) in query.iter_mut() {
        *goal = Goal::hold(*pos);
    }
    *phase = MatchPhase::Orders(Side::Player);
    events.push(MatchEvent::TurnResolved);
    tracing::info!("turn resolved, orders reopen");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_runs_out_and_units_hold() {
        let mut world = World::new();
        world.insert_resource(MatchPhase::Resolving { remaining: 3 });
        world.insert_resource(EventQueue::default());
        let unit = world.spawn((Position::new(10.0, 10.0), Goal::new(500.0, 500.0))).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(turn_countdown_system);

        schedule.run(&mut world);
        schedule.run(&mut world);
        assert_eq!(*world.resource::<MatchPhase>(), MatchPhase::Resolving { remaining: 1 });
        assert_eq!(world.get::<Goal>(unit).unwrap().x, 500.0);

        schedule.run(&mut world);
        assert_eq!(*world.resource::<MatchPhase>(), MatchPhase::Orders(Side::Player));
        assert_eq!(*world.get::<Goal>(unit).unwrap(), Goal::new(10.0, 10.0));
        assert_eq!(world.resource::<EventQueue>().0, vec![MatchEvent::TurnResolved]);
    }

    #[test]
    fn test_other_phases_untouched() {
        let mut world = World::new();
        world.insert_resource(MatchPhase::Active);
        world.insert_resource(EventQueue::default());
        let mut schedule = Schedule::default();
        schedule.add_systems(turn_countdown_system);
        schedule.run(&mut world);
        assert_eq!(*world.resource::<MatchPhase>(), MatchPhase::Active);
    }
}
