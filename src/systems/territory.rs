//! Territory systems - unit footprints and city capture.

use bevy_ecs::prelude::*;

use crate::cities::CityRegistry;
use crate::components::*;
use crate::config::SimConfig;
use crate::events::{EventQueue, MatchEvent};
use crate::territory::{TerritoryGrid, Tint};

/// System that stamps every live unit's footprint onto the territory grid.
/// Player units paint first, hostile units second.
pub fn territory_paint_system(
    config: Res<SimConfig>,
    mut grid: ResMut<TerritoryGrid>,
    query: Query<(&Position, &Side, &Health)>,
) {
    for painter in [Side::Player, Side::Hostile] {
        for (pos, side, health) in query.iter() {
            if *side == painter && health.is_alive() {
                grid.paint(*pos, painter, config.paint_radius_cells);
            }
        }
    }
}

/// New owner for a city given the tint under it, or `None` if it holds.
pub fn capture_transition(owner: Owner, tint: Tint) -> Option<Owner> {
    match (owner, tint) {
        (Owner::Hostile, Tint::Player) => Some(Owner::Player),
        (Owner::Player, Tint::Hostile) => Some(Owner::Hostile),
        (Owner::Neutral, Tint::Player) => Some(Owner::Player),
        (Owner::Neutral, Tint::Hostile) => Some(Owner::Hostile),
        _ => None,
    }
}

/// System that hands each city to whichever side's tint sits under it.
/// Every city is evaluated once per tick, so no city changes hands twice.
pub fn city_capture_system(
    grid: Res<TerritoryGrid>,
    mut cities: ResMut<CityRegistry>,
    mut events: ResMut<EventQueue>,
) {
    for (city_ref, city) in cities.iter_mut() {
        let tint = grid.sample_owner_at(city.position);
        if let Some(to) = capture_transition(city.owner, tint) {
            tracing::debug!(city = city_ref.0, from = ?city.owner, to = ?to, "city captured");
            events.push(MatchEvent::CityCaptured { city: city_ref, from: city.owner, to });
            city.owner = to;
        }
    }
}
