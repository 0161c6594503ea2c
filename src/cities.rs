//! City registry - the fixed set of capturable points on a map.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Owner, Position, Side};

/// A capturable point. Its position never changes; only the owner does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub position: Position,
    pub owner: Owner,
}

impl City {
    pub fn new(x: f32, y: f32, owner: Owner) -> Self {
        Self { position: Position::new(x, y), owner }
    }
}

/// Index of a city within the registry. Stable for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityRef(pub usize);

/// Resource owning every city on the map.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityRegistry {
    cities: Vec<City>,
}

impl CityRegistry {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    pub fn get(&self, city: CityRef) -> Option<&City> {
        self.cities.get(city.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CityRef, &City)> {
        self.cities.iter().enumerate().map(|(i, c)| (CityRef(i), c))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (CityRef, &mut City)> {
        self.cities.iter_mut().enumerate().map(|(i, c)| (CityRef(i), c))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn owned_count(&self, side: Side) -> usize {
        self.cities.iter().filter(|c| c.owner.is(side)).count()
    }

    /// Cities currently held by `side`.
    pub fn owned_by(&self, side: Side) -> Vec<CityRef> {
        self.iter()
            .filter(|(_, c)| c.owner.is(side))
            .map(|(r, _)| r)
            .collect()
    }

    /// Closest city to `from` that `side` does not own.
    pub fn nearest_not_owned_by(&self, side: Side, from: Position) -> Option<(CityRef, &City)> {
        self.iter()
            .filter(|(_, c)| !c.owner.is(side))
            .min_by(|(_, a), (_, b)| {
                from.distance_to(&a.position)
                    .total_cmp(&from.distance_to(&b.position))
            })
    }
}
