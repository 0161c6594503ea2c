//! Semantic events emitted by the simulation for a presentation layer.
//!
//! The core never plays sounds or spawns particles. It queues what happened
//! and the caller drains the queue once per frame.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cities::CityRef;
use crate::components::{Owner, Position, Side, UnitId, UnitKind};
use crate::resources::Outcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    UnitSpawned {
        id: UnitId,
        side: Side,
        kind: UnitKind,
        position: Position,
    },
    UnitDied {
        id: UnitId,
        side: Side,
        kind: UnitKind,
        position: Position,
    },
    CityCaptured {
        city: CityRef,
        from: Owner,
        to: Owner,
    },
    UnitPurchased {
        side: Side,
        kind: UnitKind,
        city: CityRef,
        cost: f32,
    },
    /// A versus resolution turn ran out and orders reopen.
    TurnResolved,
    MatchEnded(Outcome),
}

/// Pending events, oldest first.
#[derive(Resource, Debug, Default)]
pub struct EventQueue(pub Vec<MatchEvent>);

impl EventQueue {
    pub fn push(&mut self, event: MatchEvent) {
        self.0.push(event);
    }

    pub fn drain(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.0)
    }
}
