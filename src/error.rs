//! Rejections returned by command entry points.
//!
//! None of these are fatal. A rejected command simply has no effect on the match.

use crate::cities::CityRef;
use crate::resources::MatchPhase;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("no valid spawn point found near the requested anchor")]
    PlacementFailed,

    #[error("insufficient funds: need {cost}, have {available:.0}")]
    InsufficientFunds { cost: f32, available: f32 },

    #[error("command not allowed during {0:?}")]
    WrongPhase(MatchPhase),

    #[error("city {0:?} is not owned by the acting side")]
    NotOwner(CityRef),

    #[error("no city {0:?} on this map")]
    UnknownCity(CityRef),

    #[error("placement outside the side's spawn zone")]
    OutsideSpawnZone,

    #[error("unit cap reached")]
    UnitCapReached,
}
