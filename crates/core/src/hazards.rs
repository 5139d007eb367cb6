//! Hazard records shared by the spawner and the per-level runtime.

mod runtime;
mod spawner;

use serde::Serialize;

use crate::types::{Direction, PassageAxis, Pos};

pub use runtime::{DoorTransition, HazardKey, HazardRuntime, KeyRing};
pub use spawner::{HazardSpawnConfig, HazardSpawner};

/// Visual grouping for plate/door pairs. Carries no behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateColor {
    Red,
    Blue,
    Green,
    Amber,
}

impl PlateColor {
    pub const PALETTE: [PlateColor; 4] =
        [PlateColor::Red, PlateColor::Blue, PlateColor::Green, PlateColor::Amber];
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HazardKind {
    OneWayDoor {
        allowed_direction: Direction,
    },
    LockedDoor {
        requires_key: bool,
        axis: PassageAxis,
        open: bool,
    },
    PressurePlate {
        linked_door_id: String,
        color: PlateColor,
        active: bool,
    },
    PressurePlateDoor {
        color: PlateColor,
        axis: PassageAxis,
        close_delay_seconds: f64,
        open: bool,
        close_timer_seconds: Option<f64>,
    },
}

impl HazardKind {
    pub fn glyph(&self) -> char {
        match self {
            Self::OneWayDoor { allowed_direction: Direction::East } => '>',
            Self::OneWayDoor { allowed_direction: Direction::West } => '<',
            Self::OneWayDoor { allowed_direction: Direction::North } => '^',
            Self::OneWayDoor { allowed_direction: Direction::South } => 'v',
            Self::LockedDoor { .. } => 'L',
            Self::PressurePlate { .. } => 'o',
            Self::PressurePlateDoor { .. } => 'D',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HazardInstance {
    /// `hazard_<level>_<spawn index>`, stable across regenerations.
    pub id: String,
    pub tile: Pos,
    #[serde(flatten)]
    pub kind: HazardKind,
}

pub(crate) fn hazard_id(level: u32, index: usize) -> String {
    format!("hazard_{level}_{index}")
}
