//! Collectibles, the tool catalogue and per-level item placement.

mod registry;
mod spawner;
mod tools;

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Pos;

pub use registry::{ItemPickup, ItemRegistry};
pub use spawner::{ItemSpawnOptions, ItemSpawner};
pub use tools::{Clock, SystemClock, ToolState};

/// Tools in bit order. A tool's unlock bit is `1 << index` in this list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    BasicTorch,
    Compass,
    MapFragment,
    RunningBoots,
    SkeletonKey,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolDefinition {
    pub id: ToolId,
    pub unlock_level: u32,
    /// `None` for tools that stay active until replaced or consumed.
    pub duration_ms: Option<i64>,
    pub visibility_bonus: f64,
    pub speed_multiplier: f64,
    pub one_shot: bool,
}

impl ToolId {
    pub const ALL: [ToolId; 5] = [
        ToolId::BasicTorch,
        ToolId::Compass,
        ToolId::MapFragment,
        ToolId::RunningBoots,
        ToolId::SkeletonKey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasicTorch => "basic_torch",
            Self::Compass => "compass",
            Self::MapFragment => "map_fragment",
            Self::RunningBoots => "running_boots",
            Self::SkeletonKey => "skeleton_key",
        }
    }

    pub fn bit(self) -> u32 {
        let index = Self::ALL.iter().position(|&tool| tool == self).unwrap_or(0);
        1 << index
    }

    pub fn definition(self) -> ToolDefinition {
        let base = ToolDefinition {
            id: self,
            unlock_level: 1,
            duration_ms: None,
            visibility_bonus: 0.0,
            speed_multiplier: 1.0,
            one_shot: false,
        };
        match self {
            Self::BasicTorch => {
                ToolDefinition { duration_ms: Some(60_000), visibility_bonus: 2.0, ..base }
            }
            Self::Compass => ToolDefinition { unlock_level: 5, ..base },
            Self::MapFragment => ToolDefinition { unlock_level: 10, one_shot: true, ..base },
            Self::RunningBoots => ToolDefinition {
                unlock_level: 15,
                duration_ms: Some(30_000),
                speed_multiplier: 1.3,
                ..base
            },
            Self::SkeletonKey => ToolDefinition { unlock_level: 20, one_shot: true, ..base },
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownId(pub String);

impl fmt::Display for UnknownId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised id `{}`", self.0)
    }
}

impl FromStr for ToolId {
    type Err = UnknownId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == value)
            .ok_or_else(|| UnknownId(value.to_string()))
    }
}

pub fn has_tool_unlocked(mask: u32, tool: ToolId) -> bool {
    mask & tool.bit() != 0
}

pub fn unlock_tool(mask: u32, tool: ToolId) -> u32 {
    mask | tool.bit()
}

/// The tool whose drop belongs to `level`, if any.
pub fn tool_unlocked_at_level(level: u32) -> Option<ToolId> {
    ToolId::ALL.into_iter().find(|tool| tool.definition().unlock_level == level)
}

/// Anything that can be picked up from a maze tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collectible {
    MazeShard,
    WayfinderStone,
    Tool(ToolId),
}

impl Collectible {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MazeShard => "maze_shard",
            Self::WayfinderStone => "wayfinder_stone",
            Self::Tool(tool) => tool.as_str(),
        }
    }
}

impl FromStr for Collectible {
    type Err = UnknownId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "maze_shard" => Ok(Self::MazeShard),
            "wayfinder_stone" => Ok(Self::WayfinderStone),
            other => other.parse().map(Self::Tool),
        }
    }
}

impl Serialize for Collectible {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Collectible {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpawn {
    /// `item_<level>_<spawn index>`, stable across regenerations so save
    /// codes can name picked-up spawns.
    pub id: String,
    pub item: Collectible,
    pub tile: Pos,
}

pub(crate) fn item_id(level: u32, index: usize) -> String {
    format!("item_{level}_{index}")
}
