//! Portable save codes: progress as checksummed, versioned text.

mod codec;
mod migrate;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{ToolId, UnknownId};

pub use codec::{SAVE_CODE_PREFIX, SaveCodec};

/// Payload version written by [`SaveCodec::encode`].
pub const CURRENT_SAVE_VERSION: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerCharacterId {
    #[default]
    Adventurer,
    Knight,
    Rogue,
    Ranger,
}

impl PlayerCharacterId {
    pub const ALL: [PlayerCharacterId; 4] = [
        PlayerCharacterId::Adventurer,
        PlayerCharacterId::Knight,
        PlayerCharacterId::Rogue,
        PlayerCharacterId::Ranger,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adventurer => "adventurer",
            Self::Knight => "knight",
            Self::Rogue => "rogue",
            Self::Ranger => "ranger",
        }
    }
}

impl FromStr for PlayerCharacterId {
    type Err = UnknownId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|character| character.as_str() == value)
            .ok_or_else(|| UnknownId(value.to_string()))
    }
}

/// Everything a save code carries. Keys use the camelCase names of the
/// wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub version: u32,
    pub seed: String,
    pub player_character_id: PlayerCharacterId,
    pub current_maze: u32,
    /// Tool unlock bits, see [`ToolId::bit`].
    pub unlocked_tools: u32,
    pub inventory: Vec<u32>,
    /// Ascending, without duplicates.
    pub completed_mazes: Vec<u32>,
    pub artifacts: u32,
    /// Whole seconds of play.
    pub playtime: u64,
    /// Playtime at which each level was first entered.
    pub maze_first_entry_times: BTreeMap<u32, u64>,
    /// Seconds from first entry to first completion, per level.
    pub maze_first_completion_times: BTreeMap<u32, u64>,
    pub active_tool_id: Option<ToolId>,
    /// Milliseconds since the Unix epoch.
    pub active_tool_expiry: Option<i64>,
    pub collected_shards: u32,
    pub picked_up_items: BTreeMap<u32, Vec<String>>,
    pub portal_hub_unlocked: bool,
}

impl SaveState {
    /// Fresh progress for a new run, standing at the entry of level 1.
    pub fn new_game(seed: impl Into<String>, character: PlayerCharacterId) -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            seed: seed.into(),
            player_character_id: character,
            current_maze: 1,
            unlocked_tools: 0,
            inventory: Vec::new(),
            completed_mazes: Vec::new(),
            artifacts: 0,
            playtime: 0,
            maze_first_entry_times: BTreeMap::from([(1, 0)]),
            maze_first_completion_times: BTreeMap::new(),
            active_tool_id: None,
            active_tool_expiry: None,
            collected_shards: 0,
            picked_up_items: BTreeMap::new(),
            portal_hub_unlocked: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveErrorCode {
    InvalidFormat,
    ChecksumMismatch,
    UnsupportedVersion,
    DecodeFailed,
}

impl SaveErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::ChecksumMismatch => "checksum_mismatch",
            Self::UnsupportedVersion => "unsupported_version",
            Self::DecodeFailed => "decode_failed",
        }
    }
}

impl fmt::Display for SaveErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected save code. `message` is suitable for showing to the player.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} ({code})")]
pub struct SaveError {
    pub code: SaveErrorCode,
    pub message: String,
}

impl SaveError {
    pub(crate) fn new(code: SaveErrorCode) -> Self {
        let message = match code {
            SaveErrorCode::InvalidFormat | SaveErrorCode::DecodeFailed => "Code format is invalid",
            SaveErrorCode::ChecksumMismatch => "Code failed validation",
            SaveErrorCode::UnsupportedVersion => "Code version not supported",
        };
        Self { code, message: message.to_string() }
    }
}
