//! Payload upgrades and field sanitizing.
//!
//! Each version has one upgrade step to the next; decoding applies them in
//! sequence until the payload reaches [`CURRENT_SAVE_VERSION`].

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Value, json};

use crate::items::ToolId;

use super::{CURRENT_SAVE_VERSION, PlayerCharacterId, SaveError, SaveErrorCode, SaveState};

type Payload = Map<String, Value>;
type Upgrade = fn(&mut Payload);

/// `(from_version, step)` pairs; step `n` yields a version `n + 1` payload.
const UPGRADES: [(u32, Upgrade); 1] = [(1, upgrade_v1_to_v2)];

pub(crate) fn migrate(payload: &mut Payload, from_version: u32) -> Result<(), SaveError> {
    let mut version = from_version;
    while version < CURRENT_SAVE_VERSION {
        let Some((_, upgrade)) = UPGRADES.iter().find(|(from, _)| *from == version) else {
            return Err(SaveError::new(SaveErrorCode::UnsupportedVersion));
        };
        upgrade(payload);
        version += 1;
        payload.insert("version".to_string(), json!(version));
        debug!("save payload upgraded to version {version}");
    }
    Ok(())
}

/// Version 1 predates tools, shards, pickups and the portal hub. Whatever a
/// v1 payload holds under those keys is discarded.
fn upgrade_v1_to_v2(payload: &mut Payload) {
    payload.insert("activeToolId".to_string(), Value::Null);
    payload.insert("activeToolExpiry".to_string(), Value::Null);
    payload.insert("collectedShards".to_string(), json!(0));
    payload.insert("pickedUpItems".to_string(), json!({}));
    payload.insert("portalHubUnlocked".to_string(), json!(false));
    payload.entry("mazeFirstEntryTimes").or_insert_with(|| json!({}));
    payload.entry("mazeFirstCompletionTimes").or_insert_with(|| json!({}));
    payload
        .entry("playerCharacterId")
        .or_insert_with(|| json!(PlayerCharacterId::default().as_str()));
}

/// Builds a [`SaveState`] from a current-version payload. Only `seed` and
/// `currentMaze` are mandatory; every other field falls back to its
/// new-game value when missing or malformed.
pub(crate) fn sanitize(payload: &Payload) -> Option<SaveState> {
    let seed = payload.get("seed")?.as_str()?.to_string();
    let current_maze = whole_number(payload.get("currentMaze")?)?;

    Some(SaveState {
        version: CURRENT_SAVE_VERSION,
        seed,
        player_character_id: payload
            .get("playerCharacterId")
            .and_then(Value::as_str)
            .and_then(|id| id.parse().ok())
            .unwrap_or_default(),
        current_maze: u32::try_from(current_maze).ok()?,
        unlocked_tools: u32_field(payload, "unlockedTools"),
        inventory: u32_list(payload.get("inventory")),
        completed_mazes: completed_levels(payload.get("completedMazes")),
        artifacts: u32_field(payload, "artifacts"),
        playtime: payload.get("playtime").and_then(whole_number).unwrap_or(0),
        maze_first_entry_times: timing_map(payload.get("mazeFirstEntryTimes")),
        maze_first_completion_times: timing_map(payload.get("mazeFirstCompletionTimes")),
        active_tool_id: payload
            .get("activeToolId")
            .and_then(Value::as_str)
            .and_then(|id| id.parse::<ToolId>().ok()),
        active_tool_expiry: payload.get("activeToolExpiry").and_then(whole_millis),
        collected_shards: u32_field(payload, "collectedShards"),
        picked_up_items: picked_up_items(payload.get("pickedUpItems")),
        portal_hub_unlocked: payload.get("portalHubUnlocked").is_some_and(truthy),
    })
}

/// Non-negative finite number, floored. Integers are read exactly.
fn whole_number(value: &Value) -> Option<u64> {
    if let Some(number) = value.as_u64() {
        return Some(number);
    }
    let number = value.as_f64().filter(|number| number.is_finite() && *number >= 0.0)?;
    Some(number.floor() as u64)
}

/// Epoch milliseconds, floored. Integers are read exactly.
fn whole_millis(value: &Value) -> Option<i64> {
    if let Some(millis) = value.as_i64() {
        return Some(millis);
    }
    let millis = value.as_f64().filter(|millis| millis.is_finite())?;
    Some(millis.floor() as i64)
}

fn u32_field(payload: &Payload, key: &str) -> u32 {
    payload
        .get(key)
        .and_then(whole_number)
        .and_then(|number| u32::try_from(number).ok())
        .unwrap_or(0)
}

fn u32_list(value: Option<&Value>) -> Vec<u32> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(whole_number)
                .filter_map(|number| u32::try_from(number).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn completed_levels(value: Option<&Value>) -> Vec<u32> {
    let mut levels = u32_list(value);
    levels.retain(|&level| level > 0);
    levels.sort_unstable();
    levels.dedup();
    levels
}

fn level_key(key: &str) -> Option<u32> {
    key.parse::<u32>().ok().filter(|&level| level > 0)
}

/// Drops entries with non-level keys or negative or non-numeric seconds.
fn timing_map(value: Option<&Value>) -> BTreeMap<u32, u64> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, seconds)| Some((level_key(key)?, whole_number(seconds)?)))
        .collect()
}

fn picked_up_items(value: Option<&Value>) -> BTreeMap<u32, Vec<String>> {
    let Some(entries) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, ids)| {
            let ids: Vec<String> =
                ids.as_array()?.iter().filter_map(Value::as_str).map(str::to_string).collect();
            (!ids.is_empty()).then_some((level_key(key)?, ids))
        })
        .collect()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
