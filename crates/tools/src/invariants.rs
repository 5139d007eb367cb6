//! Property checks over generated levels and save codes, shared by the
//! `fuzz` binary and its tests. Each check reports the first violation.

use std::collections::BTreeSet;

use maze_core::hazards::{HazardKind, HazardSpawnConfig, HazardSpawner};
use maze_core::items::{ItemSpawnOptions, ItemSpawner};
use maze_core::mapgen::{exit_difficulty_profile, has_path};
use maze_core::{CellKind, MazeInstance, SaveCodec, SaveErrorCode, SaveState, WorldConfig, generate_level};

/// Generates `level` of `player_seed` and checks every generation, hazard
/// and item invariant. Returns the level fingerprint.
pub fn check_level(player_seed: &str, level: u32, config: &WorldConfig) -> Result<u64, String> {
    let maze = generate_level(player_seed, level).map_err(|error| error.to_string())?;
    let again = generate_level(player_seed, level).map_err(|error| error.to_string())?;
    if maze != again {
        return Err(format!("level {level} of {player_seed} is not reproducible"));
    }
    if !has_path(&maze) {
        return Err(format!("level {level} of {player_seed} has no entry to exit path"));
    }
    check_exit_distance(&maze)?;
    check_hazards(&maze, config)?;
    check_items(&maze, player_seed, config)?;
    Ok(maze.fingerprint())
}

fn check_exit_distance(maze: &MazeInstance) -> Result<(), String> {
    let distances = maze.bfs_distances(maze.entry);
    let exit_distance = distances.get(&maze.exit).copied().unwrap_or(0);
    let profile = exit_difficulty_profile(maze.level);
    let max_distance = distances.values().copied().max().unwrap_or(0);
    let required = profile
        .min_absolute_distance
        .max((f64::from(max_distance) * profile.min_distance_ratio).floor() as u32);
    let qualifying =
        distances.iter().any(|(&pos, &distance)| pos != maze.entry && distance >= required);

    if qualifying && exit_distance < required {
        return Err(format!("{}: exit {exit_distance} hops away, need {required}", maze.seed));
    }
    Ok(())
}

fn check_hazards(maze: &MazeInstance, config: &WorldConfig) -> Result<(), String> {
    let hazards = HazardSpawner::new(HazardSpawnConfig::from(config)).spawn_hazards(maze);
    let mut tiles = BTreeSet::new();

    for hazard in &hazards {
        if hazard.tile == maze.entry || hazard.tile == maze.exit {
            return Err(format!("{}: {} sits on entry or exit", maze.seed, hazard.id));
        }
        if maze.kind_at(hazard.tile) == CellKind::Wall {
            return Err(format!("{}: {} sits in a wall", maze.seed, hazard.id));
        }
        if !tiles.insert(hazard.tile) {
            return Err(format!("{}: {} shares its tile", maze.seed, hazard.id));
        }
        let HazardKind::PressurePlate { linked_door_id, color, .. } = &hazard.kind else {
            continue;
        };
        let linked = hazards.iter().find(|door| {
            &door.id == linked_door_id
                && matches!(&door.kind, HazardKind::PressurePlateDoor { color: door_color, .. } if door_color == color)
        });
        let Some(door) = linked else {
            return Err(format!("{}: {} has no matching door {linked_door_id}", maze.seed, hazard.id));
        };
        if hazard.tile.manhattan(door.tile) > config.plate_link_distance {
            return Err(format!("{}: {} is too far from {}", maze.seed, hazard.id, door.id));
        }
    }

    // One shortest route is kept hazard-free, so blocking every hazard tile
    // must leave the shortest distance unchanged.
    let mut blocked = maze.clone();
    for tile in &tiles {
        blocked.set_kind(*tile, CellKind::Wall);
    }
    let open = maze.bfs_distances(maze.entry).get(&maze.exit).copied();
    let without_hazards = blocked.bfs_distances(blocked.entry).get(&blocked.exit).copied();
    if open != without_hazards {
        return Err(format!("{}: hazards sit on the shortest route", maze.seed));
    }
    Ok(())
}

fn check_items(maze: &MazeInstance, player_seed: &str, config: &WorldConfig) -> Result<(), String> {
    let options = ItemSpawnOptions { player_seed, ..ItemSpawnOptions::default() };
    let spawns = ItemSpawner::from(config).spawn_items(maze, &options);
    let mut tiles = BTreeSet::new();

    for (index, spawn) in spawns.iter().enumerate() {
        if spawn.id != format!("item_{}_{index}", maze.level) {
            return Err(format!("{}: spawn {index} is named {}", maze.seed, spawn.id));
        }
        if spawn.tile == maze.entry || spawn.tile == maze.exit || !maze.is_passable(spawn.tile) {
            return Err(format!("{}: {} lies on a blocked or reserved tile", maze.seed, spawn.id));
        }
        if !tiles.insert(spawn.tile) {
            return Err(format!("{}: {} shares its tile", maze.seed, spawn.id));
        }
    }
    Ok(())
}

/// Round-trips `state` and checks that altering the character at
/// `tamper_index` of its code is rejected.
pub fn check_save_code(state: &SaveState, tamper_index: usize) -> Result<(), String> {
    let code = SaveCodec::encode(state);
    let decoded = SaveCodec::decode(&code).map_err(|error| format!("own code rejected: {error}"))?;
    if &decoded != state {
        return Err(format!("round trip changed the state of seed {:?}", state.seed));
    }

    let index = tamper_index % code.len();
    let replacement = if code.as_bytes()[index] == b'0' { "1" } else { "0" };
    let mut tampered = code.clone();
    tampered.replace_range(index..=index, replacement);
    match SaveCodec::decode(&tampered) {
        Err(error)
            if matches!(error.code, SaveErrorCode::ChecksumMismatch | SaveErrorCode::InvalidFormat) =>
        {
            Ok(())
        }
        Err(error) => Err(format!("tampering index {index} gave {}", error.code)),
        Ok(_) => Err(format!("tampering index {index} went unnoticed")),
    }
}
