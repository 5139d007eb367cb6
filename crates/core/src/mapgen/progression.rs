//! Level progression rules: grid size, tuning scalars, exit difficulty tiers
//! and the per-level hazard and collectible counts.

use serde::Serialize;

use crate::seed::{SeededRandom, hash_hex};

use super::model::MazeParams;

pub const STARTING_LEVEL: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ExitDifficultyProfile {
    pub min_distance_ratio: f64,
    pub prefer_dead_end: bool,
    pub min_absolute_distance: u32,
}

struct ExitDifficultyTier {
    max_level: u32,
    profile: ExitDifficultyProfile,
}

const EXIT_DIFFICULTY_TIERS: [ExitDifficultyTier; 3] = [
    ExitDifficultyTier {
        max_level: 3,
        profile: ExitDifficultyProfile {
            min_distance_ratio: 0.55,
            prefer_dead_end: false,
            min_absolute_distance: 5,
        },
    },
    ExitDifficultyTier {
        max_level: 8,
        profile: ExitDifficultyProfile {
            min_distance_ratio: 0.68,
            prefer_dead_end: false,
            min_absolute_distance: 7,
        },
    },
    ExitDifficultyTier {
        max_level: u32::MAX,
        profile: ExitDifficultyProfile {
            min_distance_ratio: 0.75,
            prefer_dead_end: true,
            min_absolute_distance: 8,
        },
    },
];

pub fn exit_difficulty_profile(level: u32) -> ExitDifficultyProfile {
    EXIT_DIFFICULTY_TIERS
        .iter()
        .find(|tier| level <= tier.max_level)
        .map_or(EXIT_DIFFICULTY_TIERS[EXIT_DIFFICULTY_TIERS.len() - 1].profile, |tier| tier.profile)
}

pub fn maze_params(player_seed: &str, level: u32) -> MazeParams {
    let size = maze_size(level);
    let level_f = f64::from(level);
    MazeParams {
        level,
        width: size,
        height: size,
        seed: hash_hex(&format!("{player_seed}:{level}")),
        complexity: (0.3 + level_f * 0.02).min(0.8),
        dead_end_ratio: (0.1 + level_f * 0.01).min(0.4),
        loop_chance: loop_chance(level),
        room_chance: 0.0,
    }
}

pub(crate) fn maze_size(level: u32) -> usize {
    match level {
        0..=3 => 8,
        4..=8 => 10,
        _ => 10 + ((level - 9) / 5) as usize * 2,
    }
}

fn loop_chance(level: u32) -> f64 {
    if level <= 3 {
        return 0.02;
    }
    (0.03 + f64::from(level) * 0.005).min(0.18)
}

pub(crate) fn one_way_door_count(level: u32, random: &mut SeededRandom) -> usize {
    match level {
        0..=5 => 0,
        6..=10 => 1,
        11..=15 => random.next_int(1, 2) as usize,
        16..=20 => random.next_int(2, 3) as usize,
        _ => random.next_int(3, 4) as usize,
    }
}

pub(crate) fn pressure_plate_pair_count(level: u32, random: &mut SeededRandom) -> usize {
    match level {
        0..=10 => 0,
        11..=15 => 1,
        16..=20 => random.next_int(1, 2) as usize,
        _ => random.next_int(2, 3) as usize,
    }
}

pub(crate) fn locked_door_count(level: u32) -> usize {
    match level {
        0..=10 => 0,
        11..=20 => 1,
        _ => 2,
    }
}

pub(crate) fn shard_count(level: u32) -> usize {
    match level {
        0..=5 => 1,
        6..=15 => 2,
        _ => 3,
    }
}
