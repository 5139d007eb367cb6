use std::cmp::Reverse;
use std::collections::BTreeSet;

use log::debug;

use crate::config::{WayfinderRange, WorldConfig};
use crate::mapgen::MazeInstance;
use crate::mapgen::grid::reachable_from_entry;
use crate::mapgen::progression::shard_count;
use crate::seed::SeededRandom;
use crate::types::Pos;

use super::{Collectible, ItemSpawn, has_tool_unlocked, item_id, tool_unlocked_at_level};

/// Player progress that shapes a level's drops.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemSpawnOptions<'a> {
    pub player_seed: &'a str,
    pub wayfinder_collected: bool,
    /// Spawn ids removed from the returned list.
    pub picked_up_spawn_ids: &'a [String],
    pub unlocked_tools_mask: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ItemSpawner {
    wayfinder: WayfinderRange,
}

impl From<&WorldConfig> for ItemSpawner {
    fn from(config: &WorldConfig) -> Self {
        Self::new(config.wayfinder)
    }
}

impl ItemSpawner {
    pub fn new(wayfinder: WayfinderRange) -> Self {
        Self { wayfinder: wayfinder.sorted() }
    }

    /// The one level of this run that carries the wayfinder stone.
    pub fn wayfinder_target_level(&self, player_seed: &str) -> u32 {
        let mut random = SeededRandom::derived(player_seed, "wayfinder-maze");
        let level =
            random.next_int(i64::from(self.wayfinder.min_level), i64::from(self.wayfinder.max_level));
        u32::try_from(level).unwrap_or(self.wayfinder.min_level)
    }

    /// Shards first, then the level's tool drop, then the wayfinder stone.
    /// Spawn indices are assigned before picked-up spawns are filtered, so
    /// ids stay stable across visits.
    pub fn spawn_items(&self, maze: &MazeInstance, options: &ItemSpawnOptions<'_>) -> Vec<ItemSpawn> {
        let mut random = SeededRandom::derived(&maze.seed, "items");
        let passable: Vec<Pos> = reachable_from_entry(maze)
            .into_iter()
            .filter(|&tile| tile != maze.entry && tile != maze.exit)
            .collect();
        let dead_ends: Vec<Pos> = passable
            .iter()
            .copied()
            .filter(|&tile| maze.passable_neighbor_count(tile) == 1)
            .collect();

        let mut available = dead_ends.clone();
        random.shuffle(&mut available);
        let mut occupied = BTreeSet::new();
        let mut spawns = Vec::new();

        let mut add_spawn = |item: Collectible, tile: Pos, occupied: &mut BTreeSet<Pos>| {
            spawns.push(ItemSpawn { id: item_id(maze.level, spawns.len()), item, tile });
            occupied.insert(tile);
        };

        for _ in 0..shard_count(maze.level) {
            let Some(tile) = take_free(&mut available, &occupied) else {
                break;
            };
            add_spawn(Collectible::MazeShard, tile, &mut occupied);
        }

        let farthest_dead_ends = farthest_first(&dead_ends, maze.entry);
        if let Some(tool) = tool_unlocked_at_level(maze.level)
            && !has_tool_unlocked(options.unlocked_tools_mask, tool)
            && let Some(tile) = first_free(&farthest_dead_ends, &occupied)
        {
            add_spawn(Collectible::Tool(tool), tile, &mut occupied);
        }

        if !options.wayfinder_collected
            && maze.level == self.wayfinder_target_level(options.player_seed)
        {
            let tile = first_free(&farthest_dead_ends, &occupied)
                .or_else(|| first_free(&farthest_first(&passable, maze.entry), &occupied));
            if let Some(tile) = tile {
                add_spawn(Collectible::WayfinderStone, tile, &mut occupied);
            }
        }

        debug!("level {} ({}): spawned {} items", maze.level, maze.seed, spawns.len());

        spawns.retain(|spawn| !options.picked_up_spawn_ids.contains(&spawn.id));
        spawns
    }
}

/// Pops shuffled candidates from the back until one is unoccupied.
fn take_free(available: &mut Vec<Pos>, occupied: &BTreeSet<Pos>) -> Option<Pos> {
    while let Some(tile) = available.pop() {
        if !occupied.contains(&tile) {
            return Some(tile);
        }
    }
    None
}

fn first_free(tiles: &[Pos], occupied: &BTreeSet<Pos>) -> Option<Pos> {
    tiles.iter().copied().find(|tile| !occupied.contains(tile))
}

/// Stable sort by straight-line distance from `origin`, farthest first.
fn farthest_first(tiles: &[Pos], origin: Pos) -> Vec<Pos> {
    let mut sorted = tiles.to_vec();
    sorted.sort_by_key(|&tile| Reverse(tile.distance_squared(origin)));
    sorted
}
