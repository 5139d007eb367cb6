//! One run of the game: progress, the levels generated so far and the live
//! per-level systems, composed behind a small move/step interface.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::{debug, info};

use crate::config::WorldConfig;
use crate::hazards::{DoorTransition, HazardRuntime, HazardSpawnConfig, HazardSpawner};
use crate::items::{
    Clock, Collectible, ItemPickup, ItemRegistry, ItemSpawn, ItemSpawnOptions, ItemSpawner,
    SystemClock, ToolId, ToolState, unlock_tool,
};
use crate::mapgen::{GenerationError, MazeInstance, generate_level};
use crate::save::{PlayerCharacterId, SaveState};
use crate::types::{Direction, Pos};
use crate::visibility::{VisibilityEngine, VisibilityUpdate};

/// Where the player appears when a level is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnPoint {
    Entry,
    /// Used when backtracking or portal travel reaches a completed level.
    Exit,
}

/// What happened during one [`GameSession::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepEvents {
    pub expired_tool: Option<ToolId>,
    pub door_transitions: Vec<DoorTransition>,
    /// Present when the player changed tile or the sight radius changed.
    pub visibility: Option<VisibilityUpdate>,
    pub pickups: Vec<ItemPickup>,
}

/// Items of one level: the spawn list rolled on first visit and the ids
/// collected since.
#[derive(Clone, Debug, Default)]
struct LevelItems {
    spawns: Option<Vec<ItemSpawn>>,
    picked_up: Vec<String>,
}

impl LevelItems {
    fn remaining(&self) -> Vec<ItemSpawn> {
        self.spawns
            .iter()
            .flatten()
            .filter(|spawn| !self.picked_up.contains(&spawn.id))
            .cloned()
            .collect()
    }
}

pub struct GameSession<C: Clock = SystemClock> {
    config: WorldConfig,
    progress: SaveState,
    playtime_seconds: f64,
    hazard_spawner: HazardSpawner,
    item_spawner: ItemSpawner,
    visibility: VisibilityEngine,
    /// Every level generated this run. A level is never re-rolled.
    mazes: BTreeMap<u32, MazeInstance>,
    level_items: BTreeMap<u32, LevelItems>,
    hazards: HazardRuntime,
    items: ItemRegistry,
    tools: ToolState<C>,
    player_tile: Pos,
    sight_radius: f64,
}

impl GameSession {
    pub fn new_game(
        seed: &str,
        character: PlayerCharacterId,
        config: WorldConfig,
    ) -> Result<Self, GenerationError> {
        Self::from_save_state(SaveState::new_game(seed, character), config)
    }

    pub fn from_save_state(state: SaveState, config: WorldConfig) -> Result<Self, GenerationError> {
        Self::with_clock(state, config, SystemClock)
    }
}

impl<C: Clock> GameSession<C> {
    /// Restores `state` and enters its current level at the entry.
    pub fn with_clock(
        state: SaveState,
        config: WorldConfig,
        clock: C,
    ) -> Result<Self, GenerationError> {
        let mut tools = ToolState::new(clock);
        tools.sync(state.active_tool_id, state.active_tool_expiry);

        let level_items = state
            .picked_up_items
            .iter()
            .map(|(&level, ids)| (level, LevelItems { spawns: None, picked_up: ids.clone() }))
            .collect();
        let level = state.current_maze.max(1);

        let mut session = Self {
            hazard_spawner: HazardSpawner::new(HazardSpawnConfig::from(&config)),
            item_spawner: ItemSpawner::from(&config),
            sight_radius: config.base_visibility_radius,
            config,
            playtime_seconds: state.playtime as f64,
            progress: state,
            visibility: VisibilityEngine::new(),
            mazes: BTreeMap::new(),
            level_items,
            hazards: HazardRuntime::new(),
            items: ItemRegistry::new(),
            tools,
            player_tile: Pos::new(0, 0),
        };
        session.enter_level(level, SpawnPoint::Entry)?;
        info!("session started for seed {} at level {level}", session.progress.seed);
        Ok(session)
    }

    /// Progress in save-code form, including the equipped tool and every
    /// pickup made so far.
    pub fn to_save_state(&self) -> SaveState {
        let mut state = self.progress.clone();
        state.playtime = self.playtime_seconds.floor() as u64;
        state.active_tool_id = self.tools.active_tool();
        state.active_tool_expiry = self.tools.expires_at_ms();
        state.picked_up_items = self
            .level_items
            .iter()
            .filter(|(_, items)| !items.picked_up.is_empty())
            .map(|(&level, items)| (level, items.picked_up.clone()))
            .collect();
        state
    }

    /// Makes `level` current. The maze and its hazards are generated on the
    /// first visit, items are rolled once per level, and the hazard runtime
    /// and item registry are rebuilt from that stored state.
    pub fn enter_level(
        &mut self,
        level: u32,
        spawn_point: SpawnPoint,
    ) -> Result<VisibilityUpdate, GenerationError> {
        let maze = match self.mazes.entry(level) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                let mut maze = generate_level(&self.progress.seed, level)?;
                maze.hazards = Some(self.hazard_spawner.spawn_hazards(&maze));
                slot.insert(maze)
            }
        };

        let items = self.level_items.entry(level).or_default();
        if items.spawns.is_none() {
            let options = ItemSpawnOptions {
                player_seed: &self.progress.seed,
                wayfinder_collected: self.progress.portal_hub_unlocked,
                picked_up_spawn_ids: &items.picked_up,
                unlocked_tools_mask: self.progress.unlocked_tools,
            };
            items.spawns = Some(self.item_spawner.spawn_items(maze, &options));
        }
        let remaining = items.remaining();
        self.items.load(&remaining);
        maze.item_spawns = Some(remaining);
        self.hazards.load_maze(maze.hazards.as_deref().unwrap_or_default());

        self.progress.current_maze = level;
        self.progress
            .maze_first_entry_times
            .entry(level)
            .or_insert(self.playtime_seconds.floor() as u64);

        self.player_tile = match spawn_point {
            SpawnPoint::Entry => maze.entry,
            SpawnPoint::Exit => maze.exit,
        };
        self.sight_radius = self.config.base_visibility_radius + self.tools.visibility_bonus();
        debug!("entered level {level} at {spawn_point:?} {:?}", self.player_tile);
        Ok(self.visibility.enter_level(self.player_tile, maze, self.sight_radius))
    }

    /// Whether the player may step from `from` to the adjacent tile `to`.
    /// Walls always block. Door hazards may consume a skeleton key.
    pub fn try_move(&mut self, from: Pos, to: Pos) -> bool {
        if !self.maze().is_some_and(|maze| maze.is_passable(to)) {
            return false;
        }
        if from == to {
            return true;
        }
        let Some(direction) = Direction::between(from, to) else {
            return false;
        };
        self.hazards.check_pass_through(from, to, direction, &mut self.tools)
    }

    /// Advances the session by `dt_seconds` with the player on `player_tile`.
    pub fn step(&mut self, dt_seconds: f64, player_tile: Pos) -> StepEvents {
        let dt_seconds = dt_seconds.max(0.0);
        self.playtime_seconds += dt_seconds;
        self.progress.playtime = self.playtime_seconds.floor() as u64;

        let expired_tool = self.tools.update();
        let door_transitions = self.hazards.update(dt_seconds, player_tile);

        let radius = self.visibility_radius();
        let visibility = if player_tile != self.player_tile || radius != self.sight_radius {
            self.player_tile = player_tile;
            self.sight_radius = radius;
            let level = self.progress.current_maze;
            self.mazes
                .get_mut(&level)
                .map(|maze| self.visibility.update(player_tile, maze, radius))
        } else {
            None
        };

        let pickups = self.items.update(player_tile);
        for pickup in &pickups {
            self.collect(pickup);
        }

        StepEvents { expired_tool, door_transitions, visibility, pickups }
    }

    fn collect(&mut self, pickup: &ItemPickup) {
        match pickup.item {
            Collectible::MazeShard => self.progress.collected_shards += 1,
            Collectible::WayfinderStone => self.progress.portal_hub_unlocked = true,
            Collectible::Tool(tool) => {
                self.progress.unlocked_tools = unlock_tool(self.progress.unlocked_tools, tool);
                self.tools.equip(tool);
            }
        }
        let level = self.progress.current_maze;
        let items = self.level_items.entry(level).or_default();
        items.picked_up.push(pickup.spawn_id.clone());
        if let Some(maze) = self.mazes.get_mut(&level) {
            maze.item_spawns = Some(items.remaining());
        }
        debug!("picked up {} ({})", pickup.item.as_str(), pickup.spawn_id);
    }

    /// Marks the current level completed and enters the next one.
    pub fn complete_level(&mut self) -> Result<VisibilityUpdate, GenerationError> {
        let level = self.progress.current_maze;
        if let Err(index) = self.progress.completed_mazes.binary_search(&level) {
            self.progress.completed_mazes.insert(index, level);
        }

        let now = self.playtime_seconds.floor() as u64;
        let entered = self.progress.maze_first_entry_times.get(&level).copied().unwrap_or(now);
        self.progress
            .maze_first_completion_times
            .entry(level)
            .or_insert(now.saturating_sub(entered));

        info!("level {level} completed after {}s of play", self.progress.playtime);
        self.enter_level(level + 1, SpawnPoint::Entry)
    }

    /// The previous level can be revisited once it has been completed.
    pub fn can_backtrack(&self) -> bool {
        let level = self.progress.current_maze;
        level > 1 && self.progress.completed_mazes.binary_search(&(level - 1)).is_ok()
    }

    /// Returns to the previous level at its exit, or `None` when
    /// backtracking is not allowed.
    pub fn backtrack(&mut self) -> Result<Option<VisibilityUpdate>, GenerationError> {
        if !self.can_backtrack() {
            return Ok(None);
        }
        let level = self.progress.current_maze - 1;
        self.enter_level(level, SpawnPoint::Exit).map(Some)
    }

    /// Portal hub travel: once the wayfinder stone is collected, any
    /// completed level can be reached directly, arriving at its exit.
    pub fn can_travel_to(&self, level: u32) -> bool {
        self.progress.portal_hub_unlocked
            && self.progress.completed_mazes.binary_search(&level).is_ok()
    }

    /// Enters `level` at its exit, or returns `None` when the hub is locked
    /// or the level has not been completed.
    pub fn travel_to(&mut self, level: u32) -> Result<Option<VisibilityUpdate>, GenerationError> {
        if !self.can_travel_to(level) {
            debug!("portal travel to level {level} refused");
            return Ok(None);
        }
        self.enter_level(level, SpawnPoint::Exit).map(Some)
    }

    pub fn visibility_radius(&self) -> f64 {
        self.config.base_visibility_radius + self.tools.visibility_bonus()
    }

    pub fn current_level(&self) -> u32 {
        self.progress.current_maze
    }

    pub fn maze(&self) -> Option<&MazeInstance> {
        self.mazes.get(&self.progress.current_maze)
    }

    pub fn player_tile(&self) -> Pos {
        self.player_tile
    }

    pub fn progress(&self) -> &SaveState {
        &self.progress
    }

    pub fn hazards(&self) -> &HazardRuntime {
        &self.hazards
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn tools(&self) -> &ToolState<C> {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolState<C> {
        &mut self.tools
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests;
