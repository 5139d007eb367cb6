use std::collections::BTreeMap;

use slotmap::{SlotMap, new_key_type};

use crate::types::Pos;

use super::{Collectible, ItemSpawn};

new_key_type! {
    pub struct SpawnKey;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemPickup {
    pub spawn_id: String,
    pub item: Collectible,
}

/// Spawns still lying in the active level, rebuilt on every level load.
#[derive(Clone, Debug, Default)]
pub struct ItemRegistry {
    spawns: SlotMap<SpawnKey, ItemSpawn>,
    by_tile: BTreeMap<Pos, Vec<SpawnKey>>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, spawns: &[ItemSpawn]) {
        *self = Self::default();
        for spawn in spawns {
            let key = self.spawns.insert(spawn.clone());
            self.by_tile.entry(spawn.tile).or_default().push(key);
        }
    }

    /// Removes and returns everything lying on `tile`.
    pub fn update(&mut self, tile: Pos) -> Vec<ItemPickup> {
        let Some(keys) = self.by_tile.remove(&tile) else {
            return Vec::new();
        };
        keys.into_iter()
            .filter_map(|key| self.spawns.remove(key))
            .map(|spawn| ItemPickup { spawn_id: spawn.id, item: spawn.item })
            .collect()
    }

    /// Remaining spawns in placement order.
    pub fn spawns(&self) -> Vec<ItemSpawn> {
        self.spawns.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}
