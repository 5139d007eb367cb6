//! Per-level hazard state: door traversal rules, plate activation and the
//! timed relock of plate doors.

use std::collections::BTreeMap;

use log::debug;
use slotmap::{SlotMap, new_key_type};

use crate::types::{Direction, Pos};

use super::{HazardInstance, HazardKind};

new_key_type! {
    pub struct HazardKey;
}

/// Countdowns at or below this are treated as elapsed.
const TIMER_EPSILON: f64 = 1e-9;

/// Capability the traveller lends to a locked door.
pub trait KeyRing {
    fn has_skeleton_key(&self) -> bool;
    fn consume_skeleton_key(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoorTransition {
    pub door_id: String,
    pub open: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HazardRuntime {
    hazards: SlotMap<HazardKey, HazardInstance>,
    by_tile: BTreeMap<Pos, HazardKey>,
    by_id: BTreeMap<String, HazardKey>,
    player_tile: Option<Pos>,
}

impl HazardRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all state with copies of `hazards`. The caller's records are
    /// never mutated.
    pub fn load_maze(&mut self, hazards: &[HazardInstance]) {
        *self = Self::default();
        for hazard in hazards {
            let key = self.hazards.insert(hazard.clone());
            self.by_tile.insert(hazard.tile, key);
            self.by_id.insert(hazard.id.clone(), key);
        }
        debug!("hazard runtime loaded {} hazards", self.hazards.len());
    }

    /// Whether stepping from `from` onto `to` heading `direction` is allowed.
    /// A locked door opened with a key stays open for the rest of the level.
    pub fn check_pass_through(
        &mut self,
        from: Pos,
        to: Pos,
        direction: Direction,
        keys: &mut dyn KeyRing,
    ) -> bool {
        if from == to {
            return true;
        }
        let Some(&key) = self.by_tile.get(&to) else {
            return true;
        };
        let Some(hazard) = self.hazards.get_mut(key) else {
            return true;
        };

        match &mut hazard.kind {
            HazardKind::OneWayDoor { allowed_direction } => *allowed_direction == direction,
            HazardKind::LockedDoor { requires_key, open, .. } => {
                if *open || !*requires_key {
                    return true;
                }
                if !keys.has_skeleton_key() {
                    return false;
                }
                *open = true;
                keys.consume_skeleton_key();
                debug!("locked door {} opened with a key", hazard.id);
                true
            }
            HazardKind::PressurePlateDoor { open, .. } => *open,
            HazardKind::PressurePlate { .. } => true,
        }
    }

    /// Advances plate-door countdowns by `dt_seconds`, then applies plate
    /// release and activation if the player changed tiles. Returns every
    /// door open-state change made during the call.
    pub fn update(&mut self, dt_seconds: f64, player_tile: Pos) -> Vec<DoorTransition> {
        let mut transitions = Vec::new();
        self.tick_timers(dt_seconds.max(0.0), &mut transitions);

        if self.player_tile != Some(player_tile) {
            if let Some(previous) = self.player_tile {
                self.release_plate(previous);
            }
            self.press_plate(player_tile, &mut transitions);
            self.player_tile = Some(player_tile);
        }

        transitions
    }

    pub fn get_hazard_at_tile(&self, x: i32, y: i32) -> Option<&HazardInstance> {
        let key = self.by_tile.get(&Pos::new(x, y))?;
        self.hazards.get(*key)
    }

    pub fn hazard(&self, id: &str) -> Option<&HazardInstance> {
        let key = self.by_id.get(id)?;
        self.hazards.get(*key)
    }

    /// Hazards in spawn order.
    pub fn hazards(&self) -> impl Iterator<Item = &HazardInstance> {
        self.hazards.values()
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    fn tick_timers(&mut self, dt_seconds: f64, transitions: &mut Vec<DoorTransition>) {
        for hazard in self.hazards.values_mut() {
            let HazardKind::PressurePlateDoor { open, close_timer_seconds, .. } = &mut hazard.kind
            else {
                continue;
            };
            let Some(remaining) = close_timer_seconds.map(|timer| timer - dt_seconds) else {
                continue;
            };
            if remaining > TIMER_EPSILON {
                *close_timer_seconds = Some(remaining);
                continue;
            }
            *close_timer_seconds = None;
            if *open {
                *open = false;
                transitions.push(DoorTransition { door_id: hazard.id.clone(), open: false });
            }
        }
    }

    fn release_plate(&mut self, tile: Pos) {
        let Some(&key) = self.by_tile.get(&tile) else {
            return;
        };
        let door_id = match self.hazards.get_mut(key).map(|hazard| &mut hazard.kind) {
            Some(HazardKind::PressurePlate { linked_door_id, active, .. }) if *active => {
                *active = false;
                linked_door_id.clone()
            }
            _ => return,
        };

        let still_held = self.hazards.values().any(|hazard| {
            matches!(
                &hazard.kind,
                HazardKind::PressurePlate { linked_door_id, active: true, .. }
                    if *linked_door_id == door_id
            )
        });
        if still_held {
            return;
        }

        if let Some(HazardKind::PressurePlateDoor {
            open: true,
            close_delay_seconds,
            close_timer_seconds,
            ..
        }) = self.door_kind_mut(&door_id)
        {
            *close_timer_seconds = Some(*close_delay_seconds);
        }
    }

    fn press_plate(&mut self, tile: Pos, transitions: &mut Vec<DoorTransition>) {
        let Some(&key) = self.by_tile.get(&tile) else {
            return;
        };
        let door_id = match self.hazards.get_mut(key).map(|hazard| &mut hazard.kind) {
            Some(HazardKind::PressurePlate { linked_door_id, active, .. }) => {
                *active = true;
                linked_door_id.clone()
            }
            _ => return,
        };

        if let Some(HazardKind::PressurePlateDoor { open, close_timer_seconds, .. }) =
            self.door_kind_mut(&door_id)
        {
            *close_timer_seconds = None;
            if !*open {
                *open = true;
                transitions.push(DoorTransition { door_id, open: true });
            }
        }
    }

    fn door_kind_mut(&mut self, id: &str) -> Option<&mut HazardKind> {
        let key = *self.by_id.get(id)?;
        self.hazards.get_mut(key).map(|hazard| &mut hazard.kind)
    }
}
