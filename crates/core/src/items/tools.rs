use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::hazards::KeyRing;

use super::ToolId;

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}

/// The single equipped tool and when it runs out.
#[derive(Clone, Debug, Default)]
pub struct ToolState<C = SystemClock> {
    clock: C,
    active: Option<ToolId>,
    expires_at_ms: Option<i64>,
}

impl<C: Clock> ToolState<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, active: None, expires_at_ms: None }
    }

    /// Restores the equipped tool from saved progress.
    pub fn sync(&mut self, active: Option<ToolId>, expires_at_ms: Option<i64>) {
        self.active = active;
        self.expires_at_ms = active.and(expires_at_ms);
    }

    /// Replaces any equipped tool. Timed tools start their countdown now.
    pub fn equip(&mut self, tool: ToolId) {
        self.active = Some(tool);
        self.expires_at_ms =
            tool.definition().duration_ms.map(|duration| self.clock.now_ms().saturating_add(duration));
        debug!("equipped {tool} until {:?}", self.expires_at_ms);
    }

    pub fn unequip(&mut self) {
        self.active = None;
        self.expires_at_ms = None;
    }

    /// Unequips and returns the active tool if it is single-use.
    pub fn consume_active_one_shot(&mut self) -> Option<ToolId> {
        let tool = self.active.filter(|tool| tool.definition().one_shot)?;
        self.unequip();
        Some(tool)
    }

    /// Returns the tool that expired since the last call, at most once.
    pub fn update(&mut self) -> Option<ToolId> {
        let tool = self.active?;
        let expires_at_ms = self.expires_at_ms?;
        if self.clock.now_ms() < expires_at_ms {
            return None;
        }
        self.unequip();
        debug!("{tool} expired");
        Some(tool)
    }

    pub fn active_tool(&self) -> Option<ToolId> {
        self.active
    }

    pub fn expires_at_ms(&self) -> Option<i64> {
        self.expires_at_ms
    }

    pub fn visibility_bonus(&self) -> f64 {
        self.active.map_or(0.0, |tool| tool.definition().visibility_bonus)
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.active.map_or(1.0, |tool| tool.definition().speed_multiplier)
    }

    pub fn compass_active(&self) -> bool {
        self.active == Some(ToolId::Compass)
    }

    pub fn map_reveal_fraction(&self) -> f64 {
        if self.active == Some(ToolId::MapFragment) { 0.2 } else { 0.0 }
    }
}

impl<C: Clock> KeyRing for ToolState<C> {
    fn has_skeleton_key(&self) -> bool {
        self.active == Some(ToolId::SkeletonKey)
    }

    fn consume_skeleton_key(&mut self) {
        if self.has_skeleton_key() {
            self.unequip();
        }
    }
}
