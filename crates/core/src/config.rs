use serde::{Deserialize, Serialize};

/// Tunables that are not a pure function of the level number.
///
/// Every field has a default, so a partial TOML table is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Sight radius in tiles before tool bonuses.
    pub base_visibility_radius: f64,
    /// Levels the wayfinder stone may be placed on, inclusive.
    pub wayfinder: WayfinderRange,
    pub plate_close_delay_seconds: f64,
    /// Maximum Manhattan distance between a plate and its door.
    pub plate_link_distance: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            base_visibility_radius: 3.5,
            wayfinder: WayfinderRange::default(),
            plate_close_delay_seconds: 3.0,
            plate_link_distance: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WayfinderRange {
    pub min_level: u32,
    pub max_level: u32,
}

impl Default for WayfinderRange {
    fn default() -> Self {
        Self { min_level: 4, max_level: 12 }
    }
}

impl WayfinderRange {
    /// Bounds in ascending order, whichever way they were written.
    pub fn sorted(self) -> Self {
        if self.min_level <= self.max_level {
            self
        } else {
            Self { min_level: self.max_level, max_level: self.min_level }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: WorldConfig =
            serde_json::from_str(r#"{"plate_link_distance": 3}"#).expect("partial config");
        assert_eq!(config.plate_link_distance, 3);
        assert_eq!(config.base_visibility_radius, 3.5);
        assert_eq!(config.wayfinder, WayfinderRange { min_level: 4, max_level: 12 });
    }

    #[test]
    fn reversed_wayfinder_range_is_sorted() {
        let range = WayfinderRange { min_level: 9, max_level: 2 }.sorted();
        assert_eq!(range, WayfinderRange { min_level: 2, max_level: 9 });
    }
}
