use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use maze_core::WorldConfig;

/// Reads a TOML [`WorldConfig`]. Keys missing from the file keep their
/// defaults, and no path at all means the default configuration.
pub fn load_world_config(path: Option<&Path>) -> Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: WorldConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    debug!("loaded world config from {}: {config:?}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_means_defaults() {
        let config = load_world_config(None).expect("defaults");
        assert_eq!(config.base_visibility_radius, 3.5);
        assert_eq!(config.plate_link_distance, 5);
    }

    #[test]
    fn test_partial_file_overrides_only_named_keys() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("world.toml");
        let toml = "base_visibility_radius = 5.0\n\n[wayfinder]\nmin_level = 6\nmax_level = 9\n";
        fs::write(&path, toml).expect("Failed to write config file");

        let config = load_world_config(Some(&path)).expect("config should parse");
        assert_eq!(config.base_visibility_radius, 5.0);
        assert_eq!((config.wayfinder.min_level, config.wayfinder.max_level), (6, 9));
        assert_eq!(config.plate_close_delay_seconds, 3.0);
    }

    #[test]
    fn test_unreadable_or_malformed_files_are_errors() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = temp.path().join("absent.toml");
        assert!(load_world_config(Some(&missing)).is_err());

        let broken = temp.path().join("broken.toml");
        fs::write(&broken, "plate_link_distance = \"far\"").expect("Failed to write config file");
        let error = load_world_config(Some(&broken)).expect_err("wrong type");
        assert!(error.to_string().contains("Failed to parse config file"));
    }
}
