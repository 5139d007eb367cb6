//! Procedural maze generation split into coherent submodules.

pub mod model;
pub mod progression;

mod generator;
pub(crate) mod grid;
mod path;

pub use generator::{GenerationError, MAX_GENERATION_ATTEMPTS, MazeGenerator};
pub use model::{MazeCell, MazeInstance, MazeParams};
pub use path::has_path;
pub use progression::{ExitDifficultyProfile, exit_difficulty_profile, maze_params};

/// Generates the maze for `level` of the run identified by `player_seed`.
pub fn generate_level(player_seed: &str, level: u32) -> Result<MazeInstance, GenerationError> {
    MazeGenerator::new().generate(&maze_params(player_seed, level))
}

#[cfg(test)]
mod tests {
    use super::{MazeGenerator, maze_params};

    #[test]
    fn generate_level_matches_generator_output() {
        let from_helper = super::generate_level("player-a", 4).expect("level should generate");
        let from_generator =
            MazeGenerator::new().generate(&maze_params("player-a", 4)).expect("level should generate");

        assert_eq!(from_helper, from_generator);
    }
}
