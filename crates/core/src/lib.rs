pub mod config;
pub mod hazards;
pub mod items;
pub mod mapgen;
pub mod save;
pub mod seed;
pub mod session;
pub mod types;
pub mod visibility;

pub use config::{WayfinderRange, WorldConfig};
pub use hazards::{HazardInstance, HazardKind, HazardRuntime, HazardSpawner, PlateColor};
pub use items::{Collectible, ItemRegistry, ItemSpawn, ItemSpawner, ToolId, ToolState};
pub use mapgen::{GenerationError, MazeGenerator, MazeInstance, MazeParams, generate_level};
pub use save::{SaveCodec, SaveError, SaveErrorCode, SaveState};
pub use session::{GameSession, SpawnPoint, StepEvents};
pub use types::*;
pub use visibility::{RedrawMode, VisibilityEngine, VisibilityUpdate};
