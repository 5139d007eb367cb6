use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::info;
use maze_core::hazards::{HazardSpawnConfig, HazardSpawner};
use maze_core::items::{ItemSpawnOptions, ItemSpawner};
use maze_core::save::PlayerCharacterId;
use maze_core::{SaveCodec, SaveState, generate_level};
use maze_tools::config_file::load_world_config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one level and print it with its hazards and items
    Generate {
        /// Player seed of the run
        #[arg(short, long)]
        seed: String,
        #[arg(short, long, default_value_t = 1)]
        level: u32,
        /// Print the full level as JSON instead of ASCII
        #[arg(long)]
        json: bool,
        /// TOML file with world tunables
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode a save code and print its progress as JSON
    Decode { code: String },
    /// Print the save code of a fresh run
    NewCode {
        #[arg(short, long)]
        seed: String,
        #[arg(long, default_value = "adventurer")]
        character: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { seed, level, json, config } => {
            generate(&seed, level, json, config.as_deref())
        }
        Commands::Decode { code } => {
            let state = SaveCodec::decode(&code).context("Save code rejected")?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
        Commands::NewCode { seed, character } => {
            let character: PlayerCharacterId =
                character.parse().map_err(|error| anyhow!("{error}"))?;
            println!("{}", SaveCodec::encode(&SaveState::new_game(seed, character)));
            Ok(())
        }
    }
}

fn generate(seed: &str, level: u32, json: bool, config: Option<&Path>) -> Result<()> {
    let config = load_world_config(config)?;
    let mut maze = generate_level(seed, level)
        .with_context(|| format!("Failed to generate level {level} of seed {seed}"))?;

    maze.hazards = Some(HazardSpawner::new(HazardSpawnConfig::from(&config)).spawn_hazards(&maze));
    let options = ItemSpawnOptions { player_seed: seed, ..ItemSpawnOptions::default() };
    maze.item_spawns = Some(ItemSpawner::from(&config).spawn_items(&maze, &options));
    info!("generated level {level} of {seed} ({}x{})", maze.width, maze.height);

    if json {
        println!("{}", serde_json::to_string_pretty(&maze)?);
    } else {
        print!("{}", maze.render_ascii());
        println!("Entry: ({}, {})  Exit: ({}, {})", maze.entry.x, maze.entry.y, maze.exit.x, maze.exit.y);
        println!("Fingerprint: {:016x}", maze.fingerprint());
    }
    Ok(())
}
