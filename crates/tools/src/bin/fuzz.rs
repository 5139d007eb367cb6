use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use log::{error, info};
use maze_core::save::PlayerCharacterId;
use maze_core::{SaveState, ToolId};
use maze_tools::config_file::load_world_config;
use maze_tools::invariants::{check_level, check_save_code};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
    /// Highest level number to sample
    #[arg(long, default_value_t = 40)]
    max_level: u32,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn random_state(rng: &mut ChaCha8Rng, player_seed: &str, level: u32) -> SaveState {
    let mut state = SaveState::new_game(player_seed, choose(rng, &PlayerCharacterId::ALL));
    state.current_maze = level;
    state.completed_mazes = (1..level).collect();
    state.collected_shards = (rng.next_u64() % 200) as u32;
    state.playtime = rng.next_u64() % 100_000;
    state.unlocked_tools = (rng.next_u64() % 32) as u32;
    state.portal_hub_unlocked = rng.next_u64() % 2 == 0;
    if rng.next_u64() % 2 == 0 {
        state.active_tool_id = Some(choose(rng, &ToolId::ALL));
        state.active_tool_expiry = Some((rng.next_u64() % 2_000_000_000_000) as i64);
    }
    state
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_world_config(args.config.as_deref())?;
    let max_level = args.max_level.max(1);

    println!("Starting fuzz harness on seed {} for {} runs...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut failures = 0_u32;

    for run in 0..args.runs {
        let player_seed = format!("fuzz-{:016x}", rng.next_u64());
        let level = 1 + (rng.next_u64() % u64::from(max_level)) as u32;

        let state = random_state(&mut rng, &player_seed, level);
        let tamper_index = rng.next_u64() as usize;
        let outcome = check_level(&player_seed, level, &config)
            .and_then(|fingerprint| check_save_code(&state, tamper_index).map(|()| fingerprint));

        match outcome {
            Ok(fingerprint) => info!("run {run}: {player_seed} level {level} ok ({fingerprint:016x})"),
            Err(violation) => {
                error!("run {run}: {player_seed} level {level}: {violation}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} runs violated an invariant", args.runs);
    }
    println!("Fuzzing completed successfully.");
    Ok(())
}
