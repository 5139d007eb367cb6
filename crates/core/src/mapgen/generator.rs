//! Randomized depth-first carving with loop injection and difficulty-aware
//! exit placement.

use log::{debug, warn};
use thiserror::Error;

use crate::seed::SeededRandom;
use crate::types::{CellKind, Direction, Pos};

use super::grid::{DistanceNode, bfs_distances};
use super::model::{MazeInstance, MazeParams};
use super::path::has_path;
use super::progression::exit_difficulty_profile;

pub const MAX_GENERATION_ATTEMPTS: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("failed to generate a solvable maze for seed {seed} after {attempts} attempts")]
    Unsolvable { seed: String, attempts: u32 },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MazeGenerator;

impl MazeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Each attempt draws from its own `"{seed}:{attempt}"` stream, so a
    /// rejected attempt never perturbs the next one.
    pub fn generate(&self, params: &MazeParams) -> Result<MazeInstance, GenerationError> {
        let width = ensure_odd(params.width + 1);
        let height = ensure_odd(params.height + 1);

        for attempt in 0..MAX_GENERATION_ATTEMPTS {
            let mut random = SeededRandom::derived(&params.seed, attempt);
            let mut maze = MazeInstance::walled(params.level, &params.seed, width, height);

            carve_passages(&mut maze, &mut random);
            carve_loops(&mut maze, &mut random, params.loop_chance);

            let Some((entry, exit)) = place_entry_and_exit(&maze, &mut random) else {
                warn!("maze {} attempt {attempt}: no exit candidate", params.seed);
                continue;
            };
            maze.set_kind(entry, CellKind::Entry);
            maze.set_kind(exit, CellKind::Exit);
            maze.entry = entry;
            maze.exit = exit;

            if has_path(&maze) {
                debug!(
                    "maze {} level {} generated on attempt {attempt} ({width}x{height})",
                    params.seed, params.level
                );
                return Ok(maze);
            }
            warn!("maze {} attempt {attempt}: exit unreachable, retrying", params.seed);
        }

        Err(GenerationError::Unsolvable {
            seed: params.seed.clone(),
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }
}

fn ensure_odd(value: usize) -> usize {
    if value % 2 == 0 { value + 1 } else { value }
}

/// Interior cells only; the outer ring always stays wall.
fn is_carvable(maze: &MazeInstance, pos: Pos) -> bool {
    pos.x > 0 && pos.y > 0 && (pos.x as usize) < maze.width - 1 && (pos.y as usize) < maze.height - 1
}

fn carve_floor(maze: &mut MazeInstance, pos: Pos) {
    if matches!(maze.kind_at(pos), CellKind::Entry | CellKind::Exit) {
        return;
    }
    maze.set_kind(pos, CellKind::Floor);
}

fn carve_passages(maze: &mut MazeInstance, random: &mut SeededRandom) {
    let start = Pos::new(1, 1);
    let mut stack = vec![start];
    carve_floor(maze, start);

    while let Some(&current) = stack.last() {
        let candidates: Vec<Pos> = Direction::CARDINAL
            .iter()
            .map(|&direction| {
                let (dx, dy) = direction.delta();
                Pos::new(current.x + dx * 2, current.y + dy * 2)
            })
            .filter(|&next| is_carvable(maze, next) && maze.kind_at(next) == CellKind::Wall)
            .collect();

        let Some(&selected) = random.pick(&candidates) else {
            stack.pop();
            continue;
        };
        let between = Pos::new((current.x + selected.x) / 2, (current.y + selected.y) / 2);
        carve_floor(maze, between);
        carve_floor(maze, selected);
        stack.push(selected);
    }
}

fn carve_loops(maze: &mut MazeInstance, random: &mut SeededRandom, loop_chance: f64) {
    for y in 1..(maze.height - 1) {
        for x in 1..(maze.width - 1) {
            let pos = Pos::new(x as i32, y as i32);
            if maze.kind_at(pos) != CellKind::Wall {
                continue;
            }
            if random.next() < loop_chance {
                carve_floor(maze, pos);
            }
        }
    }
}

fn interior_floor_tiles(maze: &MazeInstance) -> Vec<Pos> {
    let mut tiles = Vec::new();
    for y in 1..(maze.height - 1) {
        for x in 1..(maze.width - 1) {
            let pos = Pos::new(x as i32, y as i32);
            if maze.is_passable(pos) {
                tiles.push(pos);
            }
        }
    }
    tiles
}

/// Picks a random entry, then an exit from the far band. Pool order:
/// far dead ends (when the tier prefers them), far cells, every other
/// reachable cell, and finally the single farthest cell.
fn place_entry_and_exit(maze: &MazeInstance, random: &mut SeededRandom) -> Option<(Pos, Pos)> {
    let floor_tiles = interior_floor_tiles(maze);
    let entry = *random.pick(&floor_tiles)?;
    let distances = bfs_distances(maze, entry);
    let profile = exit_difficulty_profile(maze.level);

    let max_distance = distances.iter().map(|node| node.distance).max().unwrap_or(0);
    let far_enough = profile
        .min_absolute_distance
        .max((f64::from(max_distance) * profile.min_distance_ratio).floor() as u32);

    let others: Vec<DistanceNode> =
        distances.iter().copied().filter(|node| node.pos != entry).collect();
    let far_candidates: Vec<DistanceNode> =
        others.iter().copied().filter(|node| node.distance >= far_enough).collect();
    let dead_end_candidates: Vec<DistanceNode> = far_candidates
        .iter()
        .copied()
        .filter(|node| maze.passable_neighbor_count(node.pos) <= 1)
        .collect();

    let source_pool = if profile.prefer_dead_end && !dead_end_candidates.is_empty() {
        dead_end_candidates
    } else if !far_candidates.is_empty() {
        far_candidates
    } else {
        others.clone()
    };

    let exit = match random.pick(&source_pool) {
        Some(node) => node.pos,
        None => farthest(&others)?.pos,
    };
    Some((entry, exit))
}

/// First cell at the maximum distance, in discovery order.
fn farthest(nodes: &[DistanceNode]) -> Option<DistanceNode> {
    nodes.iter().copied().fold(None, |best, node| match best {
        Some(current) if current.distance >= node.distance => Some(current),
        _ => Some(node),
    })
}
