//! Fog of war: per-tile line of sight within a sight radius, with sticky
//! exploration memory.

use crate::mapgen::MazeInstance;
use crate::types::{CellKind, Pos};

/// How a renderer should apply an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedrawMode {
    /// Level entry: redraw every tile.
    Full,
    /// Movement: redraw only `changed_tiles`.
    Dirty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityUpdate {
    pub mode: RedrawMode,
    /// Tiles whose `currently_visible` flipped, in row-major order.
    pub changed_tiles: Vec<Pos>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityEngine;

impl VisibilityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Recomputes the whole grid after the player moved onto `player`.
    pub fn update(&self, player: Pos, maze: &mut MazeInstance, radius: f64) -> VisibilityUpdate {
        VisibilityUpdate { mode: RedrawMode::Dirty, changed_tiles: recompute(player, maze, radius) }
    }

    /// Same computation as [`Self::update`], flagged for a full redraw.
    pub fn enter_level(&self, player: Pos, maze: &mut MazeInstance, radius: f64) -> VisibilityUpdate {
        VisibilityUpdate { mode: RedrawMode::Full, changed_tiles: recompute(player, maze, radius) }
    }
}

fn recompute(player: Pos, maze: &mut MazeInstance, radius: f64) -> Vec<Pos> {
    let radius_squared = radius * radius;
    let mut changed = Vec::new();

    for index in 0..maze.cells.len() {
        let pos = maze.cells[index].pos;
        let dx = f64::from(pos.x - player.x);
        let dy = f64::from(pos.y - player.y);
        let visible = dx * dx + dy * dy <= radius_squared && has_line_of_sight(maze, player, pos);

        let cell = &mut maze.cells[index];
        if visible {
            cell.explored = true;
        }
        if cell.currently_visible != visible {
            cell.currently_visible = visible;
            changed.push(pos);
        }
    }

    changed
}

fn blocks_sight(maze: &MazeInstance, pos: Pos) -> bool {
    maze.kind_at(pos) == CellKind::Wall
}

/// Grid traversal from the centre of `from` to the centre of `to`.
///
/// Intermediate walls block sight; the destination itself never does. When
/// the ray passes exactly through a corner, a wall on either side of that
/// corner blocks it.
pub fn has_line_of_sight(maze: &MazeInstance, from: Pos, to: Pos) -> bool {
    if from == to {
        return true;
    }

    let start_x = f64::from(from.x) + 0.5;
    let start_y = f64::from(from.y) + 0.5;
    let dir_x = f64::from(to.x) + 0.5 - start_x;
    let dir_y = f64::from(to.y) + 0.5 - start_y;

    let step_x = (to.x - from.x).signum();
    let step_y = (to.y - from.y).signum();
    let inv_dir_x = if step_x == 0 { f64::INFINITY } else { 1.0 / dir_x.abs() };
    let inv_dir_y = if step_y == 0 { f64::INFINITY } else { 1.0 / dir_y.abs() };

    let mut current = from;
    let boundary_x = f64::from(if step_x > 0 { current.x + 1 } else { current.x });
    let boundary_y = f64::from(if step_y > 0 { current.y + 1 } else { current.y });
    let mut t_max_x =
        if step_x == 0 { f64::INFINITY } else { ((boundary_x - start_x) / dir_x).abs() };
    let mut t_max_y =
        if step_y == 0 { f64::INFINITY } else { ((boundary_y - start_y) / dir_y).abs() };

    while current != to {
        if t_max_x < t_max_y {
            current.x += step_x;
            t_max_x += inv_dir_x;
        } else if t_max_y < t_max_x {
            current.y += step_y;
            t_max_y += inv_dir_y;
        } else {
            let side_a = Pos::new(current.x + step_x, current.y);
            let side_b = Pos::new(current.x, current.y + step_y);
            if side_a != to
                && side_b != to
                && (blocks_sight(maze, side_a) || blocks_sight(maze, side_b))
            {
                return false;
            }
            current = Pos::new(current.x + step_x, current.y + step_y);
            t_max_x += inv_dir_x;
            t_max_y += inv_dir_y;
        }

        if current != to && blocks_sight(maze, current) {
            return false;
        }
    }

    true
}
