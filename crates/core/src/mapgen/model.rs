//! Public data models for generated mazes and their generation parameters.

use std::collections::BTreeMap;

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::hazards::{HazardInstance, HazardKind};
use crate::items::ItemSpawn;
use crate::types::{CellKind, Direction, Pos};

use super::grid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MazeCell {
    pub pos: Pos,
    pub kind: CellKind,
    /// Sticky once set by the visibility engine.
    pub explored: bool,
    pub currently_visible: bool,
}

/// Generation inputs, derived purely from the level number and player seed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MazeParams {
    pub level: u32,
    pub width: usize,
    pub height: usize,
    pub seed: String,
    pub complexity: f64,
    pub dead_end_ratio: f64,
    pub loop_chance: f64,
    pub room_chance: f64,
}

/// One level's grid. Cells are stored row-major; everything else in the
/// crate refers to them by `Pos`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MazeInstance {
    pub level: u32,
    pub width: usize,
    pub height: usize,
    pub seed: String,
    pub cells: Vec<MazeCell>,
    pub entry: Pos,
    pub exit: Pos,
    pub hazards: Option<Vec<HazardInstance>>,
    pub item_spawns: Option<Vec<ItemSpawn>>,
}

impl MazeInstance {
    /// Grid of walls with entry and exit parked on the origin until placed.
    pub fn walled(level: u32, seed: &str, width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(MazeCell {
                    pos: Pos::new(x as i32, y as i32),
                    kind: CellKind::Wall,
                    explored: false,
                    currently_visible: false,
                });
            }
        }
        Self {
            level,
            width,
            height,
            seed: seed.to_string(),
            cells,
            entry: Pos::new(0, 0),
            exit: Pos::new(0, 0),
            hazards: None,
            item_spawns: None,
        }
    }

    /// Builds a maze from rows of `#` (wall), `.` (floor), `S` (entry) and
    /// `E` (exit). Used by fixtures and tools.
    pub fn from_ascii(level: u32, seed: &str, rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut maze = Self::walled(level, seed, width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                let pos = Pos::new(x as i32, y as i32);
                let kind = match symbol {
                    '.' => CellKind::Floor,
                    'S' => {
                        maze.entry = pos;
                        CellKind::Entry
                    }
                    'E' => {
                        maze.exit = pos;
                        CellKind::Exit
                    }
                    _ => CellKind::Wall,
                };
                maze.set_kind(pos, kind);
            }
        }
        maze
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn cell(&self, pos: Pos) -> Option<&MazeCell> {
        self.index(pos).map(|index| &self.cells[index])
    }

    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut MazeCell> {
        self.index(pos).map(move |index| &mut self.cells[index])
    }

    /// Out-of-bounds positions read as walls.
    pub fn kind_at(&self, pos: Pos) -> CellKind {
        self.cell(pos).map_or(CellKind::Wall, |cell| cell.kind)
    }

    pub fn set_kind(&mut self, pos: Pos, kind: CellKind) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.kind = kind;
        }
    }

    pub fn is_passable(&self, pos: Pos) -> bool {
        self.kind_at(pos).is_passable()
    }

    pub fn passable_neighbors(&self, pos: Pos) -> Vec<(Direction, Pos)> {
        Direction::CARDINAL
            .iter()
            .map(|&direction| (direction, pos.step(direction)))
            .filter(|&(_, next)| self.is_passable(next))
            .collect()
    }

    pub fn passable_neighbor_count(&self, pos: Pos) -> usize {
        Direction::CARDINAL.iter().filter(|&&direction| self.is_passable(pos.step(direction))).count()
    }

    /// BFS step count to every cell reachable from `from`.
    pub fn bfs_distances(&self, from: Pos) -> BTreeMap<Pos, u32> {
        grid::bfs_distances(self, from).into_iter().map(|node| (node.pos, node.distance)).collect()
    }

    pub fn hazard_at(&self, pos: Pos) -> Option<&HazardInstance> {
        self.hazards.as_deref()?.iter().find(|hazard| hazard.tile == pos)
    }

    /// Stable byte encoding of geometry, hazards and items. Fog state is
    /// excluded so the encoding only changes when generation rules do.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.level.to_le_bytes());
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.seed.as_bytes());
        for cell in &self.cells {
            bytes.push(match cell.kind {
                CellKind::Wall => 0,
                CellKind::Floor => 1,
                CellKind::Entry => 2,
                CellKind::Exit => 3,
            });
        }
        bytes.extend(self.entry.y.to_le_bytes());
        bytes.extend(self.entry.x.to_le_bytes());
        bytes.extend(self.exit.y.to_le_bytes());
        bytes.extend(self.exit.x.to_le_bytes());

        let hazards = self.hazards.as_deref().unwrap_or_default();
        bytes.extend((hazards.len() as u32).to_le_bytes());
        for hazard in hazards {
            bytes.extend(hazard.id.as_bytes());
            bytes.extend(hazard.tile.y.to_le_bytes());
            bytes.extend(hazard.tile.x.to_le_bytes());
            bytes.push(match &hazard.kind {
                HazardKind::OneWayDoor { .. } => 0,
                HazardKind::LockedDoor { .. } => 1,
                HazardKind::PressurePlate { .. } => 2,
                HazardKind::PressurePlateDoor { .. } => 3,
            });
        }

        let items = self.item_spawns.as_deref().unwrap_or_default();
        bytes.extend((items.len() as u32).to_le_bytes());
        for spawn in items {
            bytes.extend(spawn.id.as_bytes());
            bytes.extend(spawn.item.as_str().as_bytes());
            bytes.extend(spawn.tile.y.to_le_bytes());
            bytes.extend(spawn.tile.x.to_le_bytes());
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// Debug rendering: `#` wall, `.` floor, `S` entry, `E` exit, hazard
    /// and item glyphs on top.
    pub fn render_ascii(&self) -> String {
        let mut text = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos::new(x as i32, y as i32);
                let item_here = self
                    .item_spawns
                    .as_deref()
                    .is_some_and(|spawns| spawns.iter().any(|spawn| spawn.tile == pos));
                let symbol = match (self.hazard_at(pos), self.kind_at(pos)) {
                    (_, CellKind::Entry) => 'S',
                    (_, CellKind::Exit) => 'E',
                    (Some(hazard), _) => hazard.kind.glyph(),
                    (None, _) if item_here => '*',
                    (None, CellKind::Wall) => '#',
                    (None, CellKind::Floor) => '.',
                };
                text.push(symbol);
            }
            text.push('\n');
        }
        text
    }
}
