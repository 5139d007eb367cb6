//! Seeded hazard placement on tiles off the critical entry-to-exit route.

use std::collections::BTreeSet;

use log::debug;

use crate::config::WorldConfig;
use crate::mapgen::MazeInstance;
use crate::mapgen::grid::{reachable_from_entry, shortest_path_tiles};
use crate::mapgen::progression::{locked_door_count, one_way_door_count, pressure_plate_pair_count};
use crate::seed::SeededRandom;
use crate::types::{Direction, PassageAxis, Pos};

use super::{HazardInstance, HazardKind, PlateColor, hazard_id};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardSpawnConfig {
    pub close_delay_seconds: f64,
    /// Maximum Manhattan distance between a plate and its door.
    pub link_distance: u32,
}

impl Default for HazardSpawnConfig {
    fn default() -> Self {
        Self::from(&WorldConfig::default())
    }
}

impl From<&WorldConfig> for HazardSpawnConfig {
    fn from(config: &WorldConfig) -> Self {
        Self {
            close_delay_seconds: config.plate_close_delay_seconds,
            link_distance: config.plate_link_distance,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HazardSpawner {
    config: HazardSpawnConfig,
}

struct Placement<'a> {
    maze: &'a MazeInstance,
    random: SeededRandom,
    occupied: BTreeSet<Pos>,
    hazards: Vec<HazardInstance>,
}

impl Placement<'_> {
    fn push(&mut self, tile: Pos, kind: HazardKind) -> String {
        let id = hazard_id(self.maze.level, self.hazards.len());
        self.occupied.insert(tile);
        self.hazards.push(HazardInstance { id: id.clone(), tile, kind });
        id
    }

    /// Axis from the local corridor shape; ambiguous tiles draw randomly.
    fn passage_axis(&mut self, tile: Pos) -> PassageAxis {
        let (horizontal, vertical) = corridor_spans(self.maze, tile);
        match (horizontal, vertical) {
            (true, false) => PassageAxis::Horizontal,
            (false, true) => PassageAxis::Vertical,
            _ => *self
                .random
                .pick(&[PassageAxis::Horizontal, PassageAxis::Vertical])
                .unwrap_or(&PassageAxis::Horizontal),
        }
    }
}

impl HazardSpawner {
    pub fn new(config: HazardSpawnConfig) -> Self {
        Self { config }
    }

    /// Places one-way doors, pressure-plate pairs and locked doors, in that
    /// order, from the `"{seed}:hazards"` stream. Shortfalls in candidates
    /// silently place fewer hazards.
    pub fn spawn_hazards(&self, maze: &MazeInstance) -> Vec<HazardInstance> {
        let critical_path = shortest_path_tiles(maze);
        let reachable = reachable_from_entry(maze);
        let candidates: Vec<Pos> = reachable
            .iter()
            .copied()
            .filter(|&tile| {
                tile != maze.entry && tile != maze.exit && !critical_path.contains(&tile)
            })
            .collect();

        let corridor_candidates: Vec<Pos> = candidates
            .iter()
            .copied()
            .filter(|&tile| {
                let (horizontal, vertical) = corridor_spans(maze, tile);
                maze.passable_neighbor_count(tile) == 2 && (horizontal || vertical)
            })
            .collect();
        let junction_candidates: Vec<Pos> = candidates
            .iter()
            .copied()
            .filter(|&tile| maze.passable_neighbor_count(tile) >= 2)
            .collect();

        let mut placement = Placement {
            maze,
            random: SeededRandom::derived(&maze.seed, "hazards"),
            occupied: BTreeSet::new(),
            hazards: Vec::new(),
        };

        self.place_one_way_doors(&mut placement, &corridor_candidates);
        self.place_pressure_plates(&mut placement, &junction_candidates);
        self.place_locked_doors(&mut placement, &junction_candidates);

        debug!(
            "level {} ({}): spawned {} hazards from {} candidates",
            maze.level,
            maze.seed,
            placement.hazards.len(),
            candidates.len()
        );
        placement.hazards
    }

    fn place_one_way_doors(&self, placement: &mut Placement<'_>, candidates: &[Pos]) {
        let target = one_way_door_count(placement.maze.level, &mut placement.random);
        let mut shuffled = candidates.to_vec();
        placement.random.shuffle(&mut shuffled);

        let mut placed = 0;
        for tile in shuffled {
            if placed >= target {
                break;
            }
            let (horizontal, _) = corridor_spans(placement.maze, tile);
            let choices = if horizontal {
                [Direction::East, Direction::West]
            } else {
                [Direction::North, Direction::South]
            };
            let allowed_direction = *placement.random.pick(&choices).unwrap_or(&choices[0]);
            if placement.occupied.contains(&tile) {
                continue;
            }
            placement.push(tile, HazardKind::OneWayDoor { allowed_direction });
            placed += 1;
        }
    }

    fn place_pressure_plates(&self, placement: &mut Placement<'_>, candidates: &[Pos]) {
        let target = pressure_plate_pair_count(placement.maze.level, &mut placement.random);
        let mut plate_tiles = candidates.to_vec();
        placement.random.shuffle(&mut plate_tiles);
        let mut door_tiles = candidates.to_vec();
        placement.random.shuffle(&mut door_tiles);

        let mut pairs = 0;
        for plate_tile in plate_tiles {
            if pairs >= target {
                break;
            }
            if placement.occupied.contains(&plate_tile) {
                continue;
            }
            let Some(door_tile) = door_tiles.iter().copied().find(|&door_tile| {
                door_tile != plate_tile
                    && !placement.occupied.contains(&door_tile)
                    && door_tile.manhattan(plate_tile) <= self.config.link_distance
            }) else {
                continue;
            };

            let color = PlateColor::PALETTE[pairs % PlateColor::PALETTE.len()];
            let axis = placement.passage_axis(door_tile);
            let linked_door_id = placement.push(
                door_tile,
                HazardKind::PressurePlateDoor {
                    color,
                    axis,
                    close_delay_seconds: self.config.close_delay_seconds,
                    open: false,
                    close_timer_seconds: None,
                },
            );
            placement
                .push(plate_tile, HazardKind::PressurePlate { linked_door_id, color, active: false });
            pairs += 1;
        }
    }

    fn place_locked_doors(&self, placement: &mut Placement<'_>, candidates: &[Pos]) {
        let target = locked_door_count(placement.maze.level);
        let mut shuffled = candidates.to_vec();
        placement.random.shuffle(&mut shuffled);

        let mut placed = 0;
        for tile in shuffled {
            if placed >= target {
                break;
            }
            if placement.occupied.contains(&tile) {
                continue;
            }
            let axis = placement.passage_axis(tile);
            placement.push(tile, HazardKind::LockedDoor { requires_key: true, axis, open: false });
            placed += 1;
        }
    }
}

/// Whether the tile's open neighbours span east-west and/or north-south.
fn corridor_spans(maze: &MazeInstance, tile: Pos) -> (bool, bool) {
    let open = |direction| maze.is_passable(tile.step(direction));
    (open(Direction::East) && open(Direction::West), open(Direction::North) && open(Direction::South))
}
