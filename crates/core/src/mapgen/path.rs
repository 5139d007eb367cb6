//! Entry-to-exit reachability, the retry gate for maze generation.

use std::collections::{BTreeSet, VecDeque};

use crate::types::Direction;

use super::model::MazeInstance;

pub fn has_path(maze: &MazeInstance) -> bool {
    let mut open = VecDeque::from([maze.entry]);
    let mut seen = BTreeSet::from([maze.entry]);

    while let Some(current) = open.pop_front() {
        if current == maze.exit {
            return true;
        }
        for direction in Direction::CARDINAL {
            let next = current.step(direction);
            if !maze.in_bounds(next) || !maze.is_passable(next) || !seen.insert(next) {
                continue;
            }
            open.push_back(next);
        }
    }

    false
}
