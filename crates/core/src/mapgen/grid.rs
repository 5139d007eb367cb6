//! Breadth-first grid walks shared by exit placement, hazard and item spawning.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::{Direction, Pos};

use super::model::MazeInstance;

/// BFS distance of a reachable cell from the walk origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DistanceNode {
    pub(crate) pos: Pos,
    pub(crate) distance: u32,
}

/// Every cell reachable from `start`, in discovery order (origin first).
/// Discovery order feeds seeded picks, so it must stay stable.
pub(crate) fn bfs_distances(maze: &MazeInstance, start: Pos) -> Vec<DistanceNode> {
    let mut seen = BTreeSet::from([start]);
    let mut open = VecDeque::from([DistanceNode { pos: start, distance: 0 }]);
    let mut discovered = vec![DistanceNode { pos: start, distance: 0 }];

    while let Some(current) = open.pop_front() {
        for direction in Direction::CARDINAL {
            let next = current.pos.step(direction);
            if !maze.in_bounds(next) || !maze.is_passable(next) || !seen.insert(next) {
                continue;
            }
            let node = DistanceNode { pos: next, distance: current.distance + 1 };
            open.push_back(node);
            discovered.push(node);
        }
    }

    discovered
}

/// Tiles on one shortest entry-to-exit route, both ends included. Empty
/// when the exit is unreachable.
pub(crate) fn shortest_path_tiles(maze: &MazeInstance) -> BTreeSet<Pos> {
    let (start, target) = (maze.entry, maze.exit);
    let mut seen = BTreeSet::from([start]);
    let mut parent: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut open = VecDeque::from([start]);

    while let Some(current) = open.pop_front() {
        if current == target {
            break;
        }
        for direction in Direction::CARDINAL {
            let next = current.step(direction);
            if !maze.is_passable(next) || !seen.insert(next) {
                continue;
            }
            parent.insert(next, current);
            open.push_back(next);
        }
    }

    let mut path = BTreeSet::new();
    if !seen.contains(&target) {
        return path;
    }

    let mut current = target;
    path.insert(current);
    while current != start {
        let Some(&previous) = parent.get(&current) else {
            break;
        };
        current = previous;
        path.insert(current);
    }
    path
}

/// Reachable tiles from the entry, for pools that must never land in
/// pockets cut off from the player.
pub(crate) fn reachable_from_entry(maze: &MazeInstance) -> BTreeSet<Pos> {
    bfs_distances(maze, maze.entry).into_iter().map(|node| node.pos).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> MazeInstance {
        MazeInstance::from_ascii(
            1,
            "grid",
            &[
                "#######", //
                "#S....#",
                "#.###.#",
                "#.#E..#",
                "#.###.#",
                "#.....#",
                "#######",
            ],
        )
    }

    #[test]
    fn bfs_distances_starts_with_origin_at_zero() {
        let maze = fixture();
        let nodes = bfs_distances(&maze, maze.entry);
        assert_eq!(nodes[0], DistanceNode { pos: maze.entry, distance: 0 });
        let exit = nodes.iter().find(|node| node.pos == maze.exit).expect("exit reachable");
        assert_eq!(exit.distance, 8);
    }

    #[test]
    fn shortest_path_includes_both_ends_and_has_minimal_length() {
        let maze = fixture();
        let path = shortest_path_tiles(&maze);
        assert!(path.contains(&maze.entry));
        assert!(path.contains(&maze.exit));
        assert_eq!(path.len(), 9);
    }

    #[test]
    fn shortest_path_is_empty_when_exit_is_sealed() {
        let maze = MazeInstance::from_ascii(1, "sealed", &["#####", "#S#E#", "#####"]);
        assert!(shortest_path_tiles(&maze).is_empty());
    }

    #[test]
    fn pockets_are_not_reachable() {
        let maze = MazeInstance::from_ascii(1, "pocket", &["#######", "#S.E#.#", "#######"]);
        let reachable = reachable_from_entry(&maze);
        assert!(reachable.contains(&Pos::new(3, 1)));
        assert!(!reachable.contains(&Pos::new(5, 1)));
    }
}
