use serde::{Deserialize, Serialize};

/// Tile coordinate. Field order keeps the derived `Ord` row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn distance_squared(self, other: Pos) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Neighbour scan order shared by every grid walk in the crate.
    pub const CARDINAL: [Direction; 4] =
        [Direction::East, Direction::West, Direction::South, Direction::North];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Direction of a single orthogonal step, `None` for anything else.
    pub fn between(from: Pos, to: Pos) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Self::North),
            (0, 1) => Some(Self::South),
            (1, 0) => Some(Self::East),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }

    pub fn axis(self) -> PassageAxis {
        match self {
            Self::East | Self::West => PassageAxis::Horizontal,
            Self::North | Self::South => PassageAxis::Vertical,
        }
    }
}

/// Axis along which a door is traversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassageAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Floor,
    Entry,
    Exit,
}

impl CellKind {
    pub fn is_passable(self) -> bool {
        self != Self::Wall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_between_only_accepts_orthogonal_single_steps() {
        let origin = Pos::new(3, 3);
        assert_eq!(Direction::between(origin, Pos::new(4, 3)), Some(Direction::East));
        assert_eq!(Direction::between(origin, Pos::new(3, 2)), Some(Direction::North));
        assert_eq!(Direction::between(origin, Pos::new(4, 4)), None);
        assert_eq!(Direction::between(origin, Pos::new(5, 3)), None);
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn pos_ordering_is_row_major() {
        assert!(Pos::new(5, 0) < Pos::new(0, 1));
        assert!(Pos::new(1, 2) < Pos::new(2, 2));
    }

    #[test]
    fn step_round_trips_with_between() {
        for direction in Direction::CARDINAL {
            let from = Pos::new(4, 4);
            assert_eq!(Direction::between(from, from.step(direction)), Some(direction));
        }
    }
}
