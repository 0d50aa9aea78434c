use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn step(self, direction: Direction) -> Self {
        let (dy, dx) = direction.delta();
        Pos { y: self.y + dy, x: self.x + dx }
    }

    pub fn stride(self, direction: Direction, steps: i32) -> Self {
        let (dy, dx) = direction.delta();
        Pos { y: self.y + dy * steps, x: self.x + dx * steps }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

pub const ORTHOGONAL_DIRECTIONS: [Direction; 4] =
    [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
];

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::UpRight => (-1, 1),
            Direction::Right => (0, 1),
            Direction::DownRight => (1, 1),
            Direction::Down => (1, 0),
            Direction::DownLeft => (1, -1),
            Direction::Left => (0, -1),
            Direction::UpLeft => (-1, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::UpRight => Direction::DownLeft,
            Direction::Right => Direction::Left,
            Direction::DownRight => Direction::UpLeft,
            Direction::Down => Direction::Up,
            Direction::DownLeft => Direction::UpRight,
            Direction::Left => Direction::Right,
            Direction::UpLeft => Direction::DownRight,
        }
    }
}

/// Whether crates and the player move on 4 or 8 neighbors. Threaded through
/// every generation and analysis call instead of living in ambient state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    Orthogonal,
    Diagonal,
}

impl MovementMode {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            MovementMode::Orthogonal => &ORTHOGONAL_DIRECTIONS,
            MovementMode::Diagonal => &ALL_DIRECTIONS,
        }
    }

    /// Admissible step-count lower bound between two tiles.
    pub fn lower_bound(self, a: Pos, b: Pos) -> u32 {
        let dy = a.y.abs_diff(b.y);
        let dx = a.x.abs_diff(b.x);
        match self {
            MovementMode::Orthogonal => dy + dx,
            MovementMode::Diagonal => dy.max(dx),
        }
    }
}

/// Storage chambers fill their annex on creation and expect crates to be
/// pulled back out; feed chambers start empty and get pushed full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semantics {
    Storage,
    Feed,
}

/// Connectivity class of an open tile once crates are placed. `Outside` is
/// the region connected to the entrance; components are numbered in scan
/// order, which makes the labeling canonical for a given occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionLabel {
    Blocked,
    Outside,
    Component(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for direction in ALL_DIRECTIONS {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn stepping_and_striding_agree() {
        let origin = Pos { y: 3, x: -1 };
        for direction in ALL_DIRECTIONS {
            assert_eq!(origin.step(direction), origin.stride(direction, 1));
            assert_eq!(origin.step(direction).step(direction), origin.stride(direction, 2));
        }
    }

    #[test]
    fn lower_bound_matches_movement_mode() {
        let a = Pos { y: 0, x: 0 };
        let b = Pos { y: 3, x: 5 };
        assert_eq!(MovementMode::Orthogonal.lower_bound(a, b), 8);
        assert_eq!(MovementMode::Diagonal.lower_bound(a, b), 5);
    }
}
