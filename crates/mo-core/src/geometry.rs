//! Map geometry
//!
//! Coordinates, keypad directions, distance and line of sight. Shared by the
//! generator and the creature engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A grid position, row first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub y: i32,
    pub x: i32,
}

impl Coord {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// The cell one step away in `dir`
    pub const fn step(self, dir: Direction) -> Self {
        let (dy, dx) = dir.delta();
        Self::new(self.y + dy, self.x + dx)
    }

    pub const fn offset(self, dy: i32, dx: i32) -> Self {
        Self::new(self.y + dy, self.x + dx)
    }

    /// The eight surrounding cells, including out-of-bounds ones
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        Direction::COMPASS.into_iter().map(move |d| self.step(d))
    }

    /// The four orthogonal neighbours
    pub fn orthogonal(self) -> [Coord; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }
}

/// Keypad direction: 7 8 9 / 4 5 6 / 1 2 3 with 5 meaning "stay"
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Direction {
    SouthWest = 1,
    South = 2,
    SouthEast = 3,
    West = 4,
    #[default]
    Here = 5,
    East = 6,
    NorthWest = 7,
    North = 8,
    NorthEast = 9,
}

impl Direction {
    /// All eight movement directions
    pub const COMPASS: [Direction; 8] = [
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
        Direction::West,
        Direction::East,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];

    /// Orthogonal directions in the order tunnels pick them
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Build from a keypad digit; anything outside 1..=9 maps to `Here`
    pub const fn from_keypad(n: i32) -> Self {
        match n {
            1 => Direction::SouthWest,
            2 => Direction::South,
            3 => Direction::SouthEast,
            4 => Direction::West,
            6 => Direction::East,
            7 => Direction::NorthWest,
            8 => Direction::North,
            9 => Direction::NorthEast,
            _ => Direction::Here,
        }
    }

    pub const fn keypad(self) -> i32 {
        self as i32
    }

    /// Row and column delta
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::SouthWest => (1, -1),
            Direction::South => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::West => (0, -1),
            Direction::Here => (0, 0),
            Direction::East => (0, 1),
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
        }
    }

    /// Direction from a row/column delta, each clamped to -1..=1
    pub const fn from_delta(dy: i32, dx: i32) -> Self {
        let n = 5 - 3 * dy.signum() + dx.signum();
        Self::from_keypad(n)
    }

    /// Opposite direction on the keypad
    pub const fn reverse(self) -> Self {
        Self::from_keypad(10 - self.keypad())
    }

    pub const fn is_diagonal(self) -> bool {
        let (dy, dx) = self.delta();
        dy != 0 && dx != 0
    }
}

/// Approximate Euclidean distance: the longer axis plus half the shorter one
pub fn distance(a: Coord, b: Coord) -> i32 {
    let dy = (a.y - b.y).abs();
    let dx = (a.x - b.x).abs();
    (((dy + dx) << 1) - dy.min(dx)) >> 1
}

/// Strictly inside the boundary ring of a `height` x `width` grid
pub const fn in_bounds(c: Coord, height: i32, width: i32) -> bool {
    c.y > 0 && c.y < height - 1 && c.x > 0 && c.x < width - 1
}

/// Anywhere on the grid, boundary included
pub const fn on_grid(c: Coord, height: i32, width: i32) -> bool {
    c.y >= 0 && c.y < height && c.x >= 0 && c.x < width
}

/// Line of sight between two cells
///
/// Walks a Bresenham line from `from` to `to`; only the cells strictly between
/// the endpoints are tested with `blocks`.
pub fn los(from: Coord, to: Coord, blocks: impl Fn(Coord) -> bool) -> bool {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut cur = from;

    loop {
        if cur == to {
            return true;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cur.x += sx;
        }
        if e2 <= dx {
            err += dx;
            cur.y += sy;
        }
        if cur != to && blocks(cur) {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_examples() {
        let o = Coord::new(0, 0);
        assert_eq!(distance(o, Coord::new(0, 0)), 0);
        assert_eq!(distance(o, Coord::new(0, 10)), 10);
        assert_eq!(distance(o, Coord::new(1, 1)), 1);
        assert_eq!(distance(o, Coord::new(4, 4)), 6);
        assert_eq!(distance(o, Coord::new(3, 10)), 11);
    }

    #[test]
    fn test_direction_round_trip() {
        for d in Direction::COMPASS {
            let (dy, dx) = d.delta();
            assert_eq!(Direction::from_delta(dy, dx), d);
            assert_eq!(d.reverse().reverse(), d);
        }
        assert_eq!(Direction::NorthEast.reverse(), Direction::SouthWest);
        assert_eq!(Direction::from_delta(5, -7), Direction::SouthWest);
    }

    #[test]
    fn test_in_bounds_excludes_ring() {
        assert!(!in_bounds(Coord::new(0, 5), 10, 10));
        assert!(!in_bounds(Coord::new(9, 5), 10, 10));
        assert!(!in_bounds(Coord::new(5, 0), 10, 10));
        assert!(in_bounds(Coord::new(1, 1), 10, 10));
        assert!(on_grid(Coord::new(0, 0), 10, 10));
    }

    #[test]
    fn test_los_blocked_by_wall() {
        let wall = Coord::new(0, 2);
        assert!(!los(Coord::new(0, 0), Coord::new(0, 4), |c| c == wall));
        assert!(los(Coord::new(0, 0), Coord::new(2, 0), |c| c == wall));
    }

    #[test]
    fn test_los_endpoints_not_tested() {
        assert!(los(Coord::new(0, 0), Coord::new(0, 1), |_| true));
        assert!(los(Coord::new(3, 3), Coord::new(3, 3), |_| true));
    }

    proptest! {
        #[test]
        fn prop_distance_symmetric(y1 in -100i32..100, x1 in -100i32..100, y2 in -100i32..100, x2 in -100i32..100) {
            let a = Coord::new(y1, x1);
            let b = Coord::new(y2, x2);
            prop_assert_eq!(distance(a, b), distance(b, a));
            let dy = (y1 - y2).abs();
            let dx = (x1 - x2).abs();
            prop_assert!(distance(a, b) >= dy.max(dx));
            prop_assert!(distance(a, b) <= dy + dx);
        }
    }
}
