use strum::{Display, EnumIter, EnumString};

/// Integer grid coordinate. `i` grows to the right, `j` grows downwards and is
/// zero on the first row below the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    pub fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    pub fn distance(&self, other: &Cell) -> i32 {
        (self.i - other.i).abs() + (self.j - other.j).abs()
    }

    pub fn offset(&self, direction: Direction) -> Cell {
        let (di, dj) = direction.delta();
        Cell::new(self.i + di, self.j + dj)
    }

    pub fn neighbors(&self) -> [Cell; 4] {
        [
            self.offset(Direction::Up),
            self.offset(Direction::Right),
            self.offset(Direction::Down),
            self.offset(Direction::Left),
        ]
    }
}

/// Grid moves used by the block-level planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    /// Converts a player-one-relative utility into this player's perspective.
    pub fn perspective(self, utility: f32) -> f32 {
        match self {
            PlayerId::One => utility,
            PlayerId::Two => -utility,
        }
    }
}
