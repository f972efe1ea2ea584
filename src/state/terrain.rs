use rand::Rng;

use crate::infra::Cell;

pub const BLOCKS_WIDTH: i32 = 46;
pub const BLOCKS_HEIGHT: i32 = 16;
pub const BLOCK_SIZE: f32 = 64.0;

/// Rows of open sky above the diggable area.
pub const FLOOR_LEVEL_J: i32 = 14;
pub const FLOOR_LEVEL: f32 = BLOCK_SIZE * FLOOR_LEVEL_J as f32;

/// Depth (in rows below the surface) of the indestructible middle wall.
pub const WALL_DEPTH_J: i32 = 4;

pub fn x_to_i(x: f32) -> i32 {
    (x / BLOCK_SIZE).floor() as i32
}

pub fn y_to_j(y: f32) -> i32 {
    ((y - FLOOR_LEVEL) / BLOCK_SIZE).floor() as i32
}

pub fn i_to_x_min(i: i32) -> f32 {
    i as f32 * BLOCK_SIZE
}

pub fn j_to_y_min(j: i32) -> f32 {
    j as f32 * BLOCK_SIZE + FLOOR_LEVEL
}

pub fn cell_at(x: f32, y: f32) -> Cell {
    Cell::new(x_to_i(x), y_to_j(y))
}

pub fn cell_center(cell: Cell) -> (f32, f32) {
    (
        i_to_x_min(cell.i) + BLOCK_SIZE / 2.0,
        j_to_y_min(cell.j) + BLOCK_SIZE / 2.0,
    )
}

/// Destructible ground below the surface. Everything outside the grid, plus
/// the middle wall, counts as immutable ground.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Terrain {
    ground: Vec<bool>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::empty()
    }
}

impl Terrain {
    pub fn empty() -> Self {
        Self {
            ground: vec![false; (BLOCKS_WIDTH * BLOCKS_HEIGHT) as usize],
        }
    }

    pub fn filled() -> Self {
        Self {
            ground: vec![true; (BLOCKS_WIDTH * BLOCKS_HEIGHT) as usize],
        }
    }

    /// Cave layout: open cells cluster below open cells, to the right of open
    /// cells and along the surface.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut terrain = Self::empty();
        let middle = BLOCKS_WIDTH / 2;

        for i in 0..BLOCKS_WIDTH {
            for j in 0..BLOCKS_HEIGHT {
                let mut chance = 0.02;

                if j != 0 {
                    let under_wall = (i == middle - 1 || i == middle) && j == WALL_DEPTH_J;
                    if !terrain.is_ground(Cell::new(i, j - 1)) && !under_wall {
                        chance += 0.4;
                    }
                } else {
                    chance += 0.15;
                }

                if i != 0 {
                    let beside_wall = i == middle + 1 && j < WALL_DEPTH_J;
                    if !terrain.is_ground(Cell::new(i - 1, j)) && !beside_wall {
                        chance += 0.4;
                    }
                }

                let in_wall = i >= middle - 1 && i < middle + 1 && j < WALL_DEPTH_J;
                let open = in_wall || rng.random::<f32>() <= chance;
                terrain.set_ground(Cell::new(i, j), !open);
            }
        }

        terrain
    }

    pub fn is_immutable(&self, cell: Cell) -> bool {
        if cell.i < 0 || cell.i >= BLOCKS_WIDTH {
            return true;
        }
        if cell.j >= BLOCKS_HEIGHT || cell.j + FLOOR_LEVEL_J < 0 {
            return true;
        }
        (cell.i == 22 || cell.i == 23) && cell.j < WALL_DEPTH_J
    }

    pub fn is_ground(&self, cell: Cell) -> bool {
        if self.is_immutable(cell) {
            return true;
        }
        if cell.j < 0 {
            return false;
        }
        self.ground[Self::index(cell)]
    }

    pub fn is_ground_at(&self, x: f32, y: f32) -> bool {
        self.is_ground(cell_at(x, y))
    }

    /// Writes outside the diggable area are ignored.
    pub fn set_ground(&mut self, cell: Cell, value: bool) {
        if cell.i < 0 || cell.i >= BLOCKS_WIDTH || cell.j < 0 || cell.j >= BLOCKS_HEIGHT {
            return;
        }
        self.ground[Self::index(cell)] = value;
    }

    pub fn set_ground_at(&mut self, x: f32, y: f32, value: bool) {
        self.set_ground(cell_at(x, y), value);
    }

    /// A cell is a jumping-off point when ground touches it from below,
    /// diagonally below, or from either side.
    pub fn is_supported(&self, cell: Cell) -> bool {
        let Cell { i, j } = cell;
        self.is_ground(Cell::new(i, j + 1))
            || self.is_ground(Cell::new(i + 1, j + 1))
            || self.is_ground(Cell::new(i - 1, j + 1))
            || self.is_ground(Cell::new(i + 1, j))
            || self.is_ground(Cell::new(i - 1, j))
    }

    fn index(cell: Cell) -> usize {
        (cell.j * BLOCKS_WIDTH + cell.i) as usize
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_coordinate_round_trip() {
        let cell = Cell::new(10, 5);
        let (x, y) = cell_center(cell);
        assert_eq!(cell_at(x, y), cell);
        assert_eq!(y_to_j(FLOOR_LEVEL - 1.0), -1);
        assert_eq!(x_to_i(-1.0), -1);
    }

    #[test]
    fn test_bounds_and_middle_wall_are_immutable() {
        let terrain = Terrain::empty();
        assert!(terrain.is_immutable(Cell::new(-1, 0)));
        assert!(terrain.is_immutable(Cell::new(BLOCKS_WIDTH, 0)));
        assert!(terrain.is_immutable(Cell::new(0, BLOCKS_HEIGHT)));
        assert!(terrain.is_immutable(Cell::new(0, -FLOOR_LEVEL_J - 1)));
        assert!(terrain.is_immutable(Cell::new(22, -5)));
        assert!(terrain.is_immutable(Cell::new(23, 3)));
        assert!(!terrain.is_immutable(Cell::new(23, 4)));
        assert!(terrain.is_ground(Cell::new(22, 2)));
        assert!(!terrain.is_ground(Cell::new(5, -3)));
    }

    #[test]
    fn test_set_ground_ignores_sky_and_bounds() {
        let mut terrain = Terrain::empty();
        terrain.set_ground(Cell::new(5, -1), true);
        terrain.set_ground(Cell::new(-3, 2), true);
        assert_eq!(terrain, Terrain::empty());

        terrain.set_ground(Cell::new(5, 2), true);
        assert!(terrain.is_ground(Cell::new(5, 2)));
    }

    #[test]
    fn test_supported_cells() {
        let mut terrain = Terrain::empty();
        terrain.set_ground(Cell::new(5, 6), true);
        assert!(terrain.is_supported(Cell::new(5, 5)));
        assert!(terrain.is_supported(Cell::new(4, 5)));
        assert!(terrain.is_supported(Cell::new(4, 6)));
        assert!(!terrain.is_supported(Cell::new(5, 3)));
        // bottom row rests on the immutable floor
        assert!(terrain.is_supported(Cell::new(9, BLOCKS_HEIGHT - 1)));
    }

    #[test]
    fn test_generate_clears_middle_wall_column() {
        let mut rng = StdRng::seed_from_u64(7);
        let terrain = Terrain::generate(&mut rng);
        for j in 0..WALL_DEPTH_J {
            assert!(terrain.is_immutable(Cell::new(22, j)));
            assert!(!terrain.ground[Terrain::index(Cell::new(22, j))]);
            assert!(!terrain.ground[Terrain::index(Cell::new(23, j))]);
        }
    }
}
