use strum::{Display, EnumIter, EnumString};

use crate::infra::Cell;
use crate::state::combatant::Weapon;
use crate::state::terrain::{BLOCK_SIZE, Terrain, cell_at, j_to_y_min, y_to_j};

const MAX_FALL_SPEED: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum PowerupKind {
    Bombs,
    Rockets,
    Minions,
    Lightning,
    Speed,
    Gravity,
}

impl PowerupKind {
    /// Weapon granted on pickup, `None` for the timed boosts.
    pub fn weapon(self) -> Option<Weapon> {
        match self {
            PowerupKind::Bombs => Some(Weapon::Bombs),
            PowerupKind::Rockets => Some(Weapon::Rockets),
            PowerupKind::Minions => Some(Weapon::Minions),
            PowerupKind::Lightning => Some(Weapon::Lightning),
            PowerupKind::Speed | PowerupKind::Gravity => None,
        }
    }
}

/// A block-sized crate anchored at its top-left corner. Crates fall until
/// they rest on ground.
#[derive(Debug, Clone, PartialEq)]
pub struct Powerup {
    pub x: f32,
    pub y: f32,
    pub kind: PowerupKind,
    v_speed: f32,
}

impl Powerup {
    pub fn new(x: f32, y: f32, kind: PowerupKind) -> Self {
        Self {
            x,
            y,
            kind,
            v_speed: 0.0,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + BLOCK_SIZE / 2.0, self.y + BLOCK_SIZE / 2.0)
    }

    pub fn cell(&self) -> Cell {
        let (x, y) = self.center();
        cell_at(x, y)
    }

    pub fn is_resting(&self, terrain: &Terrain) -> bool {
        self.ground_below(terrain, 0.0)
    }

    pub fn advance(&mut self, terrain: &Terrain) {
        let next = self.v_speed.max(1.0);
        if self.ground_below(terrain, next) {
            // Snap onto the top of the block below
            let landing_j = y_to_j(self.y + BLOCK_SIZE + next);
            self.y = j_to_y_min(landing_j) - BLOCK_SIZE;
            self.v_speed = 0.0;
        } else {
            self.y += self.v_speed;
            self.v_speed = (self.v_speed + 1.0).min(MAX_FALL_SPEED);
        }
    }

    /// Pickup rectangle used for collection.
    pub fn touches(&self, x: f32, y: f32) -> bool {
        let (x1, y1, x2, y2) = (self.x + 10.0, self.y + 7.0, self.x + 54.0, self.y + 57.0);
        x1 < x + 32.0 && x2 > x - 32.0 && y1 < y + 32.0 && y2 > y - 32.0
    }

    fn ground_below(&self, terrain: &Terrain, dy: f32) -> bool {
        let feet = self.y + BLOCK_SIZE + dy;
        terrain.is_ground_at(self.x + 10.0, feet) || terrain.is_ground_at(self.x + 54.0, feet)
    }
}
