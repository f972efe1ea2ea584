use crate::infra::{Cell, PlayerId};
use crate::state::combatant::{Combatant, Shot, Weapon};
use crate::state::terrain::{
    BLOCK_SIZE, BLOCKS_HEIGHT, BLOCKS_WIDTH, FLOOR_LEVEL, Terrain, cell_at, i_to_x_min, j_to_y_min,
};

pub const ROCKET_SPEED: f32 = 14.0;
pub const ROCKET_DAMAGE: f32 = 42.0;
pub const MINION_SPEED: f32 = 4.0;
pub const MINION_DAMAGE: f32 = 42.0;
pub const EXPLOSION_RADIUS: f32 = 100.0;
pub const EXPLOSION_STRENGTH: f32 = 48.0;
pub const LIGHTNING_TICKS: i32 = 20;

const MINION_FUSE: i32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub facing_right: bool,
    pub weapon: Weapon,
    pub owner: PlayerId,
    v_speed: f32,
    fuse: i32,
}

impl Projectile {
    pub fn from_shot(shot: Shot, owner: PlayerId) -> Self {
        let fuse = match shot.weapon {
            Weapon::Lightning => LIGHTNING_TICKS,
            _ => MINION_FUSE,
        };
        Self {
            x: shot.x,
            y: shot.y,
            facing_right: shot.facing_right,
            weapon: shot.weapon,
            owner,
            v_speed: 0.0,
            fuse,
        }
    }

    fn direction(&self) -> f32 {
        if self.facing_right { 1.0 } else { -1.0 }
    }

    /// Moves one tick against `target`, the owner's opponent. Returns `false`
    /// once the projectile is spent.
    pub fn advance(&mut self, terrain: &mut Terrain, target: &mut Combatant) -> bool {
        match self.weapon {
            Weapon::Rockets => self.advance_rocket(terrain, target),
            Weapon::Bombs => self.advance_bomb(terrain, target),
            Weapon::Minions => self.advance_minion(terrain, target),
            Weapon::Lightning => self.advance_lightning(terrain, target),
            Weapon::None => false,
        }
    }

    fn advance_rocket(&mut self, terrain: &mut Terrain, target: &mut Combatant) -> bool {
        self.x += self.direction() * ROCKET_SPEED;

        if target.is_alive()
            && target.intersects_rect(self.x - 16.0, self.y - 12.0, self.x + 16.0, self.y + 12.0)
        {
            target.health -= ROCKET_DAMAGE;
            return false;
        }

        let nose = self.x + self.direction() * 16.0;
        for y in [self.y - 8.0, self.y + 8.0] {
            if terrain.is_ground_at(nose, y) {
                terrain.set_ground_at(nose, y, false);
                return false;
            }
        }
        true
    }

    fn advance_bomb(&mut self, terrain: &mut Terrain, target: &mut Combatant) -> bool {
        self.y += self.v_speed;
        self.v_speed += 1.0;

        let mut burst = target.is_alive()
            && target.intersects_rect(self.x - 12.0, self.y - 12.0, self.x + 12.0, self.y + 12.0);

        for x in [self.x - 6.0, self.x + 6.0] {
            if !burst && terrain.is_ground_at(x, self.y) {
                terrain.set_ground_at(x, self.y, false);
                burst = true;
            }
        }

        if burst {
            explode(self.x, self.y, target);
            return false;
        }
        true
    }

    fn advance_minion(&mut self, terrain: &mut Terrain, target: &mut Combatant) -> bool {
        let dir = self.direction();
        let falling = !(terrain.is_ground_at(self.x - 9.0, self.y + 36.0 + self.v_speed)
            || terrain.is_ground_at(self.x + 9.0, self.y + 36.0 + self.v_speed));
        let ahead = self.x + dir * (MINION_SPEED + 18.0);
        let pushing = terrain.is_ground_at(ahead, self.y + 8.0)
            || terrain.is_ground_at(ahead, self.y - 15.0);

        if falling {
            self.y += self.v_speed;
            self.v_speed += 1.0;
            self.fuse = MINION_FUSE;
        } else {
            self.v_speed = 0.0;
            self.y =
                ((self.y - FLOOR_LEVEL) / BLOCK_SIZE).ceil() * BLOCK_SIZE + FLOOR_LEVEL - 15.0;
        }

        if !pushing {
            self.x += dir * MINION_SPEED;
            self.fuse = MINION_FUSE;
        } else if !falling {
            self.fuse -= 1;
            if self.fuse <= 0 {
                explode(self.x, self.y, target);
                let wall = cell_at(ahead, self.y);
                if terrain.is_ground(wall) && !terrain.is_immutable(wall) {
                    terrain.set_ground(wall, false);
                } else {
                    terrain.set_ground_at(self.x, self.y + BLOCK_SIZE, false);
                }
                return false;
            }
        }

        if target.is_alive()
            && target.intersects_rect(self.x - 18.0, self.y - 18.0, self.x + 18.0, self.y + 18.0)
        {
            target.health -= MINION_DAMAGE;
            return false;
        }
        true
    }

    fn advance_lightning(&mut self, terrain: &mut Terrain, target: &mut Combatant) -> bool {
        if self.fuse == LIGHTNING_TICKS {
            // Clear every block in the column strictly above the strike
            for i in 0..BLOCKS_WIDTH {
                let x_min = i_to_x_min(i);
                if x_min + BLOCK_SIZE <= self.x - 16.0 || x_min >= self.x + 16.0 {
                    continue;
                }
                for j in 0..BLOCKS_HEIGHT {
                    if j_to_y_min(j) < self.y {
                        terrain.set_ground(Cell::new(i, j), false);
                    }
                }
            }
        }

        if target.is_alive()
            && target.x > self.x - 34.0
            && target.x < self.x + 34.0
            && target.y < self.y
        {
            target.zap();
        }

        self.fuse -= 1;
        self.fuse > 0
    }
}

fn explode(x: f32, y: f32, target: &mut Combatant) {
    if !target.is_alive() {
        return;
    }
    let d = ((target.x - x).powi(2) + (target.y - y).powi(2)).sqrt();
    if d < EXPLOSION_RADIUS {
        target.health -= (EXPLOSION_RADIUS - d) / EXPLOSION_RADIUS * EXPLOSION_STRENGTH;
    }
}
