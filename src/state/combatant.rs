use strum::{Display, EnumIter, EnumString};

use crate::state::terrain::{BLOCK_SIZE, FLOOR_LEVEL, Terrain};

pub const DEFAULT_SPEED: f32 = 7.0;
pub const MAX_HEALTH: f32 = 100.0;
pub const POWERUP_DURATION: i32 = 600;

const HALF_WIDTH: f32 = 18.0;
const HEAD_OFFSET: f32 = 25.0;
const BODY_OFFSET: f32 = 24.0;
const FEET_OFFSET: f32 = 33.0;
const JUMP_SPEED: f32 = -15.0;
const MAX_FALL_SPEED: f32 = 45.0;
const WALL_STICK_TICKS: i32 = 3;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
pub enum Weapon {
    #[default]
    None,
    Bombs,
    Rockets,
    Minions,
    Lightning,
}

impl Weapon {
    /// Shots granted by picking the weapon up.
    pub fn reload(self) -> i32 {
        match self {
            Weapon::None => 0,
            Weapon::Lightning => 1,
            Weapon::Bombs | Weapon::Rockets | Weapon::Minions => 3,
        }
    }

    /// Ticks before the next shot.
    pub fn cooldown(self) -> i32 {
        match self {
            Weapon::Lightning => 30,
            Weapon::Minions => 3,
            Weapon::Rockets => 2,
            Weapon::Bombs | Weapon::None => 1,
        }
    }
}

/// One keypress per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Action {
    Idle,
    Jump,
    Fire,
    Left,
    Right,
}

impl Action {
    pub fn is_movement(self) -> bool {
        matches!(self, Action::Idle | Action::Left | Action::Right)
    }
}

/// A shot leaving the barrel this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub x: f32,
    pub y: f32,
    pub facing_right: bool,
    pub weapon: Weapon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub x: f32,
    pub y: f32,
    pub facing_right: bool,
    pub speed: f32,
    pub gravity: f32,
    pub health: f32,
    pub ammo: i32,
    pub weapon: Weapon,
    is_master: bool,
    v_speed: f32,
    grounded: bool,
    wall_stick: i32,
    fire_wait: i32,
    speed_timer: i32,
    gravity_timer: i32,
}

impl Combatant {
    pub fn new(x: f32, y: f32, is_master: bool) -> Self {
        let mut combatant = Self {
            x,
            y,
            facing_right: false,
            speed: DEFAULT_SPEED,
            gravity: 1.0,
            health: MAX_HEALTH,
            ammo: 0,
            weapon: Weapon::None,
            is_master: false,
            v_speed: 0.0,
            grounded: true,
            wall_stick: 0,
            fire_wait: 0,
            speed_timer: 0,
            gravity_timer: 0,
        };
        combatant.set_master(is_master);
        combatant
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_master(&self) -> bool {
        self.is_master
    }

    /// Master mode has unlimited ammo, stored as `-1`.
    pub fn set_master(&mut self, is_master: bool) {
        self.is_master = is_master;
        self.ammo = if is_master { -1 } else { 0 };
    }

    pub fn equip(&mut self, weapon: Weapon) {
        self.weapon = weapon;
        if !self.is_master {
            self.ammo = weapon.reload();
        }
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo > 0 || self.is_master
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn boost_speed(&mut self) {
        if self.speed < 28.0 {
            self.speed *= 2.0;
        }
        self.speed_timer = POWERUP_DURATION;
    }

    pub fn lower_gravity(&mut self) {
        if self.gravity > 0.25 {
            self.gravity /= 2.0;
        }
        self.gravity_timer = POWERUP_DURATION;
    }

    /// Knocked upwards by lightning.
    pub fn zap(&mut self) {
        self.health = 0.0;
        self.v_speed -= 10.0;
    }

    pub fn can_apply(&self, action: Action, terrain: &Terrain) -> bool {
        match action {
            Action::Idle => true,
            Action::Jump => self.grounded || self.wall_stick > 0,
            Action::Fire => self.has_ammo() && self.fire_wait == 0 && self.weapon != Weapon::None,
            Action::Left => !self.blocked(-self.speed, terrain) || self.v_speed > 0.0,
            Action::Right => !self.blocked(self.speed, terrain) || self.v_speed > 0.0,
        }
    }

    pub fn legal_actions(&self, terrain: &Terrain) -> Vec<Action> {
        [
            Action::Left,
            Action::Right,
            Action::Fire,
            Action::Jump,
            Action::Idle,
        ]
        .into_iter()
        .filter(|action| self.can_apply(*action, terrain))
        .collect()
    }

    /// Applies one tick of input and gravity. Returns the shot fired, if any.
    pub fn advance(&mut self, action: Action, terrain: &Terrain) -> Option<Shot> {
        self.tick_timers();

        let mut shot = None;
        if self.is_alive() {
            match action {
                Action::Fire => shot = self.fire(),
                Action::Jump => self.jump(),
                Action::Left => self.move_horizontally(-self.speed, terrain),
                Action::Right => self.move_horizontally(self.speed, terrain),
                Action::Idle => {}
            }
        }

        self.fall(terrain);
        shot
    }

    /// Player hitbox test against the corners of a rectangle.
    pub fn intersects_rect(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        self.contains_point(x1, y1)
            || self.contains_point(x2, y2)
            || self.contains_point(x1, y2)
            || self.contains_point(x2, y1)
    }

    fn contains_point(&self, x: f32, y: f32) -> bool {
        x > self.x - HALF_WIDTH
            && x < self.x + HALF_WIDTH
            && y > self.y - HEAD_OFFSET
            && y < self.y + HEAD_OFFSET
    }

    fn tick_timers(&mut self) {
        if self.fire_wait > 0 {
            self.fire_wait -= 1;
        }
        if self.wall_stick > 0 {
            self.wall_stick -= 1;
        }
        if self.speed_timer > 0 {
            self.speed_timer -= 1;
            if self.speed_timer == 0 {
                self.speed = DEFAULT_SPEED;
            }
        }
        if self.gravity_timer > 0 {
            self.gravity_timer -= 1;
            if self.gravity_timer == 0 {
                self.gravity = 1.0;
            }
        }
    }

    fn blocked(&self, dx: f32, terrain: &Terrain) -> bool {
        let edge = if dx > 0.0 { HALF_WIDTH } else { -HALF_WIDTH };
        terrain.is_ground_at(self.x + edge + dx, self.y - HEAD_OFFSET)
            || terrain.is_ground_at(self.x + edge + dx, self.y + BODY_OFFSET)
    }

    fn fire(&mut self) -> Option<Shot> {
        if !self.has_ammo() || self.fire_wait != 0 || self.weapon == Weapon::None {
            return None;
        }

        self.fire_wait = self.weapon.cooldown();
        if !self.is_master {
            self.ammo -= 1;
        }
        Some(Shot {
            x: self.x,
            y: self.y,
            facing_right: self.facing_right,
            weapon: self.weapon,
        })
    }

    fn jump(&mut self) {
        if self.grounded || self.wall_stick > 0 {
            self.v_speed = JUMP_SPEED;
        }
    }

    fn move_horizontally(&mut self, dx: f32, terrain: &Terrain) {
        self.facing_right = dx > 0.0;
        if self.blocked(dx, terrain) {
            self.v_speed = self.v_speed.min(0.0);
            self.wall_stick = WALL_STICK_TICKS;
        } else {
            self.x += dx;
        }
    }

    fn fall(&mut self, terrain: &Terrain) {
        let feet = self.y + FEET_OFFSET + self.v_speed;
        let landed = terrain.is_ground_at(self.x, feet)
            || terrain.is_ground_at(self.x - HALF_WIDTH, feet)
            || terrain.is_ground_at(self.x + HALF_WIDTH, feet);

        if landed {
            if self.v_speed > 0.0 {
                self.y = ((self.y - FLOOR_LEVEL) / BLOCK_SIZE).floor() * BLOCK_SIZE
                    + FLOOR_LEVEL
                    + 39.0;
            }
            self.v_speed = self.v_speed.min(0.0);
            self.grounded = true;
            return;
        }

        self.y += self.v_speed;
        self.grounded = false;
        self.v_speed = (self.v_speed + self.gravity).min(MAX_FALL_SPEED);

        if self.v_speed < 0.0 {
            let head = self.y - HEAD_OFFSET + self.v_speed;
            if terrain.is_ground_at(self.x - HALF_WIDTH, head)
                || terrain.is_ground_at(self.x + HALF_WIDTH, head)
            {
                self.v_speed = 0.0;
                self.y = ((self.y - FLOOR_LEVEL) / BLOCK_SIZE).ceil() * BLOCK_SIZE + FLOOR_LEVEL
                    - 39.0;
            }
        }

        let min_y = BLOCK_SIZE / 2.0;
        if self.y < min_y {
            self.y = min_y;
            self.v_speed = self.v_speed.max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Cell;
    use crate::state::terrain::{cell_at, cell_center};

    fn floor_terrain() -> Terrain {
        let mut terrain = Terrain::empty();
        for i in 0..46 {
            terrain.set_ground(Cell::new(i, 0), true);
        }
        terrain
    }

    /// Combatant resting in the sky row above the surface.
    fn standing(x: f32) -> Combatant {
        Combatant::new(x, FLOOR_LEVEL - 25.0, false)
    }

    #[test]
    fn test_master_has_unlimited_ammo() {
        let mut master = Combatant::new(0.0, 0.0, true);
        assert_eq!(master.ammo, -1);
        master.equip(Weapon::Rockets);
        assert_eq!(master.ammo, -1);
        assert!(master.has_ammo());

        let mut regular = Combatant::new(0.0, 0.0, false);
        regular.equip(Weapon::Lightning);
        assert_eq!(regular.ammo, 1);
        regular.equip(Weapon::Bombs);
        assert_eq!(regular.ammo, 3);
    }

    #[test]
    fn test_idle_always_legal_and_fire_needs_weapon() {
        let terrain = floor_terrain();
        let mut combatant = standing(300.0);
        let actions = combatant.legal_actions(&terrain);
        assert!(actions.contains(&Action::Idle));
        assert!(!actions.contains(&Action::Fire));

        combatant.equip(Weapon::Rockets);
        assert!(combatant.legal_actions(&terrain).contains(&Action::Fire));
    }

    #[test]
    fn test_standing_on_floor_stays_put() {
        let terrain = floor_terrain();
        let mut combatant = standing(300.0);
        for _ in 0..10 {
            combatant.advance(Action::Idle, &terrain);
        }
        assert!(combatant.is_grounded());
        assert_eq!(cell_at(combatant.x, combatant.y), Cell::new(4, -1));
    }

    #[test]
    fn test_walking_moves_by_speed() {
        let terrain = floor_terrain();
        let mut combatant = standing(300.0);
        combatant.advance(Action::Right, &terrain);
        assert!((combatant.x - 307.0).abs() < 1e-4);
        assert!(combatant.facing_right);
        combatant.advance(Action::Left, &terrain);
        assert!((combatant.x - 300.0).abs() < 1e-4);
        assert!(!combatant.facing_right);
    }

    #[test]
    fn test_fire_consumes_ammo_and_waits() {
        let terrain = floor_terrain();
        let mut combatant = standing(300.0);
        combatant.equip(Weapon::Rockets);
        let shot = combatant.advance(Action::Fire, &terrain);
        assert!(shot.is_some());
        assert_eq!(combatant.ammo, 2);
        assert!(!combatant.can_apply(Action::Fire, &terrain));
    }

    #[test]
    fn test_unsupported_combatant_falls() {
        let terrain = Terrain::empty();
        let (x, y) = cell_center(Cell::new(4, 3));
        let mut combatant = Combatant::new(x, y, false);
        for _ in 0..5 {
            combatant.advance(Action::Idle, &terrain);
        }
        assert!(combatant.y > y);
        assert!(!combatant.is_grounded());
    }
}
