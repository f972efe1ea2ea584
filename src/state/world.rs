use rand::Rng;

use crate::infra::PlayerId;
use crate::state::combatant::{Action, Combatant};
use crate::state::match_context::MatchContext;
use crate::state::powerup::{Powerup, PowerupKind};
use crate::state::projectile::Projectile;
use crate::state::terrain::{BLOCK_SIZE, FLOOR_LEVEL, Terrain};

pub const PLAYER_ONE_SPAWN_X: f32 = 1344.0;
pub const PLAYER_TWO_SPAWN_X: f32 = 400.0;
pub const SPAWN_Y: f32 = 864.0;
const STARTING_CRATES_X: [f32; 4] = [1792.0, 1952.0, 1088.0, 928.0];

/// Per-combatant input for one tick. `None` leaves that combatant untouched,
/// which lets a search advance one side at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub one: Option<Action>,
    pub two: Option<Action>,
}

impl Actions {
    pub fn both(one: Action, two: Action) -> Self {
        Self {
            one: Some(one),
            two: Some(two),
        }
    }

    pub fn only(player: PlayerId, action: Action) -> Self {
        match player {
            PlayerId::One => Self {
                one: Some(action),
                two: None,
            },
            PlayerId::Two => Self {
                one: None,
                two: Some(action),
            },
        }
    }

    pub fn get(&self, player: PlayerId) -> Option<Action> {
        match player {
            PlayerId::One => self.one,
            PlayerId::Two => self.two,
        }
    }
}

/// Complete simulation state. Cloning is a deep copy.
#[derive(Debug, Clone)]
pub struct World {
    pub terrain: Terrain,
    pub combatants: [Combatant; 2],
    pub powerups: Vec<Powerup>,
    pub projectiles: Vec<Projectile>,
    pub tick: u32,
}

impl World {
    /// Places both combatants and the starting crates on `terrain`.
    pub fn new(terrain: Terrain, context: &MatchContext) -> Self {
        let master = context.master();
        let one = Combatant::new(PLAYER_ONE_SPAWN_X, SPAWN_Y, master == Some(PlayerId::One));
        let two = Combatant::new(PLAYER_TWO_SPAWN_X, SPAWN_Y, master == Some(PlayerId::Two));

        let powerups = STARTING_CRATES_X
            .iter()
            .map(|&x| Powerup::new(x, FLOOR_LEVEL - BLOCK_SIZE, PowerupKind::Minions))
            .collect();

        Self {
            terrain,
            combatants: [one, two],
            powerups,
            projectiles: Vec::new(),
            tick: 0,
        }
    }

    pub fn generate<R: Rng>(rng: &mut R, context: &MatchContext) -> Self {
        Self::new(Terrain::generate(rng), context)
    }

    pub fn combatant(&self, player: PlayerId) -> &Combatant {
        &self.combatants[player.index()]
    }

    pub fn combatant_mut(&mut self, player: PlayerId) -> &mut Combatant {
        &mut self.combatants[player.index()]
    }

    pub fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        self.combatant(player).legal_actions(&self.terrain)
    }

    pub fn is_terminal(&self) -> bool {
        self.combatants.iter().any(|c| !c.is_alive())
    }

    /// `1` when player one won, `-1` when player two won, `0` otherwise.
    pub fn terminal_utility(&self) -> f32 {
        match (self.combatants[0].is_alive(), self.combatants[1].is_alive()) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Applies one tick: combatants given an action, then crates, then
    /// projectiles.
    pub fn advance(&mut self, actions: Actions) {
        for player in [PlayerId::One, PlayerId::Two] {
            let Some(action) = actions.get(player) else {
                continue;
            };

            let combatant = &mut self.combatants[player.index()];
            if let Some(shot) = combatant.advance(action, &self.terrain) {
                self.projectiles.push(Projectile::from_shot(shot, player));
            }
            self.collect_powerups(player);
        }

        for powerup in &mut self.powerups {
            powerup.advance(&self.terrain);
        }

        let terrain = &mut self.terrain;
        let combatants = &mut self.combatants;
        self.projectiles.retain_mut(|projectile| {
            let target = &mut combatants[projectile.owner.opponent().index()];
            projectile.advance(terrain, target)
        });

        self.tick += 1;
    }

    pub fn spawn_powerup(&mut self, powerup: Powerup) {
        self.powerups.push(powerup);
    }

    fn collect_powerups(&mut self, player: PlayerId) {
        let combatant = &mut self.combatants[player.index()];
        if !combatant.is_alive() {
            return;
        }

        let (x, y) = (combatant.x, combatant.y);
        self.powerups.retain(|powerup| {
            if !powerup.touches(x, y) {
                return true;
            }
            match powerup.kind.weapon() {
                Some(weapon) => combatant.equip(weapon),
                None if powerup.kind == PowerupKind::Speed => combatant.boost_speed(),
                None => combatant.lower_gravity(),
            }
            tracing::trace!(?player, kind = %powerup.kind, "powerup collected");
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Cell;
    use crate::state::combatant::Weapon;
    use crate::state::terrain::{cell_at, cell_center, i_to_x_min};

    fn flat_world() -> World {
        let mut terrain = Terrain::empty();
        for i in 0..46 {
            terrain.set_ground(Cell::new(i, 0), true);
        }
        let mut world = World::new(terrain, &MatchContext::default());
        world.powerups.clear();
        world
    }

    #[test]
    fn test_new_world_is_live() {
        let world = flat_world();
        assert!(!world.is_terminal());
        assert_eq!(world.terminal_utility(), 0.0);
        assert!(world.combatant(PlayerId::Two).is_master());
        assert!(!world.combatant(PlayerId::One).is_master());
    }

    #[test]
    fn test_terminal_utility_favours_survivor() {
        let mut world = flat_world();
        world.combatant_mut(PlayerId::Two).health = 0.0;
        assert!(world.is_terminal());
        assert_eq!(world.terminal_utility(), 1.0);

        world.combatant_mut(PlayerId::Two).health = 10.0;
        world.combatant_mut(PlayerId::One).health = -5.0;
        assert_eq!(world.terminal_utility(), -1.0);
    }

    #[test]
    fn test_frozen_combatant_is_untouched() {
        let mut world = flat_world();
        let before = world.combatant(PlayerId::Two).clone();
        world.advance(Actions::only(PlayerId::One, Action::Right));
        assert_eq!(world.combatant(PlayerId::Two), &before);
        assert!(world.combatant(PlayerId::One).x > PLAYER_ONE_SPAWN_X);
        assert_eq!(world.tick, 1);
    }

    #[test]
    fn test_walking_into_crate_equips_weapon() {
        let mut world = flat_world();
        let spawn = cell_at(PLAYER_ONE_SPAWN_X, SPAWN_Y);
        world.spawn_powerup(Powerup::new(
            i_to_x_min(spawn.i - 1),
            FLOOR_LEVEL - BLOCK_SIZE,
            PowerupKind::Rockets,
        ));

        for _ in 0..20 {
            world.advance(Actions::only(PlayerId::One, Action::Left));
        }

        let one = world.combatant(PlayerId::One);
        assert_eq!(one.weapon, Weapon::Rockets);
        assert_eq!(one.ammo, 3);
        assert!(world.powerups.is_empty());
    }

    #[test]
    fn test_rocket_shot_damages_opponent() {
        let mut world = flat_world();
        let (x, _) = cell_center(Cell::new(10, -1));
        world.combatant_mut(PlayerId::One).x = x;
        world.combatant_mut(PlayerId::Two).x = x - 3.0 * BLOCK_SIZE;
        world.combatant_mut(PlayerId::One).equip(Weapon::Rockets);
        world.combatant_mut(PlayerId::One).facing_right = false;

        world.advance(Actions::both(Action::Fire, Action::Idle));
        for _ in 0..30 {
            world.advance(Actions::both(Action::Idle, Action::Idle));
        }

        assert!(world.combatant(PlayerId::Two).health < 100.0);
        assert!(world.projectiles.is_empty());
    }
}
