use std::hash::{Hash, Hasher};

use crate::infra::{Cell, Direction, PlayerId};
use crate::state::terrain::{BLOCK_SIZE, BLOCKS_HEIGHT, cell_at, i_to_x_min, j_to_y_min};
use crate::state::{Terrain, Weapon, World};

/// The planning agent reduced to a cell and its digging capacity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockPlayer {
    pub cell: Cell,
    pub ammo: i32,
    pub weapon: Weapon,
    pub is_master: bool,
}

impl BlockPlayer {
    fn can_dig(&self, direction: Direction) -> bool {
        if self.ammo == 0 {
            return false;
        }
        matches!(
            (self.weapon, direction),
            (Weapon::Lightning, Direction::Up)
                | (Weapon::Rockets, Direction::Left | Direction::Right)
                | (Weapon::Bombs, Direction::Down)
        )
    }
}

/// A weapon crate, anchored at its top-left corner like the simulation's.
#[derive(Debug, Clone, Copy)]
pub struct BlockPickup {
    pub x: f32,
    pub y: f32,
    pub weapon: Weapon,
}

/// Bitwise, to agree with `Hash`.
impl PartialEq for BlockPickup {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.weapon == other.weapon
    }
}

impl Eq for BlockPickup {}

impl Hash for BlockPickup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
        self.weapon.hash(state);
    }
}

impl BlockPickup {
    pub fn cell(&self) -> Cell {
        cell_at(self.x + BLOCK_SIZE / 2.0, self.y + BLOCK_SIZE / 2.0)
    }

    /// Drops the crate straight down onto the first ground below it.
    fn project_downwards(&mut self, terrain: &Terrain) {
        let Cell { i, j: start } = self.cell();
        for j in start..BLOCKS_HEIGHT {
            if terrain.is_ground(Cell::new(i, j + 1)) {
                self.x = i_to_x_min(i);
                self.y = j_to_y_min(j);
                return;
            }
        }
    }
}

/// Grid-level snapshot used by the path planner: the terrain, one simplified
/// combatant and the weapon crates. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockWorld {
    pub terrain: Terrain,
    pub player: BlockPlayer,
    pub pickups: Vec<BlockPickup>,
    pub just_collected: bool,
}

impl BlockWorld {
    pub fn from_world(world: &World, player: PlayerId) -> Self {
        debug_assert!(!world.is_terminal(), "block world taken from a finished match");

        let combatant = world.combatant(player);
        let terrain = world.terrain.clone();
        let pickups = world
            .powerups
            .iter()
            .filter_map(|powerup| {
                let weapon = powerup.kind.weapon()?;
                let mut pickup = BlockPickup {
                    x: powerup.x,
                    y: powerup.y,
                    weapon,
                };
                if !powerup.is_resting(&terrain) {
                    pickup.project_downwards(&terrain);
                }
                Some(pickup)
            })
            .collect();

        Self {
            terrain,
            player: BlockPlayer {
                cell: cell_at(combatant.x, combatant.y),
                ammo: combatant.ammo,
                weapon: combatant.weapon,
                is_master: combatant.is_master(),
            },
            pickups,
            just_collected: false,
        }
    }

    /// Weapon of a crate sitting in `cell`, if any.
    pub fn pickup_at(&self, cell: Cell) -> Option<Weapon> {
        self.pickups
            .iter()
            .find(|pickup| pickup.cell() == cell)
            .map(|pickup| pickup.weapon)
    }

    pub fn is_legal(&self, direction: Direction) -> bool {
        let from = self.player.cell;
        let to = from.offset(direction);

        if self.terrain.is_ground(to) {
            return !self.terrain.is_immutable(to) && self.player.can_dig(direction);
        }
        direction == Direction::Down || self.terrain.is_supported(from)
    }

    pub fn legal_actions(&self) -> Vec<Direction> {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .into_iter()
        .filter(|direction| self.is_legal(*direction))
        .collect()
    }

    /// Moves the player one cell, digging through ground and collecting any
    /// crate found there.
    pub fn apply_action(&self, direction: Direction) -> BlockWorld {
        let mut next = self.clone();
        next.just_collected = false;

        let to = self.player.cell.offset(direction);
        if next.terrain.is_ground(to) {
            next.terrain.set_ground(to, false);
            if !next.player.is_master {
                next.player.ammo -= 1;
                if next.player.ammo == 0 {
                    next.player.weapon = Weapon::None;
                }
            }
        }
        next.player.cell = to;

        if let Some(index) = next.pickups.iter().position(|pickup| pickup.cell() == to) {
            let pickup = next.pickups.remove(index);
            next.player.weapon = pickup.weapon;
            if !next.player.is_master {
                next.player.ammo = pickup.weapon.reload();
            }
            next.just_collected = true;
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::hierarchical::fixtures::{arm, ground_from, world_with};
    use crate::state::terrain::FLOOR_LEVEL;
    use crate::state::{Powerup, PowerupKind};

    #[test]
    fn test_snapshots_of_same_world_are_equal() {
        let world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        let a = BlockWorld::from_world(&world, PlayerId::One);
        let b = BlockWorld::from_world(&world.clone(), PlayerId::One);
        assert_eq!(a, b);
        assert_eq!(a.player.cell, Cell::new(5, -1));
    }

    #[test]
    fn test_apply_action_is_deterministic() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        arm(&mut world, PlayerId::One, Weapon::Bombs);
        let block = BlockWorld::from_world(&world, PlayerId::One);

        let a = block.apply_action(Direction::Down);
        let b = block.apply_action(Direction::Down);
        assert_eq!(a, b);
        assert_ne!(a, block);
        assert_eq!(block.player.cell, Cell::new(5, -1));
    }

    #[test]
    fn test_digging_requires_matching_weapon() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        let unarmed = BlockWorld::from_world(&world, PlayerId::One);
        assert!(!unarmed.is_legal(Direction::Down));

        arm(&mut world, PlayerId::One, Weapon::Rockets);
        let rockets = BlockWorld::from_world(&world, PlayerId::One);
        assert!(!rockets.is_legal(Direction::Down));

        arm(&mut world, PlayerId::One, Weapon::Bombs);
        let bombs = BlockWorld::from_world(&world, PlayerId::One);
        assert!(bombs.is_legal(Direction::Down));
    }

    #[test]
    fn test_digging_spends_ammo_until_weapon_is_gone() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        arm(&mut world, PlayerId::One, Weapon::Bombs);
        let mut block = BlockWorld::from_world(&world, PlayerId::One);

        for _ in 0..3 {
            assert!(block.is_legal(Direction::Down));
            block = block.apply_action(Direction::Down);
        }

        assert_eq!(block.player.cell, Cell::new(5, 2));
        assert_eq!(block.player.ammo, 0);
        assert_eq!(block.player.weapon, Weapon::None);
        assert!(!block.is_legal(Direction::Down));
        assert!(!block.terrain.is_ground(Cell::new(5, 1)));
    }

    #[test]
    fn test_master_digs_forever() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        world.combatant_mut(PlayerId::One).set_master(true);
        arm(&mut world, PlayerId::One, Weapon::Bombs);
        let mut block = BlockWorld::from_world(&world, PlayerId::One);

        for _ in 0..6 {
            block = block.apply_action(Direction::Down);
        }
        assert_eq!(block.player.ammo, -1);
        assert_eq!(block.player.weapon, Weapon::Bombs);
    }

    #[test]
    fn test_open_air_needs_support_except_down() {
        let world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        let block = BlockWorld::from_world(&world, PlayerId::One);
        assert!(block.is_legal(Direction::Left));
        assert!(block.is_legal(Direction::Up));

        let high = block.apply_action(Direction::Up).apply_action(Direction::Up);
        assert_eq!(high.player.cell, Cell::new(5, -3));
        assert!(!high.is_legal(Direction::Left));
        assert!(!high.is_legal(Direction::Up));
        assert!(high.is_legal(Direction::Down));
    }

    #[test]
    fn test_immutable_cells_cannot_be_dug() {
        let mut world = world_with(ground_from(0), Cell::new(21, -1), Cell::new(30, -1));
        arm(&mut world, PlayerId::One, Weapon::Rockets);
        let block = BlockWorld::from_world(&world, PlayerId::One);
        assert!(!block.is_legal(Direction::Right));
        assert!(block.is_legal(Direction::Left));
    }

    #[test]
    fn test_collecting_crate_raises_flag_for_one_step() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(30, -1));
        world.spawn_powerup(Powerup::new(
            i_to_x_min(6),
            FLOOR_LEVEL - BLOCK_SIZE,
            PowerupKind::Lightning,
        ));
        let block = BlockWorld::from_world(&world, PlayerId::One);
        assert_eq!(block.pickup_at(Cell::new(6, -1)), Some(Weapon::Lightning));

        let collected = block.apply_action(Direction::Right);
        assert!(collected.just_collected);
        assert_eq!(collected.player.weapon, Weapon::Lightning);
        assert_eq!(collected.player.ammo, 1);
        assert!(collected.pickups.is_empty());

        let after = collected.apply_action(Direction::Right);
        assert!(!after.just_collected);
    }

    #[test]
    fn test_pickup_equality_agrees_with_hash() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(pickup: &BlockPickup) -> u64 {
            let mut hasher = DefaultHasher::new();
            pickup.hash(&mut hasher);
            hasher.finish()
        }

        let pickup = |x: f32| BlockPickup {
            x,
            y: 64.0,
            weapon: Weapon::Bombs,
        };

        assert_eq!(pickup(0.0), pickup(0.0));
        assert_eq!(hash_of(&pickup(0.0)), hash_of(&pickup(0.0)));
        assert_ne!(pickup(0.0), pickup(-0.0));
        assert_eq!(pickup(f32::NAN), pickup(f32::NAN));
        assert_eq!(hash_of(&pickup(f32::NAN)), hash_of(&pickup(f32::NAN)));
    }

    #[test]
    fn test_falling_crates_are_projected_onto_ground() {
        let mut world = world_with(ground_from(3), Cell::new(5, 2), Cell::new(30, 2));
        world.spawn_powerup(Powerup::new(
            i_to_x_min(10),
            FLOOR_LEVEL - 6.0 * BLOCK_SIZE,
            PowerupKind::Rockets,
        ));
        world.spawn_powerup(Powerup::new(i_to_x_min(12), 0.0, PowerupKind::Speed));

        let block = BlockWorld::from_world(&world, PlayerId::One);
        assert_eq!(block.pickups.len(), 1);
        assert_eq!(block.pickups[0].cell(), Cell::new(10, 2));
    }
}
