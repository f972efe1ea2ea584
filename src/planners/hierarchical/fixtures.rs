//! Shared world builders for planner tests.

use crate::infra::{Cell, PlayerId};
use crate::state::terrain::{BLOCKS_WIDTH, cell_center};
use crate::state::{MatchContext, Terrain, Weapon, World};

/// Solid ground from row `top` down, open sky above.
pub fn ground_from(top: i32) -> Terrain {
    let mut terrain = Terrain::filled();
    for i in 0..BLOCKS_WIDTH {
        for j in 0..top {
            terrain.set_ground(Cell::new(i, j), false);
        }
    }
    terrain
}

/// A world with no crates, no master, and both combatants centred on the
/// given cells.
pub fn world_with(terrain: Terrain, one: Cell, two: Cell) -> World {
    let mut world = World::new(terrain, &MatchContext::new(None, 60, 0));
    world.powerups.clear();
    for (player, cell) in [(PlayerId::One, one), (PlayerId::Two, two)] {
        let (x, y) = cell_center(cell);
        let combatant = world.combatant_mut(player);
        combatant.x = x;
        combatant.y = y;
    }
    world
}

pub fn arm(world: &mut World, player: PlayerId, weapon: Weapon) {
    world.combatant_mut(player).equip(weapon);
}
