use tracing::{debug, info, trace};

use crate::infra::{Cell, GameObserver, PlayerId};
use crate::state::{Action, World};

pub struct DefaultObserver;

impl GameObserver for DefaultObserver {
    fn on_match_start(&mut self, match_index: u32, world: &World) {
        info!("Match {} started", match_index);
        for (index, combatant) in world.combatants.iter().enumerate() {
            info!(
                "- player {}: pos ({:.0}, {:.0}), master: {}",
                index + 1,
                combatant.x,
                combatant.y,
                combatant.is_master()
            );
        }
        info!("- crates: {}", world.powerups.len());
    }

    fn on_strategy_selected(&mut self, player: PlayerId, strategy_name: &str, world: &World) {
        let combatant = world.combatant(player);
        debug!(
            tick = world.tick,
            %player,
            health = combatant.health,
            ammo = combatant.ammo,
            weapon = %combatant.weapon,
            "Selected strategy: {}",
            strategy_name
        );
    }

    fn on_path_planned(&mut self, player: PlayerId, path: Option<&[Cell]>) {
        match path {
            Some(cells) => debug!(
                %player,
                len = cells.len(),
                goal = ?cells.last(),
                "Path planned"
            ),
            None => debug!(%player, "No path found"),
        }
    }

    fn on_action_selected(&mut self, player: PlayerId, action: Action, world: &World) {
        trace!(tick = world.tick, %player, "action: {}", action);
    }

    fn on_match_finished(
        &mut self,
        match_index: u32,
        winner: Option<PlayerId>,
        final_tick: u32,
        world: &World,
    ) {
        match winner {
            Some(player) => info!("Match {} won by player {}", match_index, player),
            None => info!("Match {} ended without a winner", match_index),
        }
        info!(
            "Final tick: {}, health: {:.1} / {:.1}",
            final_tick, world.combatants[0].health, world.combatants[1].health
        );
    }
}
