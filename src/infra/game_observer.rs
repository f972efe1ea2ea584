use crate::infra::{Cell, PlayerId};
use crate::state::{Action, World};

/// Trait for observing self-play events
pub trait GameObserver {
    /// Called when a match starts
    fn on_match_start(&mut self, match_index: u32, world: &World);

    /// Called when an agent switches (or re-selects) its strategy
    fn on_strategy_selected(&mut self, player: PlayerId, strategy_name: &str, world: &World);

    /// Called after block-level planning, `None` when no path was found
    fn on_path_planned(&mut self, _player: PlayerId, _path: Option<&[Cell]>) {
        // Default implementation does nothing
    }

    /// Called when an action is selected
    fn on_action_selected(&mut self, _player: PlayerId, _action: Action, _world: &World) {
        // Default implementation does nothing
    }

    /// Called when the match finishes
    fn on_match_finished(
        &mut self,
        match_index: u32,
        winner: Option<PlayerId>,
        final_tick: u32,
        world: &World,
    );
}
