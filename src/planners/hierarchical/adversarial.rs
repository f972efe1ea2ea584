use crate::infra::PlayerId;
use crate::planners::hierarchical::strategy::Strategy;
use crate::state::{Action, Actions, World};

/// Level-1 choice: the action for this tick and the one to repeat until the
/// next search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub filler: Action,
    pub value: f32,
}

/// Movement repeats itself; jumping and firing keep whatever was being
/// repeated before, so a jump or shot is never held down.
pub fn filler_for(action: Action, previous: Action) -> Action {
    if action.is_movement() { action } else { previous }
}

/// Depth-limited minimax with alpha-beta pruning over the full simulation.
/// Each ply advances only the mover, for one decision tick plus filler ticks.
pub struct AdversarialSearch {
    player: PlayerId,
    step_size: u32,
    max_depth: u32,
}

impl AdversarialSearch {
    pub fn new(player: PlayerId, step_size: u32, max_depth: u32) -> Self {
        Self {
            player,
            step_size: step_size.max(1),
            max_depth,
        }
    }

    #[tracing::instrument(level = "trace", skip(self, world, strategy), fields(player = ?self.player, strategy = %strategy.kind()))]
    pub fn compute_best_action(
        &self,
        world: &World,
        strategy: &Strategy,
        previous_filler: Action,
        path_index: usize,
    ) -> Decision {
        let actions = world.legal_actions(self.player);
        debug_assert!(!actions.is_empty(), "live combatant without legal actions");

        let mut best = Decision {
            action: Action::Idle,
            filler: filler_for(Action::Idle, previous_filler),
            value: f32::NEG_INFINITY,
        };
        let mut alpha = f32::NEG_INFINITY;

        for action in actions {
            let filler = filler_for(action, previous_filler);
            let mut next = world.clone();
            self.play(&mut next, self.player, action, filler);

            let ply = Ply {
                depth: 1,
                own_filler: filler,
                opponent_filler: Action::Idle,
            };
            let value = self.minimize(&next, ply, alpha, f32::INFINITY, strategy, path_index);
            tracing::trace!(%action, value, "root action scored");

            if value > best.value {
                best = Decision {
                    action,
                    filler,
                    value,
                };
            }
            alpha = alpha.max(best.value);
        }

        best
    }

    fn maximize(
        &self,
        world: &World,
        ply: Ply,
        mut alpha: f32,
        beta: f32,
        strategy: &Strategy,
        path_index: usize,
    ) -> f32 {
        if let Some(value) = self.cutoff(world, ply, strategy, path_index) {
            return value;
        }

        let mut value = f32::NEG_INFINITY;
        for action in self.moves(world, self.player) {
            let filler = filler_for(action, ply.own_filler);
            let mut next = world.clone();
            self.play(&mut next, self.player, action, filler);

            let child = Ply {
                depth: ply.depth + 1,
                own_filler: filler,
                ..ply
            };
            value = value.max(self.minimize(&next, child, alpha, beta, strategy, path_index));
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }
        value
    }

    fn minimize(
        &self,
        world: &World,
        ply: Ply,
        alpha: f32,
        mut beta: f32,
        strategy: &Strategy,
        path_index: usize,
    ) -> f32 {
        if let Some(value) = self.cutoff(world, ply, strategy, path_index) {
            return value;
        }

        let opponent = self.player.opponent();
        let mut value = f32::INFINITY;
        for action in self.moves(world, opponent) {
            let filler = filler_for(action, ply.opponent_filler);
            let mut next = world.clone();
            self.play(&mut next, opponent, action, filler);

            let child = Ply {
                depth: ply.depth + 1,
                opponent_filler: filler,
                ..ply
            };
            value = value.min(self.maximize(&next, child, alpha, beta, strategy, path_index));
            beta = beta.min(value);
            if alpha >= beta {
                break;
            }
        }
        value
    }

    /// Terminal states score ±1 for the searching player; the depth limit
    /// falls back to the strategy's evaluation.
    fn cutoff(&self, world: &World, ply: Ply, strategy: &Strategy, path_index: usize) -> Option<f32> {
        if world.is_terminal() {
            return Some(self.player.perspective(world.terminal_utility()));
        }
        if ply.depth >= self.max_depth {
            return Some(strategy.evaluate(world, path_index));
        }
        None
    }

    fn moves(&self, world: &World, mover: PlayerId) -> Vec<Action> {
        let actions = world.legal_actions(mover);
        debug_assert!(!actions.is_empty(), "live combatant without legal actions");
        if actions.is_empty() {
            return vec![Action::Idle];
        }
        actions
    }

    fn play(&self, world: &mut World, mover: PlayerId, action: Action, filler: Action) {
        world.advance(Actions::only(mover, action));
        for _ in 1..self.step_size {
            if world.is_terminal() {
                break;
            }
            world.advance(Actions::only(mover, filler));
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Ply {
    depth: u32,
    own_filler: Action,
    opponent_filler: Action,
}
