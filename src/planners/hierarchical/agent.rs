use std::cell::RefCell;
use std::rc::Rc;

use strum::Display;

use crate::infra::{Cell, PlayerId};
use crate::planners::hierarchical::adversarial::AdversarialSearch;
use crate::planners::hierarchical::block_world::BlockWorld;
use crate::planners::hierarchical::config::AgentConfig;
use crate::planners::hierarchical::danger_zone::DangerZone;
use crate::planners::hierarchical::match_summary::MatchObservation;
use crate::planners::hierarchical::path_planner::PathPlanner;
use crate::planners::hierarchical::qlearning::QLearner;
use crate::planners::hierarchical::strategy::{Strategy, StrategyKind};
use crate::state::terrain::cell_at;
use crate::state::{Action, World};

/// Why the upper two levels were recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReplanReason {
    FirstTick,
    SummaryChanged,
    PathExhausted,
    ThreatMoved,
    OffPath,
    Bored,
    RetryAfterNoPath,
}

/// Drives one combatant: level 3 picks a strategy, level 2 plans a block
/// path for it, level 1 picks the action for this tick.
pub struct AIAgent {
    player: PlayerId,
    config: AgentConfig,
    learner: Rc<RefCell<QLearner>>,
    learning: bool,
    search: AdversarialSearch,
    planner: PathPlanner,
    strategy: Strategy,
    filler: Action,
    decision_timer: u32,
    strategy_timer: u32,
    no_path_timer: Option<u32>,
    path_index: usize,
    previous: Option<MatchObservation>,
    last_replan: Option<ReplanReason>,
}

impl AIAgent {
    pub fn new(player: PlayerId, config: AgentConfig, learner: Rc<RefCell<QLearner>>) -> Self {
        Self {
            player,
            search: AdversarialSearch::new(player, config.step_size, config.search_depth),
            planner: PathPlanner::new(config.max_expansions),
            strategy: Strategy::new(StrategyKind::GetAmmo, player),
            filler: Action::Idle,
            decision_timer: 0,
            strategy_timer: config.bored_time,
            no_path_timer: None,
            path_index: 0,
            previous: None,
            last_replan: None,
            learning: true,
            config,
            learner,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn set_learning(&mut self, learning: bool) {
        self.learning = learning;
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn path_cells(&self) -> Option<Vec<Cell>> {
        self.strategy.path().map(|path| path.cells())
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Set when the last `compute_action` recomputed levels 2 and 3.
    pub fn last_replan(&self) -> Option<ReplanReason> {
        self.last_replan
    }

    /// One action for the current tick. Terminal worlds get `Idle`; the
    /// caller should hand them to [`AIAgent::finish_match`] instead.
    pub fn compute_action(&mut self, world: &World) -> Action {
        if world.is_terminal() {
            return Action::Idle;
        }

        self.tick_timers();

        let observation = MatchObservation::from_world(world, self.player);
        self.last_replan = self.replan_reason(world, &observation);
        if let Some(reason) = self.last_replan {
            self.replan(world, observation, reason);
        }

        let action = if self.decision_timer == 0 {
            let decision = self.search.compute_best_action(world, &self.strategy, self.filler, self.path_index);
            self.filler = decision.filler;
            self.decision_timer = self.config.step_size;
            decision.action
        } else {
            self.filler
        };
        self.decision_timer = self.decision_timer.saturating_sub(1);

        if let Some(path) = self.strategy.path() {
            let combatant = world.combatant(self.player);
            self.path_index = path.advance_index(cell_at(combatant.x, combatant.y), self.path_index);
        }

        action
    }

    /// Final learning update once the match is decided (or abandoned).
    pub fn finish_match(&mut self, world: &World) {
        let observation = MatchObservation::from_world(world, self.player);
        if self.learning
            && let Some(previous) = self.previous.take()
        {
            let mut learner = self.learner.borrow_mut();
            let reward = learner.reward(&previous, &observation);
            learner.update(&previous.summary, self.strategy.kind(), reward, &observation.summary);
            tracing::debug!(player = %self.player, reward, won = ?observation.won, "final q update");
        }
        self.previous = None;
    }

    fn tick_timers(&mut self) {
        self.strategy_timer = self.strategy_timer.saturating_sub(1);
        if let Some(timer) = self.no_path_timer.as_mut() {
            *timer = timer.saturating_sub(1);
        }
    }

    fn replan_reason(&self, world: &World, observation: &MatchObservation) -> Option<ReplanReason> {
        let Some(previous) = self.previous.as_ref() else {
            return Some(ReplanReason::FirstTick);
        };
        if previous.summary != observation.summary {
            return Some(ReplanReason::SummaryChanged);
        }

        let own = world.combatant(self.player);
        let threat = world.combatant(self.player.opponent());
        if let Some(zone) = self.strategy.danger_zone()
            && cell_at(threat.x, threat.y).distance(&zone.source()) > self.config.danger_recalc_distance
        {
            return Some(ReplanReason::ThreatMoved);
        }

        if let Some(path) = self.strategy.path() {
            if path.is_exhausted(self.path_index) {
                return Some(ReplanReason::PathExhausted);
            }
            if path.has_strayed(own.x, own.y, self.config.path_deviation_distance) {
                return Some(ReplanReason::OffPath);
            }
        }

        if self.no_path_timer == Some(0) {
            return Some(ReplanReason::RetryAfterNoPath);
        }
        if self.strategy_timer == 0 {
            return Some(ReplanReason::Bored);
        }
        None
    }

    #[tracing::instrument(level = "trace", skip(self, world, observation), fields(player = %self.player))]
    fn replan(&mut self, world: &World, observation: MatchObservation, reason: ReplanReason) {
        let kind = {
            let mut learner = self.learner.borrow_mut();
            if self.learning
                && let Some(previous) = self.previous.as_ref()
            {
                let reward = learner.reward(previous, &observation);
                learner.update(&previous.summary, self.strategy.kind(), reward, &observation.summary);
            }

            if self.learning {
                learner.select_strategy(&observation.summary)
            } else {
                learner.best_strategy(&observation.summary)
            }
        };

        let block_world = BlockWorld::from_world(world, self.player);
        let zone = DangerZone::new(world, self.player.opponent(), &block_world);

        self.strategy = Strategy::new(kind, self.player);
        self.strategy.set_danger_zone(zone);
        let path = self.planner.plan(block_world, &self.strategy);

        self.no_path_timer = match path {
            Some(_) => None,
            None => Some(self.config.no_path_retry_time),
        };
        tracing::debug!(
            player = %self.player,
            %reason,
            strategy = %kind,
            summary = %observation.summary,
            path_len = path.as_ref().map(|p| p.len()),
            "replanned"
        );

        self.strategy.set_path(path);
        self.path_index = 0;
        self.strategy_timer = self.config.bored_time;
        self.previous = Some(observation);
    }
}
