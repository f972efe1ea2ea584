use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::infra::{GameObserver, PlayerId};
use crate::planners::hierarchical::agent::AIAgent;
use crate::planners::hierarchical::config::{AgentConfig, GameConfig};
use crate::planners::hierarchical::metrics::MatchMetrics;
use crate::planners::hierarchical::qlearning::QLearner;
use crate::state::{Actions, MatchContext, World};

const METRICS_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub winner: Option<PlayerId>,
    pub ticks: u32,
    pub health_margin: f32,
}

/// Self-play: both combatants are agents sharing one learner.
pub struct Game {
    config: GameConfig,
    agent_config: AgentConfig,
    learner: Rc<RefCell<QLearner>>,
    observer: Box<dyn GameObserver>,
    rng: StdRng,
    pub metrics: MatchMetrics,
}

impl Game {
    pub fn new(
        config: GameConfig,
        agent_config: AgentConfig,
        learner: Rc<RefCell<QLearner>>,
        observer: impl GameObserver + 'static,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            agent_config,
            learner,
            observer: Box::new(observer),
            rng,
            metrics: MatchMetrics::new(METRICS_WINDOW),
        }
    }

    pub fn run(&mut self) -> &MatchMetrics {
        for match_index in 0..self.config.matches {
            self.play_match(match_index);
            self.metrics.log_to_console();
        }
        &self.metrics
    }

    pub fn play_match(&mut self, match_index: u32) -> MatchResult {
        let master = if self.rng.random_bool(0.5) {
            PlayerId::One
        } else {
            PlayerId::Two
        };
        let mut context = MatchContext::new(Some(master), self.config.spawn_interval, self.config.max_powerups);
        let mut world = World::generate(&mut self.rng, &context);

        let mut agents = [PlayerId::One, PlayerId::Two].map(|player| {
            let mut agent = AIAgent::new(player, self.agent_config.clone(), Rc::clone(&self.learner));
            agent.set_learning(self.config.learning);
            agent
        });

        self.observer.on_match_start(match_index, &world);

        while !world.is_terminal() && world.tick < self.config.max_ticks {
            let [one, two] = &mut agents;
            let actions = Actions::both(self.act(one, &world), self.act(two, &world));
            world.advance(actions);
            context.tick(&mut world, &mut self.rng);
        }

        for agent in &mut agents {
            agent.finish_match(&world);
        }

        let winner = if !world.is_terminal() {
            None
        } else if world.terminal_utility() > 0.0 {
            Some(PlayerId::One)
        } else if world.terminal_utility() < 0.0 {
            Some(PlayerId::Two)
        } else {
            None
        };
        let health_margin = world.combatant(PlayerId::One).health - world.combatant(PlayerId::Two).health;

        self.metrics
            .record_match(winner, world.tick, health_margin, self.learner.borrow().len());
        self.observer
            .on_match_finished(match_index, winner, world.tick, &world);

        MatchResult {
            winner,
            ticks: world.tick,
            health_margin,
        }
    }

    fn act(&mut self, agent: &mut AIAgent, world: &World) -> crate::state::Action {
        let action = agent.compute_action(world);
        let player = agent.player();

        if agent.last_replan().is_some() {
            self.observer
                .on_strategy_selected(player, &agent.strategy_kind().to_string(), world);
            self.observer
                .on_path_planned(player, agent.path_cells().as_deref());
        }
        self.observer.on_action_selected(player, action, world);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Cell;
    use crate::planners::hierarchical::config::LearnerConfig;
    use crate::state::Action;

    #[derive(Default)]
    struct Counts {
        started: u32,
        strategies: u32,
        paths: u32,
        actions: u32,
        finished: Vec<(u32, u32)>,
    }

    struct RecordingObserver(Rc<RefCell<Counts>>);

    impl GameObserver for RecordingObserver {
        fn on_match_start(&mut self, _match_index: u32, _world: &World) {
            self.0.borrow_mut().started += 1;
        }

        fn on_strategy_selected(&mut self, _player: PlayerId, _strategy_name: &str, _world: &World) {
            self.0.borrow_mut().strategies += 1;
        }

        fn on_path_planned(&mut self, _player: PlayerId, _path: Option<&[Cell]>) {
            self.0.borrow_mut().paths += 1;
        }

        fn on_action_selected(&mut self, _player: PlayerId, _action: Action, _world: &World) {
            self.0.borrow_mut().actions += 1;
        }

        fn on_match_finished(&mut self, match_index: u32, _winner: Option<PlayerId>, final_tick: u32, _world: &World) {
            self.0.borrow_mut().finished.push((match_index, final_tick));
        }
    }

    fn quick_game(counts: Rc<RefCell<Counts>>, learning: bool) -> (Game, Rc<RefCell<QLearner>>) {
        let learner = Rc::new(RefCell::new(QLearner::new(LearnerConfig {
            seed: Some(9),
            ..LearnerConfig::default()
        })));
        let config = GameConfig {
            matches: 2,
            max_ticks: 24,
            seed: Some(42),
            learning,
            ..GameConfig::default()
        };
        let agent_config = AgentConfig {
            search_depth: 1,
            max_expansions: 60,
            ..AgentConfig::default()
        };
        let game = Game::new(config, agent_config, Rc::clone(&learner), RecordingObserver(counts));
        (game, learner)
    }

    #[test]
    fn test_matches_are_capped_and_reported() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let (mut game, learner) = quick_game(Rc::clone(&counts), true);

        let metrics = game.run();
        assert_eq!(metrics.matches(), 2);

        let counts = counts.borrow();
        assert_eq!(counts.started, 2);
        assert_eq!(counts.finished.len(), 2);
        assert!(counts.finished.iter().all(|&(_, tick)| tick <= 24));
        assert!(counts.strategies >= 4);
        assert_eq!(counts.strategies, counts.paths);

        let ticks: u32 = counts.finished.iter().map(|&(_, tick)| tick).sum();
        assert_eq!(counts.actions, 2 * ticks);
        assert!(!learner.borrow().is_empty());
    }

    #[test]
    fn test_frozen_learner_is_untouched() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let (mut game, learner) = quick_game(counts, false);

        let result = game.play_match(0);
        assert!(result.ticks <= 24);
        assert!(learner.borrow().is_empty());
    }
}
