use crate::state::{DEFAULT_MAX_POWERUPS, DEFAULT_SPAWN_INTERVAL};

/// Tuning for one agent's decision loop.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Ticks each level-1 decision is committed for.
    pub step_size: u32,
    /// Plies searched by the adversarial search (own and opponent moves).
    pub search_depth: u32,
    /// Node expansions allowed to the block-level planner.
    pub max_expansions: usize,
    /// Opponent displacement (in cells) that invalidates the danger field.
    pub danger_recalc_distance: i32,
    /// Distance in pixels from every waypoint that counts as leaving the path.
    pub path_deviation_distance: f32,
    /// Ticks before a strategy is re-evaluated regardless of progress.
    pub bored_time: u32,
    /// Ticks before retrying after the planner found no path.
    pub no_path_retry_time: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            step_size: 4,
            search_depth: 4,
            max_expansions: 200,
            danger_recalc_distance: 5,
            path_deviation_distance: 96.0,
            bored_time: 1200,
            no_path_retry_time: 30,
        }
    }
}

/// Tabular learner hyperparameters.
#[derive(Debug, Clone)]
pub struct LearnerConfig {
    pub alpha: f32,
    pub epsilon: f32,
    pub discount: f32,
    /// Bonus (or penalty) for the tick a match is decided.
    pub winning_reward: f32,
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            epsilon: 0.3,
            discount: 0.95,
            winning_reward: 50.0,
            seed: None,
        }
    }
}

/// Self-play runner settings.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub matches: u32,
    pub max_ticks: u32,
    pub spawn_interval: u32,
    pub max_powerups: usize,
    pub seed: Option<u64>,
    pub learning: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            matches: 10,
            max_ticks: 60 * 60 * 3,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            max_powerups: DEFAULT_MAX_POWERUPS,
            seed: None,
            learning: true,
        }
    }
}
