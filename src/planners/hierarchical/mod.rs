mod adversarial;
mod agent;
mod block_world;
mod config;
mod danger_zone;
mod game;
mod match_summary;
mod metrics;
mod path_planner;
mod qlearning;
mod strategy;

#[cfg(test)]
mod fixtures;

pub use adversarial::{AdversarialSearch, Decision, filler_for};
pub use agent::{AIAgent, ReplanReason};
pub use block_world::{BlockPickup, BlockPlayer, BlockWorld};
pub use config::{AgentConfig, GameConfig, LearnerConfig};
pub use danger_zone::{Belief, DISTRIBUTION_STEPS, DangerZone};
pub use game::{Game, MatchResult};
pub use match_summary::{MatchObservation, MatchSummary, SummaryParseError, XCloseness, YCloseness};
pub use metrics::{MatchMetrics, MovingAverage};
pub use path_planner::{PATH_LOOKAHEAD, Path, PathPlanner, bounded_inverse_distance};
pub use qlearning::{QLearner, QTable, TableError, recommended_strategy};
pub use strategy::{DANGER_COST_WEIGHT, RUN_AWAY_DISTANCE, Strategy, StrategyKind, StrategyWeights};
