pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use infra::{AStar, Cell, Direction, PlayerId};
pub use planners::hierarchical::{AIAgent, QLearner, StrategyKind};
pub use state::World;
