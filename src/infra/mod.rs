mod default_observer;
mod game_observer;
mod pathfinding;
mod types;

pub use default_observer::DefaultObserver;
pub use game_observer::GameObserver;
pub use pathfinding::{AStar, SearchProblem};
pub use types::{Cell, Direction, PlayerId};
