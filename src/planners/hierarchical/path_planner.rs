use crate::infra::{AStar, Cell, SearchProblem};
use crate::planners::hierarchical::block_world::BlockWorld;
use crate::planners::hierarchical::danger_zone::DangerZone;
use crate::planners::hierarchical::strategy::Strategy;
use crate::state::terrain::cell_center;

/// Waypoints ahead of the cursor that pull the level-1 evaluation.
pub const PATH_LOOKAHEAD: usize = 2;

/// Normalization for the summed bounded-inverse-distance conformance term.
const CONFORMANCE_NORMALIZATION: f32 = 0.6079;

/// A planned route over block worlds. The first state is the one planning
/// started from.
#[derive(Debug, Clone)]
pub struct Path {
    states: Vec<BlockWorld>,
    cost: f32,
}

impl Path {
    pub fn new(states: Vec<BlockWorld>, cost: f32) -> Self {
        debug_assert!(!states.is_empty(), "path without a start state");
        Self { states, cost }
    }

    pub fn states(&self) -> &[BlockWorld] {
        &self.states
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.states.iter().map(|state| state.player.cell).collect()
    }

    /// Moves the cursor past the next waypoint once `cell` reaches it. The
    /// cursor never moves back.
    pub fn advance_index(&self, cell: Cell, index: usize) -> usize {
        match self.states.get(index) {
            Some(state) if state.player.cell == cell => index + 1,
            _ => index,
        }
    }

    pub fn is_exhausted(&self, index: usize) -> bool {
        index >= self.states.len()
    }

    /// Whether `(x, y)` is further than `max_distance` pixels from the
    /// centre of every waypoint.
    pub fn has_strayed(&self, x: f32, y: f32, max_distance: f32) -> bool {
        let cutoff = max_distance * max_distance;
        self.states.iter().all(|state| {
            let (cx, cy) = cell_center(state.player.cell);
            (cx - x).powi(2) + (cy - y).powi(2) > cutoff
        })
    }

    /// Closeness to the waypoint a little ahead of the cursor, weighted by how
    /// far along the path it lies. Lies in `[0, 0.6079]`.
    pub fn conformance(&self, x: f32, y: f32, index: usize) -> f32 {
        let len = self.states.len();
        if index >= len {
            return 0.0;
        }

        let target = (index + PATH_LOOKAHEAD).min(len - 1);
        let (tx, ty) = cell_center(self.states[target].player.cell);
        let weight = target as f32 / len as f32;
        bounded_inverse_distance(x, y, tx, ty) * weight * CONFORMANCE_NORMALIZATION
    }
}

/// `1 / (d / 600 + 1)`: one when touching, falling towards zero with pixel
/// distance.
pub fn bounded_inverse_distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let d = ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt();
    1.0 / (d / 600.0 + 1.0)
}

struct StrategyProblem<'a> {
    strategy: &'a Strategy,
    zone: &'a DangerZone,
}

impl SearchProblem for StrategyProblem<'_> {
    type State = BlockWorld;

    fn successors(&self, state: &BlockWorld) -> Vec<BlockWorld> {
        state
            .legal_actions()
            .into_iter()
            .map(|direction| state.apply_action(direction))
            .collect()
    }

    fn step_cost(&self, state: &BlockWorld) -> f32 {
        self.strategy.step_cost(self.zone, state)
    }

    fn is_goal(&self, state: &BlockWorld) -> bool {
        self.strategy.is_goal(self.zone, state)
    }

    fn heuristic(&self, state: &BlockWorld) -> f32 {
        self.strategy.heuristic(self.zone, state)
    }
}

/// Level-2 planner: bounded A* over block worlds with the strategy's cost,
/// goal and heuristic.
pub struct PathPlanner {
    search: AStar,
}

impl PathPlanner {
    pub fn new(max_expansions: usize) -> Self {
        Self {
            search: AStar::new(max_expansions),
        }
    }

    /// `None` when the strategy has no danger zone yet, or when no goal was
    /// reached within the expansion bound.
    #[tracing::instrument(level = "trace", skip(self, start, strategy), fields(strategy = %strategy.kind()))]
    pub fn plan(&self, start: BlockWorld, strategy: &Strategy) -> Option<Path> {
        let zone = strategy.danger_zone()?;
        let problem = StrategyProblem { strategy, zone };

        let (states, cost) = self.search.find_path(&problem, start)?;
        tracing::trace!(steps = states.len() - 1, cost, "path found");
        Some(Path::new(states, cost))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::infra::PlayerId;
    use crate::planners::hierarchical::danger_zone::Belief;
    use crate::planners::hierarchical::fixtures::{arm, ground_from, world_with};
    use crate::planners::hierarchical::strategy::StrategyKind;
    use crate::state::{Weapon, World};

    fn harmless_zone(world: &World, source: Cell) -> DangerZone {
        DangerZone::from_beliefs(
            source,
            BTreeMap::from([(source, Belief::new(1.0, 0, Weapon::None))]),
            &world.terrain,
        )
    }

    fn strategy_for(kind: StrategyKind, zone: DangerZone) -> Strategy {
        let mut strategy = Strategy::new(kind, PlayerId::One);
        strategy.set_danger_zone(zone);
        strategy
    }

    #[test]
    fn test_one_step_goal_costs_one() {
        let mut terrain = ground_from(0);
        for j in 0..4 {
            terrain.set_ground(Cell::new(5, j), false);
        }
        let mut world = world_with(terrain, Cell::new(5, 3), Cell::new(40, -1));
        arm(&mut world, PlayerId::One, Weapon::Bombs);

        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = strategy_for(StrategyKind::DigDown, harmless_zone(&world, Cell::new(40, -1)));
        let path = PathPlanner::new(200)
            .plan(start.clone(), &strategy)
            .expect("dig down one block");

        assert_eq!(path.len(), 2);
        assert_eq!(path.states()[0], start);
        assert_eq!(path.cells(), vec![Cell::new(5, 3), Cell::new(5, 4)]);
        assert!((path.cost() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cost_equals_steps_without_danger() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(40, -1));
        world.combatant_mut(PlayerId::One).set_master(true);
        arm(&mut world, PlayerId::One, Weapon::Bombs);

        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = strategy_for(StrategyKind::DigDown, harmless_zone(&world, Cell::new(40, -1)));
        let path = PathPlanner::new(200).plan(start, &strategy).expect("dig down");

        assert_eq!(path.len(), 6);
        assert!((path.cost() - 5.0).abs() < 1e-6);
        assert_eq!(path.cells().last(), Some(&Cell::new(5, 4)));
    }

    #[test]
    fn test_expansion_bound_yields_no_path() {
        let mut world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(40, -1));
        world.combatant_mut(PlayerId::One).set_master(true);
        arm(&mut world, PlayerId::One, Weapon::Bombs);

        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = strategy_for(StrategyKind::DigDown, harmless_zone(&world, Cell::new(40, -1)));
        assert!(PathPlanner::new(0).plan(start, &strategy).is_none());
    }

    #[test]
    fn test_no_danger_zone_means_no_plan() {
        let world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(40, -1));
        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = Strategy::new(StrategyKind::Attack, PlayerId::One);
        assert!(PathPlanner::new(200).plan(start, &strategy).is_none());
    }

    #[test]
    fn test_attack_walks_to_opponent_cell() {
        let world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(9, -1));
        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = strategy_for(StrategyKind::Attack, harmless_zone(&world, Cell::new(9, -1)));
        let path = PathPlanner::new(200).plan(start, &strategy).expect("walk over");

        assert_eq!(path.cells().last(), Some(&Cell::new(9, -1)));
        assert!((path.cost() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_cursor_only_moves_forward() {
        let world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(8, -1));
        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = strategy_for(StrategyKind::Attack, harmless_zone(&world, Cell::new(8, -1)));
        let path = PathPlanner::new(200).plan(start, &strategy).expect("walk over");

        assert_eq!(path.advance_index(Cell::new(5, -1), 0), 1);
        assert_eq!(path.advance_index(Cell::new(5, -1), 1), 1);
        assert_eq!(path.advance_index(Cell::new(6, -1), 1), 2);
        assert!(!path.is_exhausted(3));
        assert!(path.is_exhausted(4));
    }

    #[test]
    fn test_conformance_is_bounded() {
        let world = world_with(ground_from(0), Cell::new(5, -1), Cell::new(9, -1));
        let start = BlockWorld::from_world(&world, PlayerId::One);
        let strategy = strategy_for(StrategyKind::Attack, harmless_zone(&world, Cell::new(9, -1)));
        let path = PathPlanner::new(200).plan(start, &strategy).expect("walk over");

        let (x, y) = cell_center(Cell::new(9, -1));
        for index in 0..path.len() + 2 {
            let value = path.conformance(x, y, index);
            assert!((0.0..=CONFORMANCE_NORMALIZATION).contains(&value));
        }
        assert_eq!(path.conformance(x, y, path.len()), 0.0);
        assert!(!path.has_strayed(x, y, 96.0));
        assert!(path.has_strayed(x + 1000.0, y, 96.0));
    }
}
