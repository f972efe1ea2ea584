use strum::{Display, EnumIter, EnumString};

use crate::infra::{Cell, PlayerId};
use crate::planners::hierarchical::block_world::BlockWorld;
use crate::planners::hierarchical::danger_zone::DangerZone;
use crate::planners::hierarchical::path_planner::{Path, bounded_inverse_distance};
use crate::state::terrain::{FLOOR_LEVEL_J, WALL_DEPTH_J};
use crate::state::{MAX_HEALTH, Terrain, World};

/// Extra path cost per unit of danger.
pub const DANGER_COST_WEIGHT: f32 = 100.0;

/// Manhattan distance from the threat that counts as escaped.
pub const RUN_AWAY_DISTANCE: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter)]
pub enum StrategyKind {
    Attack,
    RunAway,
    GetAmmo,
    DigDown,
}

/// Level-1 evaluation weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyWeights {
    pub health: f32,
    pub ammo: f32,
    pub confrontation: f32,
    /// Pull towards the level-2 path.
    pub superlevel: f32,
}

impl StrategyKind {
    pub fn weights(self) -> StrategyWeights {
        let (confrontation, superlevel) = match self {
            StrategyKind::Attack => (0.005, 0.02),
            StrategyKind::RunAway => (-0.005, 0.02),
            StrategyKind::GetAmmo => (0.0, 0.02),
            StrategyKind::DigDown => (0.0, 0.05),
        };
        StrategyWeights {
            health: 0.25,
            ammo: 0.1,
            confrontation,
            superlevel,
        }
    }
}

/// A named policy for one combatant, plus the path and danger zone the
/// orchestrator last computed for it.
#[derive(Debug, Clone)]
pub struct Strategy {
    kind: StrategyKind,
    owner: PlayerId,
    path: Option<Path>,
    danger_zone: Option<DangerZone>,
}

impl Strategy {
    pub fn new(kind: StrategyKind, owner: PlayerId) -> Self {
        Self {
            kind,
            owner,
            path: None,
            danger_zone: None,
        }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn set_path(&mut self, path: Option<Path>) {
        self.path = path;
    }

    pub fn danger_zone(&self) -> Option<&DangerZone> {
        self.danger_zone.as_ref()
    }

    pub fn set_danger_zone(&mut self, zone: DangerZone) {
        self.danger_zone = Some(zone);
    }

    /// Level-1 evaluation from the owner's point of view.
    pub fn evaluate(&self, world: &World, path_index: usize) -> f32 {
        let own = world.combatant(self.owner);
        let opponent = world.combatant(self.owner.opponent());
        let weights = self.kind.weights();

        let health = (own.health - opponent.health) / (2.0 * MAX_HEALTH);
        let ammo = if own.is_master() || opponent.is_master() {
            0.0
        } else {
            (own.ammo - opponent.ammo) as f32 / 3.0
        };
        let confrontation = bounded_inverse_distance(own.x, own.y, opponent.x, opponent.y);
        let conformance = self
            .path
            .as_ref()
            .map_or(0.0, |path| path.conformance(own.x, own.y, path_index));

        weights.health * health
            + weights.ammo * ammo
            + weights.confrontation * confrontation
            + weights.superlevel * conformance
    }

    pub fn step_cost(&self, zone: &DangerZone, state: &BlockWorld) -> f32 {
        1.0 + DANGER_COST_WEIGHT * zone.check_danger(state.player.cell)
    }

    pub fn is_goal(&self, zone: &DangerZone, state: &BlockWorld) -> bool {
        let cell = state.player.cell;
        match self.kind {
            StrategyKind::Attack => cell == zone.source(),
            StrategyKind::RunAway => {
                cell.distance(&zone.source()) > RUN_AWAY_DISTANCE
                    && !ground_above(&state.terrain, cell)
                    && zone.check_danger(cell) == 0.0
            }
            StrategyKind::GetAmmo => state.just_collected,
            StrategyKind::DigDown => cell.j >= WALL_DEPTH_J,
        }
    }

    pub fn heuristic(&self, zone: &DangerZone, state: &BlockWorld) -> f32 {
        let cell = state.player.cell;
        let estimate = match self.kind {
            StrategyKind::Attack => cell.distance(&zone.source()),
            StrategyKind::RunAway => RUN_AWAY_DISTANCE - cell.distance(&zone.source()),
            StrategyKind::GetAmmo if state.just_collected => 0,
            StrategyKind::GetAmmo => state
                .pickups
                .iter()
                .map(|pickup| pickup.cell().distance(&cell))
                .min()
                .unwrap_or(0),
            StrategyKind::DigDown => WALL_DEPTH_J - cell.j,
        };
        estimate.max(0) as f32
    }
}

/// Any ground in the column strictly above `cell`, sky included.
fn ground_above(terrain: &Terrain, cell: Cell) -> bool {
    (-FLOOR_LEVEL_J..cell.j).any(|j| terrain.is_ground(Cell::new(cell.i, j)))
}
