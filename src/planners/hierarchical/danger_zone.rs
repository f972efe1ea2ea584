use std::collections::{BTreeMap, BTreeSet};

use crate::infra::{Cell, Direction, PlayerId};
use crate::planners::hierarchical::block_world::BlockWorld;
use crate::state::terrain::{BLOCKS_HEIGHT, BLOCKS_WIDTH, FLOOR_LEVEL_J, cell_at};
use crate::state::{Terrain, Weapon, World};

/// Steps of opponent movement simulated before projecting trajectories.
pub const DISTRIBUTION_STEPS: usize = 5;

pub const LIGHTNING_DANGER_WEIGHT: f32 = 1.5;
pub const ROCKETS_DANGER_WEIGHT: f32 = 1.0;
pub const BOMBS_DANGER_WEIGHT: f32 = 1.0;
pub const MINIONS_DANGER_WEIGHT: f32 = 1.0;

/// Trajectory branches below this probability are dropped.
const TRAJECTORY_EPSILON: f32 = 0.01;
/// Beliefs below this probability are pruned after each step.
const BELIEF_EPSILON: f32 = 0.001;

const FIELD_HEIGHT: i32 = FLOOR_LEVEL_J + BLOCKS_HEIGHT;

/// A hypothesis about where the opponent is and what it could fire.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    pub probability: f32,
    /// Upper bound on remaining shots, `-1` for unlimited.
    pub ammo: i32,
    pub weapons: BTreeSet<Weapon>,
}

impl Belief {
    pub fn new(probability: f32, ammo: i32, weapon: Weapon) -> Self {
        Self {
            probability,
            ammo,
            weapons: BTreeSet::from([weapon]),
        }
    }

    fn merge(&mut self, other: Belief) {
        self.probability += other.probability;
        self.ammo = max_ammo(self.ammo, other.ammo);
        self.weapons.extend(other.weapons);
    }
}

fn max_ammo(a: i32, b: i32) -> i32 {
    if a < 0 || b < 0 { -1 } else { a.max(b) }
}

/// Per-cell expected harm from the opponent, built once and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct DangerZone {
    source: Cell,
    field: Vec<f32>,
    beliefs: BTreeMap<Cell, Belief>,
}

impl DangerZone {
    /// Spreads a belief about `threat` over the grid for a few steps, then
    /// projects every weapon it might hold.
    #[tracing::instrument(level = "trace", skip(world, block_world))]
    pub fn new(world: &World, threat: PlayerId, block_world: &BlockWorld) -> Self {
        let combatant = world.combatant(threat);
        let source = cell_at(combatant.x, combatant.y);

        let mut beliefs = BTreeMap::from([(
            source,
            Belief::new(1.0, combatant.ammo, combatant.weapon),
        )]);
        for _ in 0..DISTRIBUTION_STEPS {
            beliefs = Self::propagate(&beliefs, block_world);
        }

        let zone = Self::from_beliefs(source, beliefs, &block_world.terrain);
        tracing::trace!(
            ?source,
            beliefs = zone.beliefs.len(),
            total = zone.field.iter().sum::<f32>(),
            "danger zone built"
        );
        zone
    }

    /// Projects trajectories from an explicit belief set.
    pub fn from_beliefs(source: Cell, beliefs: BTreeMap<Cell, Belief>, terrain: &Terrain) -> Self {
        let mut zone = Self {
            source,
            field: vec![0.0; (BLOCKS_WIDTH * FIELD_HEIGHT) as usize],
            beliefs,
        };
        zone.run_trajectories(terrain);
        zone
    }

    pub fn source(&self) -> Cell {
        self.source
    }

    pub fn beliefs(&self) -> &BTreeMap<Cell, Belief> {
        &self.beliefs
    }

    /// Zero outside the grid.
    pub fn check_danger(&self, cell: Cell) -> f32 {
        Self::index(cell).map_or(0.0, |index| self.field[index])
    }

    /// One step of the uniform movement model. The result is normalized to
    /// sum to one.
    pub fn propagate(
        beliefs: &BTreeMap<Cell, Belief>,
        block_world: &BlockWorld,
    ) -> BTreeMap<Cell, Belief> {
        let terrain = &block_world.terrain;
        let mut next: BTreeMap<Cell, Belief> = BTreeMap::new();

        for (&cell, belief) in beliefs {
            let mut destinations = Vec::with_capacity(5);
            if terrain.is_supported(cell) {
                destinations.push(cell);
                destinations.extend(
                    cell.neighbors()
                        .into_iter()
                        .filter(|neighbor| !terrain.is_ground(*neighbor)),
                );
            } else {
                destinations.push(cell.offset(Direction::Down));
            }

            let chance = belief.probability / destinations.len() as f32;
            for destination in destinations {
                let mut derived = belief.clone();
                derived.probability = chance;
                if let Some(weapon) = block_world.pickup_at(destination) {
                    derived.ammo = max_ammo(derived.ammo, 3);
                    derived.weapons.insert(weapon);
                }

                match next.get_mut(&destination) {
                    Some(existing) => existing.merge(derived),
                    None => {
                        next.insert(destination, derived);
                    }
                }
            }
        }

        normalize(&mut next);
        next.retain(|_, belief| belief.probability >= BELIEF_EPSILON);
        normalize(&mut next);
        next
    }

    fn run_trajectories(&mut self, terrain: &Terrain) {
        let beliefs: Vec<(Cell, Belief)> = self
            .beliefs
            .iter()
            .map(|(cell, belief)| (*cell, belief.clone()))
            .collect();

        for (cell, belief) in beliefs {
            if belief.ammo == 0 {
                continue;
            }

            for &weapon in &belief.weapons {
                match weapon {
                    Weapon::None => {}
                    Weapon::Lightning => {
                        for j in -FLOOR_LEVEL_J..cell.j {
                            self.add_danger(
                                Cell::new(cell.i, j),
                                belief.probability * LIGHTNING_DANGER_WEIGHT,
                            );
                        }
                    }
                    Weapon::Bombs => {
                        let mut scratch = terrain.clone();
                        self.walk(&mut scratch, cell, weapon, belief.probability, belief.ammo, true, false);
                    }
                    Weapon::Rockets | Weapon::Minions => {
                        for facing_right in [true, false] {
                            let mut scratch = terrain.clone();
                            self.walk(
                                &mut scratch,
                                cell,
                                weapon,
                                belief.probability,
                                belief.ammo,
                                facing_right,
                                false,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Follows an idealized shot cell by cell, spending one shot per block of
    /// mutable ground cleared. Digging stops a fall.
    #[allow(clippy::too_many_arguments)]
    fn walk(
        &mut self,
        terrain: &mut Terrain,
        cell: Cell,
        weapon: Weapon,
        probability: f32,
        ammo: i32,
        facing_right: bool,
        falling: bool,
    ) {
        if probability < TRAJECTORY_EPSILON || ammo == 0 {
            return;
        }

        if terrain.is_ground(cell) {
            if terrain.is_immutable(cell) {
                return;
            }
            terrain.set_ground(cell, false);
            let remaining = if ammo > 0 { ammo - 1 } else { ammo };
            self.walk(terrain, cell, weapon, probability, remaining, facing_right, false);
            return;
        }

        let ahead = cell.offset(if facing_right {
            Direction::Right
        } else {
            Direction::Left
        });
        let below = cell.offset(Direction::Down);

        match weapon {
            Weapon::Rockets => {
                self.add_danger(cell, probability * ROCKETS_DANGER_WEIGHT);
                self.walk(terrain, ahead, weapon, probability, ammo, facing_right, false);
            }
            Weapon::Bombs => {
                self.add_danger(cell, probability * BOMBS_DANGER_WEIGHT);
                self.walk(terrain, below, weapon, probability, ammo, facing_right, true);
            }
            Weapon::Minions => {
                self.add_danger(cell, probability * MINIONS_DANGER_WEIGHT);

                let ground_ahead = terrain.is_ground(ahead);
                let ground_below = terrain.is_ground(below);
                match (ground_ahead, ground_below) {
                    (false, false) => {
                        // Keep walking off a ledge only once the minion has landed
                        if falling && terrain.is_ground(ahead.offset(Direction::Down)) {
                            self.walk(terrain, ahead, weapon, probability, ammo, facing_right, false);
                        } else {
                            self.walk(terrain, below, weapon, probability, ammo, facing_right, true);
                        }
                    }
                    (false, true) => {
                        self.walk(terrain, ahead, weapon, probability, ammo, facing_right, false);
                    }
                    (true, false) => {
                        self.walk(terrain, below, weapon, probability, ammo, facing_right, true);
                    }
                    (true, true) => {
                        let mut branch = terrain.clone();
                        let half = probability / 2.0;
                        self.walk(terrain, ahead, weapon, half, ammo, facing_right, false);
                        self.walk(&mut branch, below, weapon, half, ammo, facing_right, true);
                    }
                }
            }
            Weapon::Lightning | Weapon::None => {}
        }
    }

    fn add_danger(&mut self, cell: Cell, delta: f32) {
        if let Some(index) = Self::index(cell) {
            self.field[index] += delta;
        }
    }

    fn index(cell: Cell) -> Option<usize> {
        let row = cell.j + FLOOR_LEVEL_J;
        if cell.i < 0 || cell.i >= BLOCKS_WIDTH || row < 0 || row >= FIELD_HEIGHT {
            return None;
        }
        Some((row * BLOCKS_WIDTH + cell.i) as usize)
    }
}

fn normalize(beliefs: &mut BTreeMap<Cell, Belief>) {
    let total: f32 = beliefs.values().map(|belief| belief.probability).sum();
    if total <= 0.0 {
        return;
    }
    for belief in beliefs.values_mut() {
        belief.probability /= total;
    }
}
