use std::fmt;
use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::infra::PlayerId;
use crate::state::terrain::BLOCK_SIZE;
use crate::state::{Terrain, Weapon, World};

/// Horizontal distance to the opponent, in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum XCloseness {
    Near,
    Medium,
    Far,
    WallBetween,
}

/// Signed vertical distance to the opponent. `Pos*` means we are lower down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum YCloseness {
    PosNear,
    PosMedium,
    PosFar,
    NegNear,
    NegMedium,
    NegFar,
    WallBetween,
}

#[derive(Debug, Error, PartialEq)]
pub enum SummaryParseError {
    #[error("expected 6 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid field `{0}`")]
    Field(String),
}

/// Discretized match state used as the learner's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSummary {
    pub weapon: Weapon,
    pub ammo: i32,
    pub enemy_weapon: Weapon,
    pub enemy_ammo: i32,
    pub x: XCloseness,
    pub y: YCloseness,
}

impl MatchSummary {
    pub fn from_world(world: &World, player: PlayerId) -> Self {
        let own = world.combatant(player);
        let enemy = world.combatant(player.opponent());
        let wall_between = is_ground_between(&world.terrain, (own.x, own.y), (enemy.x, enemy.y));

        let x = if wall_between {
            XCloseness::WallBetween
        } else {
            let dx = (own.x - enemy.x).abs();
            if dx < 3.0 * BLOCK_SIZE {
                XCloseness::Near
            } else if dx < 7.0 * BLOCK_SIZE {
                XCloseness::Medium
            } else {
                XCloseness::Far
            }
        };

        let y = if wall_between {
            YCloseness::WallBetween
        } else {
            let dy = own.y - enemy.y;
            if dy < -10.0 * BLOCK_SIZE {
                YCloseness::NegFar
            } else if dy < -BLOCK_SIZE {
                YCloseness::NegMedium
            } else if dy < 0.0 {
                YCloseness::NegNear
            } else if dy < BLOCK_SIZE {
                YCloseness::PosNear
            } else if dy < 10.0 * BLOCK_SIZE {
                YCloseness::PosMedium
            } else {
                YCloseness::PosFar
            }
        };

        Self {
            weapon: own.weapon,
            ammo: own.ammo,
            enemy_weapon: enemy.weapon,
            enemy_ammo: enemy.ammo,
            x,
            y,
        }
        .canonical()
    }

    /// A weapon with no shots left is no weapon.
    pub fn canonical(self) -> Self {
        Self {
            weapon: if self.ammo == 0 { Weapon::None } else { self.weapon },
            enemy_weapon: if self.enemy_ammo == 0 {
                Weapon::None
            } else {
                self.enemy_weapon
            },
            ..self
        }
    }

    pub fn is_armed(&self) -> bool {
        self.ammo != 0 && self.weapon != Weapon::None
    }

    pub fn is_enemy_armed(&self) -> bool {
        self.enemy_ammo != 0 && self.enemy_weapon != Weapon::None
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.weapon, self.ammo, self.enemy_weapon, self.enemy_ammo, self.x, self.y
        )
    }
}

impl FromStr for MatchSummary {
    type Err = SummaryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [weapon, ammo, enemy_weapon, enemy_ammo, x, y] = fields[..] else {
            return Err(SummaryParseError::FieldCount(fields.len()));
        };

        fn field<T: FromStr>(value: &str) -> Result<T, SummaryParseError> {
            value
                .parse()
                .map_err(|_| SummaryParseError::Field(value.to_string()))
        }

        Ok(Self {
            weapon: field(weapon)?,
            ammo: field(ammo)?,
            enemy_weapon: field(enemy_weapon)?,
            enemy_ammo: field(enemy_ammo)?,
            x: field(x)?,
            y: field(y)?,
        })
    }
}

/// A summary plus what the reward needs: both healths and the result, if the
/// match is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchObservation {
    pub summary: MatchSummary,
    pub health: f32,
    pub enemy_health: f32,
    /// `Some(true)` when we won, `Some(false)` when we lost.
    pub won: Option<bool>,
}

impl MatchObservation {
    pub fn from_world(world: &World, player: PlayerId) -> Self {
        let own = world.combatant(player);
        let enemy = world.combatant(player.opponent());
        let won = match (own.is_alive(), enemy.is_alive()) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        };

        Self {
            summary: MatchSummary::from_world(world, player),
            health: own.health,
            enemy_health: enemy.health,
            won,
        }
    }

    pub fn health_margin(&self) -> f32 {
        self.health - self.enemy_health
    }
}

/// Samples the segment between two points every half block.
fn is_ground_between(terrain: &Terrain, from: (f32, f32), to: (f32, f32)) -> bool {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    let samples = (length / (BLOCK_SIZE / 2.0)).ceil() as i32;

    (1..samples).any(|k| {
        let t = k as f32 / samples as f32;
        terrain.is_ground_at(from.0 + dx * t, from.1 + dy * t)
    })
}
