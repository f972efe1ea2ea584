mod combatant;
mod match_context;
mod powerup;
mod projectile;
pub mod terrain;
mod world;

pub use combatant::{Action, Combatant, MAX_HEALTH, Shot, Weapon};
pub use match_context::{DEFAULT_MAX_POWERUPS, DEFAULT_SPAWN_INTERVAL, MatchContext};
pub use powerup::{Powerup, PowerupKind};
pub use projectile::Projectile;
pub use terrain::Terrain;
pub use world::{Actions, World};
