use rand::Rng;

use crate::infra::PlayerId;
use crate::state::powerup::{Powerup, PowerupKind};
use crate::state::terrain::{BLOCK_SIZE, BLOCKS_WIDTH, FLOOR_LEVEL, i_to_x_min};
use crate::state::world::World;

pub const DEFAULT_SPAWN_INTERVAL: u32 = 60;
pub const DEFAULT_MAX_POWERUPS: usize = 8;

const SPAWN_KINDS: [PowerupKind; 6] = [
    PowerupKind::Bombs,
    PowerupKind::Rockets,
    PowerupKind::Minions,
    PowerupKind::Lightning,
    PowerupKind::Speed,
    PowerupKind::Gravity,
];

/// Match-wide bookkeeping that lives outside the simulation state: who
/// started in master mode and the crate drop schedule.
#[derive(Debug, Clone)]
pub struct MatchContext {
    master: Option<PlayerId>,
    spawn_interval: u32,
    max_powerups: usize,
    spawn_timer: u32,
}

impl Default for MatchContext {
    fn default() -> Self {
        Self::new(Some(PlayerId::Two), DEFAULT_SPAWN_INTERVAL, DEFAULT_MAX_POWERUPS)
    }
}

impl MatchContext {
    pub fn new(master: Option<PlayerId>, spawn_interval: u32, max_powerups: usize) -> Self {
        Self {
            master,
            spawn_interval,
            max_powerups,
            spawn_timer: spawn_interval,
        }
    }

    pub fn master(&self) -> Option<PlayerId> {
        self.master
    }

    /// Counts down the drop timer and drops a random crate from the sky
    /// when it expires.
    pub fn tick<R: Rng>(&mut self, world: &mut World, rng: &mut R) {
        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        if self.spawn_timer > 0 {
            return;
        }
        self.spawn_timer = self.spawn_interval;

        if world.powerups.len() >= self.max_powerups {
            return;
        }

        let mut i = rng.random_range(0..BLOCKS_WIDTH);
        if i == 22 || i == 23 {
            i = if rng.random_bool(0.5) { 21 } else { 24 };
        }
        let kind = SPAWN_KINDS[rng.random_range(0..SPAWN_KINDS.len())];
        let powerup = Powerup::new(i_to_x_min(i), FLOOR_LEVEL - 4.0 * BLOCK_SIZE, kind);
        tracing::trace!(column = i, %kind, "dropping crate");
        world.spawn_powerup(powerup);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::state::terrain::Terrain;

    #[test]
    fn test_drops_on_schedule_up_to_cap() {
        let mut context = MatchContext::new(None, 3, 2);
        let mut world = World::new(Terrain::filled(), &context);
        world.powerups.clear();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..2 {
            context.tick(&mut world, &mut rng);
        }
        assert!(world.powerups.is_empty());

        context.tick(&mut world, &mut rng);
        assert_eq!(world.powerups.len(), 1);

        for _ in 0..30 {
            context.tick(&mut world, &mut rng);
        }
        assert_eq!(world.powerups.len(), 2);
    }

    #[test]
    fn test_no_master_means_both_start_empty() {
        let context = MatchContext::new(None, 60, 8);
        let world = World::new(Terrain::filled(), &context);
        assert_eq!(world.combatant(PlayerId::One).ammo, 0);
        assert_eq!(world.combatant(PlayerId::Two).ammo, 0);
    }
}
