//! Headless stand-in for the physics and navigation collaborators.
//!
//! Enemies occupy a bounded list instead of space. Each one escapes after a
//! fixed lifetime, and targeted enemies detonate on a companion once their
//! fuse burns down.

use std::time::Duration;

use retro_hunter_core::EnemyKind;
use retro_hunter_system_spawning::{SpawnGeometry, SpawnRequest};

const ESCAPE_AFTER: Duration = Duration::from_secs(12);
const DETONATION_FUSE: Duration = Duration::from_secs(6);

/// Something that happened to an enemy without the player's involvement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ArenaOutcome {
    /// The enemy left the arena unharmed.
    Escaped(EnemyKind),
    /// The enemy reached its companion target and exploded.
    Detonated(EnemyKind),
}

#[derive(Clone, Debug)]
struct Enemy {
    kind: EnemyKind,
    hit_points: u32,
    age: Duration,
    fuse: Option<Duration>,
}

#[derive(Debug)]
pub(crate) struct Arena {
    enemies: Vec<Enemy>,
    capacity: usize,
}

impl Arena {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            enemies: Vec::new(),
            capacity,
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.enemies.len()
    }

    pub(crate) fn clear(&mut self) {
        self.enemies.clear();
    }

    /// Ages every enemy, removing those that escaped or detonated.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<ArenaOutcome> {
        let mut outcomes = Vec::new();
        self.enemies.retain_mut(|enemy| {
            enemy.age = enemy.age.saturating_add(dt);
            if let Some(fuse) = enemy.fuse.as_mut() {
                *fuse = fuse.saturating_sub(dt);
                if fuse.is_zero() {
                    outcomes.push(ArenaOutcome::Detonated(enemy.kind));
                    return false;
                }
            }
            if enemy.age >= ESCAPE_AFTER {
                outcomes.push(ArenaOutcome::Escaped(enemy.kind));
                return false;
            }
            true
        });
        outcomes
    }

    /// Deals one point of damage to the oldest enemy. Returns its kind when
    /// the hit destroyed it.
    pub(crate) fn strike(&mut self) -> Option<EnemyKind> {
        let enemy = self.enemies.first_mut()?;
        enemy.hit_points = enemy.hit_points.saturating_sub(1);
        if enemy.hit_points == 0 {
            Some(self.enemies.remove(0).kind)
        } else {
            None
        }
    }

    /// Deals one point of damage to the second-oldest enemy, as a ricochet
    /// bouncing off the first would.
    pub(crate) fn ricochet(&mut self) -> Option<EnemyKind> {
        let enemy = self.enemies.get_mut(1)?;
        enemy.hit_points = enemy.hit_points.saturating_sub(1);
        if enemy.hit_points == 0 {
            Some(self.enemies.remove(1).kind)
        } else {
            None
        }
    }
}

impl SpawnGeometry for Arena {
    fn spawn(&mut self, request: SpawnRequest) -> bool {
        if self.enemies.len() >= self.capacity {
            return false;
        }
        self.enemies.push(Enemy {
            kind: request.enemy,
            hit_points: hit_points(request.enemy),
            age: Duration::ZERO,
            fuse: request.assign_target.then_some(DETONATION_FUSE),
        });
        true
    }
}

pub(crate) const fn hit_points(kind: EnemyKind) -> u32 {
    match kind {
        EnemyKind::Invader | EnemyKind::Bomber => 1,
        EnemyKind::Stepper => 2,
    }
}

pub(crate) const fn base_points(kind: EnemyKind) -> u32 {
    match kind {
        EnemyKind::Invader => 100,
        EnemyKind::Stepper => 150,
        EnemyKind::Bomber => 250,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(enemy: EnemyKind, assign_target: bool) -> SpawnRequest {
        SpawnRequest {
            enemy,
            assign_target,
        }
    }

    #[test]
    fn capacity_declines_extra_spawns() {
        let mut arena = Arena::new(1);
        assert!(arena.spawn(request(EnemyKind::Invader, false)));
        assert!(!arena.spawn(request(EnemyKind::Invader, false)));
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn steppers_take_two_hits() {
        let mut arena = Arena::new(4);
        assert!(arena.spawn(request(EnemyKind::Stepper, false)));
        assert_eq!(arena.strike(), None);
        assert_eq!(arena.strike(), Some(EnemyKind::Stepper));
        assert_eq!(arena.strike(), None);
    }

    #[test]
    fn targeted_enemies_detonate_before_escaping() {
        let mut arena = Arena::new(4);
        assert!(arena.spawn(request(EnemyKind::Bomber, true)));
        assert!(arena.spawn(request(EnemyKind::Invader, false)));

        assert!(arena.advance(Duration::from_secs(5)).is_empty());
        assert_eq!(
            arena.advance(Duration::from_secs(1)),
            vec![ArenaOutcome::Detonated(EnemyKind::Bomber)]
        );
        assert_eq!(
            arena.advance(Duration::from_secs(6)),
            vec![ArenaOutcome::Escaped(EnemyKind::Invader)]
        );
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn ricochet_skips_the_struck_enemy() {
        let mut arena = Arena::new(4);
        assert!(arena.ricochet().is_none());
        assert!(arena.spawn(request(EnemyKind::Stepper, false)));
        assert!(arena.spawn(request(EnemyKind::Invader, false)));
        assert_eq!(arena.ricochet(), Some(EnemyKind::Invader));
        assert_eq!(arena.live(), 1);
    }
}
