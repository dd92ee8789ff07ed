//! Composition root: wires the world, the pure systems, and the headless arena
//! into one frame loop driven by a scripted shooter.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use retro_hunter_core::{Command, CompanionKind, Event, Phase, ShotTarget};
use retro_hunter_system_spawning::{Config as SpawningConfig, Spawning};
use retro_hunter_system_upgrade_offers::{Config as OfferConfig, UpgradeOffers};
use retro_hunter_world::{self as world, query, GameConfig, World};

use crate::{
    arena::{base_points, Arena, ArenaOutcome},
    summary::Summary,
};

const ARENA_CAPACITY: usize = 24;
const SPAWNING_SEED_SALT: u64 = 0x5350_4157_4e00_0001;
const OFFER_SEED_SALT: u64 = 0x4f46_4645_5200_0002;
const SHOOTER_SEED_SALT: u64 = 0x5348_4f4f_5400_0003;

/// How the scripted shooter behaves.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ShooterProfile {
    /// Probability that a shot lands on an enemy when one is present.
    pub(crate) accuracy: f64,
}

#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    spawning: Spawning,
    offers: UpgradeOffers,
    arena: Arena,
    shooter: ChaCha8Rng,
    profile: ShooterProfile,
    summary: Summary,
}

impl Session {
    pub(crate) fn new(config: GameConfig, profile: ShooterProfile) -> Self {
        let seed = config.seed;
        let offers = UpgradeOffers::new(OfferConfig::new(
            config.upgrade_pool.clone(),
            config.upgrade_offer_count,
            seed ^ OFFER_SEED_SALT,
        ));
        Self {
            world: World::new(config),
            spawning: Spawning::new(SpawningConfig::new(seed ^ SPAWNING_SEED_SALT)),
            offers,
            arena: Arena::new(ARENA_CAPACITY),
            shooter: ChaCha8Rng::seed_from_u64(seed ^ SHOOTER_SEED_SALT),
            profile,
            summary: Summary {
                seed,
                ..Summary::default()
            },
        }
    }

    /// Plays up to `frames` frames of `dt` each, stopping early once the run
    /// ends, and returns the collected summary.
    pub(crate) fn run(mut self, frames: u32, dt: Duration) -> Summary {
        tracing::info!(banner = query::welcome_banner(&self.world), "session starting");
        self.submit(Command::NewRun);

        for _ in 0..frames {
            if query::phase(&self.world) == Phase::GameOver {
                break;
            }
            self.frame(dt);
        }

        let wave = query::wave(&self.world);
        self.summary.final_phase = Some(wave.phase);
        self.summary.wave = wave.wave;
        self.summary.score = query::score(&self.world);
        self.summary.companions_alive = query::population(&self.world);
        self.summary
    }

    fn frame(&mut self, dt: Duration) {
        self.summary.simulated_secs += dt.as_secs_f32();
        self.submit(Command::Tick { dt });

        match query::phase(&self.world) {
            Phase::Playing => {
                for outcome in self.arena.advance(dt) {
                    match outcome {
                        ArenaOutcome::Escaped(enemy) => {
                            self.summary.escapes += 1;
                            self.submit(Command::EnemyRemoved { enemy });
                        }
                        ArenaOutcome::Detonated(enemy) => {
                            self.summary.detonations += 1;
                            self.submit(Command::CompanionLost);
                            self.submit(Command::EnemyRemoved { enemy });
                        }
                    }
                }
                if query::phase(&self.world) == Phase::Playing {
                    self.shoot();
                }
            }
            Phase::UpgradeSelection => {
                let offered = query::active_offer(&self.world).len();
                if offered > 0 {
                    let index = self.shooter.gen_range(0..offered);
                    self.submit(Command::SelectUpgrade { index });
                }
            }
            Phase::Intermission => {
                let kind = if self.shooter.gen_bool(0.5) {
                    CompanionKind::Kelvin
                } else {
                    CompanionKind::Albert
                };
                let areas = query::config(&self.world).companion_areas.max(1);
                let area = self.shooter.gen_range(0..areas);
                self.submit(Command::ChooseCompanion { kind, area });
            }
            Phase::Standby | Phase::WaveIntro | Phase::Paused | Phase::GameOver => {}
        }
    }

    fn shoot(&mut self) {
        let weapon = query::weapon(&self.world);
        if weapon.reloading || weapon.cooling_down {
            return;
        }
        if weapon.ammo == 0 {
            self.submit(Command::Reload);
            return;
        }

        let on_target = self.arena.live() > 0 && self.shooter.gen_bool(self.profile.accuracy);
        if !on_target {
            self.submit(Command::Fire {
                target: ShotTarget::Miss,
            });
            return;
        }

        self.submit(Command::Fire {
            target: ShotTarget::Enemy,
        });
        if let Some(enemy) = self.arena.strike() {
            self.submit(Command::EnemyKilled {
                enemy,
                base_points: base_points(enemy),
            });
        }
    }

    /// Applies one command and pumps the resulting events through the systems
    /// until no further commands are produced.
    fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.observe(&events, &mut pending);

            let spawn_rate = query::upgrades(&self.world).enemy_spawn_rate_mult();
            self.spawning
                .handle(&events, spawn_rate, &mut self.arena, &mut pending);
            self.offers.handle(&events, &mut pending);
        }
    }

    fn observe(&mut self, events: &[Event], pending: &mut Vec<Command>) {
        self.summary.events += events.len();
        for event in events {
            match event {
                Event::RunStarted | Event::WaveStarted { .. } => self.arena.clear(),
                Event::ShotFired { ammo_consumed, .. } => {
                    self.summary.shots_fired += 1;
                    if !ammo_consumed {
                        self.summary.free_shots += 1;
                    }
                }
                Event::EnemyDespawned {
                    killed_by_player: true,
                    ..
                } => self.summary.kills += 1,
                Event::RicochetHit => {
                    if let Some(enemy) = self.arena.ricochet() {
                        self.summary.ricochet_kills += 1;
                        pending.push(Command::EnemyKilled {
                            enemy,
                            base_points: base_points(enemy),
                        });
                    }
                }
                Event::ComboIncreased { multiplier, .. } => {
                    self.summary.best_multiplier = self.summary.best_multiplier.max(*multiplier);
                }
                Event::RankIncreased { .. } => self.summary.rank_ups += 1,
                Event::UpgradeApplied { kind, .. } => self.summary.upgrades.push(*kind),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config(seed: u64) -> GameConfig {
        GameConfig {
            seed,
            wave_duration_secs: 10.0,
            ..GameConfig::default()
        }
    }

    fn frame() -> Duration {
        Duration::from_micros(16_667)
    }

    #[test]
    fn same_seed_replays_identically() {
        let profile = ShooterProfile { accuracy: 0.7 };
        let first = Session::new(short_config(5), profile).run(2_400, frame());
        let second = Session::new(short_config(5), profile).run(2_400, frame());
        assert_eq!(first, second);
    }

    #[test]
    fn accurate_shooter_scores_and_progresses() {
        let summary = Session::new(short_config(9), ShooterProfile { accuracy: 1.0 }).run(2_400, frame());
        assert!(summary.shots_fired > 0);
        assert!(summary.kills > 0);
        assert!(summary.score > 0);
        assert!(summary.wave >= 2, "reached wave {}", summary.wave);
        assert!(!summary.upgrades.is_empty());
    }

    #[test]
    fn run_ends_when_companions_are_gone() {
        let config = GameConfig {
            initial_companions: 1,
            waves: vec![retro_hunter_core::WaveDefinition::new(
                4,
                Duration::from_millis(200),
                vec![retro_hunter_core::SpawnEntry::new(
                    retro_hunter_core::EnemyKind::Bomber,
                    1.0,
                    true,
                )],
            )],
            ..short_config(3)
        };
        let summary = Session::new(config, ShooterProfile { accuracy: 0.0 }).run(6_000, frame());
        assert_eq!(summary.final_phase, Some(Phase::GameOver));
        assert_eq!(summary.companions_alive, 0);
        assert!(summary.detonations >= 1);
    }
}
