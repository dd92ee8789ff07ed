#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn scheduler driven by the active wave definition.
//!
//! The scheduler decides *what* spawns and *when*; where the enemy appears is
//! delegated to a [`SpawnGeometry`] collaborator supplied by the adapter.

use std::time::Duration;

use retro_hunter_core::{Command, EnemyKind, Event, SeededRandom, SpawnEntry, UnitRandom, WaveDefinition};

const MIN_SPAWN_RATE_MULT: f32 = 0.1;

/// Instantiation request handed to the [`SpawnGeometry`] collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpawnRequest {
    /// Enemy archetype that should be instantiated.
    pub enemy: EnemyKind,
    /// Whether the enemy receives a target on instantiation.
    pub assign_target: bool,
}

/// Places enemies into the arena.
pub trait SpawnGeometry {
    /// Attempts to instantiate the requested enemy, returning whether it
    /// entered the arena.
    fn spawn(&mut self, request: SpawnRequest) -> bool;
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that schedules enemy spawns for the running wave.
#[derive(Debug)]
pub struct Spawning {
    definition: Option<WaveDefinition>,
    timer: Duration,
    alive: u32,
    random: SeededRandom,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            definition: None,
            timer: Duration::ZERO,
            alive: 0,
            random: SeededRandom::from_seed(config.rng_seed),
        }
    }

    /// Number of enemies spawned by this system that are still alive.
    #[must_use]
    pub const fn alive(&self) -> u32 {
        self.alive
    }

    /// Time accumulated toward the next spawn.
    #[must_use]
    pub const fn timer(&self) -> Duration {
        self.timer
    }

    /// Loads a wave definition, resetting the spawn timer and live count.
    pub fn start_wave(&mut self, definition: WaveDefinition) {
        self.definition = Some(definition);
        self.timer = Duration::ZERO;
        self.alive = 0;
    }

    /// Accounts for an enemy that left the arena, requesting hunt-rank
    /// experience when the player destroyed it.
    pub fn notify_despawned(&mut self, killed_by_player: bool, out: &mut Vec<Command>) {
        self.alive = self.alive.saturating_sub(1);
        if killed_by_player {
            out.push(Command::GrantExperience);
        }
    }

    /// Advances the spawn timer by `dt` of active gameplay and spawns at most
    /// one enemy. Returns the archetype that entered the arena, if any.
    pub fn tick(
        &mut self,
        dt: Duration,
        spawn_rate_mult: f32,
        geometry: &mut dyn SpawnGeometry,
    ) -> Option<EnemyKind> {
        let definition = self.definition.as_ref()?;
        if definition.entries().is_empty() {
            return None;
        }

        self.timer = self.timer.saturating_add(dt);
        let interval = effective_interval(definition.spawn_interval(), spawn_rate_mult);
        if self.timer < interval || self.alive >= definition.max_enemies() {
            return None;
        }

        self.timer = Duration::ZERO;
        let entry = *weighted_draw(definition.entries(), self.random.next_unit())?;
        let request = SpawnRequest {
            enemy: entry.enemy(),
            assign_target: entry.assign_target(),
        };
        if geometry.spawn(request) {
            self.alive = self.alive.saturating_add(1);
            Some(request.enemy)
        } else {
            tracing::debug!(enemy = ?request.enemy, "spawn declined by geometry");
            None
        }
    }

    /// Consumes world events, spawning through `geometry` and emitting
    /// experience grants for player kills.
    pub fn handle(
        &mut self,
        events: &[Event],
        spawn_rate_mult: f32,
        geometry: &mut dyn SpawnGeometry,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::RunStarted | Event::RunEnded { .. } => {
                    self.definition = None;
                    self.timer = Duration::ZERO;
                    self.alive = 0;
                }
                Event::WaveStarted { definition, .. } => self.start_wave(definition.clone()),
                Event::WaveClockAdvanced { dt, .. } => {
                    let _ = self.tick(*dt, spawn_rate_mult, geometry);
                }
                Event::EnemyDespawned {
                    killed_by_player, ..
                } => self.notify_despawned(*killed_by_player, out),
                _ => {}
            }
        }
    }
}

/// Spawn delay after scaling by the spawn-rate upgrade, which is floored at
/// `0.1`. The result is rounded to whole microseconds.
#[must_use]
pub fn effective_interval(base: Duration, spawn_rate_mult: f32) -> Duration {
    let mult = spawn_rate_mult.max(MIN_SPAWN_RATE_MULT);
    if !mult.is_finite() {
        return Duration::ZERO;
    }
    let secs = base.as_secs_f64() / f64::from(mult);
    Duration::from_micros((secs * 1e6).round() as u64)
}

/// Cumulative-sum draw over `entries` for a uniform `unit` in `[0, 1)`.
///
/// Entries with zero weight are never selected. Returns `None` when no entry
/// carries a positive weight.
#[must_use]
pub fn weighted_draw(entries: &[SpawnEntry], unit: f32) -> Option<&SpawnEntry> {
    let total: f32 = entries.iter().map(SpawnEntry::weight).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let target = unit.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for entry in entries.iter().filter(|entry| entry.weight() > 0.0) {
        cumulative += entry.weight();
        if target <= cumulative {
            return Some(entry);
        }
        last_positive = Some(entry);
    }
    last_positive
}
