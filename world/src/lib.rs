#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Retro Hunter.
//!
//! The world owns the wave/phase machine, the combo meter, the score ledger,
//! the upgrade registry, the hunt rank, the player weapon and the companion
//! population. Every mutation goes through [`apply`]; read access goes
//! through [`query`].

mod combo;
mod config;
mod population;
mod rank;
mod score;
mod timers;
mod upgrades;
mod weapon;

use std::time::Duration;

use retro_hunter_core::{
    Command, CompanionKind, Event, Phase, SeededRandom, ShotTarget, SoundCue, UnitRandom, UpgradeKind,
    UpgradePreview, WaveDefinition, WELCOME_BANNER,
};

pub use config::{ComboConfig, ConfigError, GameConfig, WeaponConfig};
pub use upgrades::UpgradeState;

use combo::ComboTracker;
use population::Population;
use rank::HuntRank;
use score::ScoreLedger;
use timers::{Deferred, TimerHandle, TimerQueue};
use weapon::{TriggerOutcome, Weapon};

/// Represents the authoritative Retro Hunter world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    random: Box<dyn UnitRandom>,
    phase: Phase,
    wave: u32,
    wave_definition: WaveDefinition,
    time_remaining: Duration,
    combo: ComboTracker,
    score: ScoreLedger,
    upgrades: UpgradeState,
    rank: HuntRank,
    population: Population,
    weapon: Weapon,
    timers: TimerQueue,
    upgrade_rounds_left: u32,
    active_offer: Vec<UpgradeKind>,
    offer_requested: bool,
}

impl World {
    /// Creates a world in [`Phase::Standby`] whose random draws are seeded
    /// from the configuration.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let random = Box::new(SeededRandom::from_seed(config.seed));
        Self::with_random(config, random)
    }

    /// Creates a world that draws every random value from `random`.
    #[must_use]
    pub fn with_random(config: GameConfig, random: Box<dyn UnitRandom>) -> Self {
        Self {
            banner: WELCOME_BANNER,
            random,
            phase: Phase::Standby,
            wave: 0,
            wave_definition: WaveDefinition::default(),
            time_remaining: Duration::ZERO,
            combo: ComboTracker::new(&config.combo),
            score: ScoreLedger::default(),
            upgrades: UpgradeState::default(),
            rank: HuntRank::new(config.base_rank_xp),
            population: Population::new(config.initial_companions),
            weapon: Weapon::new(&config.weapon),
            timers: TimerQueue::default(),
            upgrade_rounds_left: 0,
            active_offer: Vec::new(),
            offer_requested: false,
            config,
        }
    }

    fn reset_run(&mut self) {
        self.timers.clear();
        self.wave = 0;
        self.wave_definition = WaveDefinition::default();
        self.time_remaining = Duration::ZERO;
        self.combo = ComboTracker::new(&self.config.combo);
        self.score = ScoreLedger::default();
        self.upgrades = UpgradeState::default();
        self.rank = HuntRank::new(self.config.base_rank_xp);
        self.population = Population::new(self.config.initial_companions);
        self.weapon = Weapon::new(&self.config.weapon);
        self.upgrade_rounds_left = 0;
        self.active_offer.clear();
        self.offer_requested = false;
    }

    fn enter(&mut self, to: Phase, out: &mut Vec<Event>) {
        let from = self.phase;
        if from == to {
            return;
        }

        match to {
            Phase::GameOver => self.timers.clear(),
            Phase::Paused => {}
            _ => {
                self.timers.cancel_owned_by(from);
                if from == Phase::Paused && to != Phase::Playing {
                    self.timers.cancel_owned_by(Phase::Playing);
                }
            }
        }

        self.phase = to;
        tracing::debug!(?from, ?to, "phase changed");
        out.push(Event::PhaseChanged { from, to });
    }

    fn begin_wave(&mut self, wave: u32, out: &mut Vec<Event>) {
        self.wave = wave;
        self.wave_definition = self.config.wave(wave);
        let duration = self
            .config
            .wave_duration()
            .saturating_add(config::secs(self.upgrades.wave_time_bonus()));
        self.time_remaining = duration;
        self.weapon.refill(&mut self.timers, out);

        tracing::info!(
            wave,
            max_enemies = self.wave_definition.max_enemies(),
            duration_secs = duration.as_secs_f32(),
            "wave loaded"
        );
        out.push(Event::WaveStarted {
            wave,
            definition: self.wave_definition.clone(),
            duration,
        });

        self.enter(Phase::WaveIntro, out);
        let _ = self
            .timers
            .schedule(Phase::WaveIntro, self.config.wave_intro(), Deferred::BeginPlay);
    }

    fn end_wave(&mut self, out: &mut Vec<Event>) {
        self.combo.reset(out);
        out.push(Event::WaveEnded { wave: self.wave });
        self.enter(Phase::UpgradeSelection, out);
        out.push(Event::Cue {
            cue: SoundCue::OpenShop,
        });
        self.upgrade_rounds_left = self.rank.rank();
        tracing::info!(
            wave = self.wave,
            rounds = self.upgrade_rounds_left,
            "wave ended"
        );
        self.request_upgrade_round(out);
    }

    fn request_upgrade_round(&mut self, out: &mut Vec<Event>) {
        self.active_offer.clear();
        if self.upgrade_rounds_left == 0 {
            self.finish_upgrades(out);
            return;
        }
        self.offer_requested = true;
        out.push(Event::UpgradeRoundRequested {
            remaining: self.upgrade_rounds_left,
        });
    }

    fn finish_upgrade_round(&mut self) {
        self.active_offer.clear();
        self.offer_requested = false;
        self.upgrade_rounds_left = self.upgrade_rounds_left.saturating_sub(1);
        let _ = self.timers.schedule(
            Phase::UpgradeSelection,
            self.config.upgrade_dismiss(),
            Deferred::NextUpgradeRound,
        );
    }

    fn finish_upgrades(&mut self, out: &mut Vec<Event>) {
        self.rank.reset(out);
        self.enter(Phase::Intermission, out);
        out.push(Event::Cue {
            cue: SoundCue::OpenCompanionSelection,
        });
    }

    fn present_offer(&mut self, choices: Vec<UpgradeKind>, out: &mut Vec<Event>) {
        if self.phase != Phase::UpgradeSelection || !self.offer_requested {
            tracing::debug!(phase = ?self.phase, "ignoring unrequested upgrade offer");
            return;
        }

        if choices.is_empty() {
            tracing::debug!("empty upgrade offer, skipping round");
            self.finish_upgrade_round();
            return;
        }

        let base_reload = self.config.weapon.reload_secs;
        let offers = choices
            .iter()
            .map(|&kind| UpgradePreview {
                kind,
                preview: self.upgrades.preview(kind, base_reload),
            })
            .collect();
        self.active_offer = choices;
        self.offer_requested = false;
        out.push(Event::UpgradesOffered { offers });
    }

    fn select_upgrade(&mut self, index: usize, out: &mut Vec<Event>) {
        if self.phase != Phase::UpgradeSelection || self.active_offer.is_empty() {
            return;
        }

        let kind = match self.active_offer.get(index) {
            Some(&kind) => kind,
            None => {
                let fallback = self.random.next_index(self.active_offer.len());
                tracing::warn!(
                    index,
                    offered = self.active_offer.len(),
                    fallback,
                    "upgrade index out of range, picking a random offer"
                );
                self.active_offer[fallback % self.active_offer.len()]
            }
        };

        let value = self.upgrades.apply(kind);
        if kind == UpgradeKind::MaxAmmo {
            self.weapon
                .set_capacity_bonus(self.upgrades.max_ammo_bonus(), &mut self.timers, out);
        }
        tracing::debug!(%kind, value, "upgrade applied");
        out.push(Event::UpgradeApplied { kind, value });
        out.push(Event::Cue {
            cue: SoundCue::UpgradeGet,
        });
        self.finish_upgrade_round();
    }

    fn choose_companion(&mut self, kind: CompanionKind, area: usize, out: &mut Vec<Event>) {
        if self.phase != Phase::Intermission {
            return;
        }

        let areas = self.config.companion_areas.max(1);
        let area = if area < areas {
            area
        } else {
            let fallback = self.random.next_index(areas);
            tracing::warn!(area, areas, fallback, "companion area out of range, picking a random one");
            fallback % areas
        };

        self.population.gain_one();
        out.push(Event::CompanionSpawned { kind, area });
        out.push(Event::CompanionsChanged {
            alive: self.population.alive(),
        });
        self.begin_wave(self.wave.saturating_add(1), out);
    }

    fn fire(&mut self, target: ShotTarget, out: &mut Vec<Event>) {
        let outcome = self.weapon.pull_trigger(
            target,
            self.upgrades.no_ammo_chance(),
            self.random.as_mut(),
            &mut self.timers,
            out,
        );
        if outcome != TriggerOutcome::Fired {
            return;
        }

        match target {
            ShotTarget::Enemy => {
                self.combo.register_hit(self.upgrades.combo_fill_bonus(), out);
                let _ = self.weapon.roll_ricochet(
                    self.upgrades.ricochet_chance(),
                    self.random.as_mut(),
                    &mut self.timers,
                );
            }
            ShotTarget::Projectile => {
                self.combo.register_hit(self.upgrades.combo_fill_bonus(), out);
            }
            ShotTarget::Miss => {}
        }
    }

    fn lose_companion(&mut self, out: &mut Vec<Event>) {
        let extinct = self.population.lose_one();
        out.push(Event::CompanionsChanged {
            alive: self.population.alive(),
        });
        if extinct {
            self.enter(Phase::GameOver, out);
            let final_score = self.score.total();
            tracing::info!(final_score, wave = self.wave, "run ended");
            out.push(Event::RunEnded {
                final_score,
                wave: self.wave,
            });
        }
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        out.push(Event::TimeAdvanced { dt });

        let phase = self.phase;
        for (handle, effect) in self.timers.advance(phase, dt) {
            if self.phase != phase {
                break;
            }
            self.run_deferred(handle, effect, out);
        }

        if phase != Phase::Playing || self.phase != Phase::Playing {
            return;
        }

        self.combo.tick(dt, self.upgrades.combo_drain_mult(), out);
        self.time_remaining = self.time_remaining.saturating_sub(dt);
        out.push(Event::WaveClockAdvanced {
            dt,
            remaining: self.time_remaining,
        });
        if self.time_remaining.is_zero() {
            self.end_wave(out);
        }
    }

    fn run_deferred(&mut self, handle: TimerHandle, effect: Deferred, out: &mut Vec<Event>) {
        match effect {
            Deferred::BeginPlay => self.enter(Phase::Playing, out),
            Deferred::NextUpgradeRound => self.request_upgrade_round(out),
            Deferred::ShotReady => self.weapon.finish_cooldown(handle),
            Deferred::ReloadComplete => self.weapon.finish_reload(handle, out),
            Deferred::Ricochet => out.push(Event::RicochetHit),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if matches!(world.phase, Phase::Standby | Phase::GameOver) && command != Command::NewRun {
        return;
    }

    match command {
        Command::NewRun => {
            world.reset_run();
            tracing::info!("new run started");
            out_events.push(Event::RunStarted);
            out_events.push(Event::CompanionsChanged {
                alive: world.population.alive(),
            });
            world.begin_wave(1, out_events);
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::RegisterHit => {
            if world.phase == Phase::Playing {
                world
                    .combo
                    .register_hit(world.upgrades.combo_fill_bonus(), out_events);
            }
        }
        Command::Fire { target } => {
            if world.phase == Phase::Playing {
                world.fire(target, out_events);
            }
        }
        Command::Reload => {
            if world.phase == Phase::Playing {
                let _ = world.weapon.start_reload(
                    world.upgrades.reload_speed_mult(),
                    &mut world.timers,
                    out_events,
                );
            }
        }
        Command::EnemyKilled { enemy, base_points } => {
            let award = world.score.add_score(
                base_points,
                world.combo.multiplier(),
                world.upgrades.score_bonus_mult(),
                world.upgrades.double_score_chance(),
                world.random.as_mut(),
            );
            out_events.push(Event::ScoreAwarded {
                points: award.points,
                total: world.score.total(),
                double: award.double,
            });
            if award.double {
                out_events.push(Event::Cue {
                    cue: SoundCue::DoublePointsGet,
                });
            }
            out_events.push(Event::EnemyDespawned {
                enemy,
                killed_by_player: true,
            });
        }
        Command::EnemyRemoved { enemy } => {
            out_events.push(Event::EnemyDespawned {
                enemy,
                killed_by_player: false,
            });
        }
        Command::GrantExperience => {
            world.rank.grant(
                world.combo.multiplier(),
                world.upgrades.double_exp_chance(),
                world.random.as_mut(),
                out_events,
            );
        }
        Command::CompanionLost => world.lose_companion(out_events),
        Command::Pause => {
            if world.phase == Phase::Playing {
                world.enter(Phase::Paused, out_events);
                out_events.push(Event::Cue {
                    cue: SoundCue::OpenCompanionSelection,
                });
            }
        }
        Command::Resume => {
            if world.phase == Phase::Paused {
                world.enter(Phase::Playing, out_events);
                out_events.push(Event::Cue {
                    cue: SoundCue::Resume,
                });
            }
        }
        Command::PresentUpgradeOffer { choices } => world.present_offer(choices, out_events),
        Command::SelectUpgrade { index } => world.select_upgrade(index, out_events),
        Command::ChooseCompanion { kind, area } => world.choose_companion(kind, area, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use retro_hunter_core::{Phase, UpgradeKind, WaveDefinition};

    use super::{GameConfig, UpgradeState, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Phase the state machine is currently in.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Captures the wave clock and spawn limits of the current wave.
    #[must_use]
    pub fn wave(world: &World) -> WaveSnapshot {
        WaveSnapshot {
            wave: world.wave,
            time_remaining: world.time_remaining,
            max_enemies_alive: world.wave_definition.max_enemies(),
            spawn_interval: world.wave_definition.spawn_interval(),
            phase: world.phase,
        }
    }

    /// Spawn definition governing the current wave.
    #[must_use]
    pub fn wave_definition(world: &World) -> &WaveDefinition {
        &world.wave_definition
    }

    /// Captures the combo meter.
    #[must_use]
    pub fn combo(world: &World) -> ComboSnapshot {
        ComboSnapshot {
            fill: world.combo.fill(),
            multiplier: world.combo.multiplier(),
        }
    }

    /// Score accumulated during the run.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score.total()
    }

    /// Accumulated upgrade effects.
    #[must_use]
    pub fn upgrades(world: &World) -> &UpgradeState {
        &world.upgrades
    }

    /// Renders the value `kind` would produce if selected now.
    #[must_use]
    pub fn upgrade_preview(world: &World, kind: UpgradeKind) -> String {
        world.upgrades.preview(kind, world.config.weapon.reload_secs)
    }

    /// Upgrades currently offered to the player, empty between rounds.
    #[must_use]
    pub fn active_offer(world: &World) -> &[UpgradeKind] {
        &world.active_offer
    }

    /// Upgrade rounds left in the current upgrade phase.
    #[must_use]
    pub fn upgrade_rounds_remaining(world: &World) -> u32 {
        world.upgrade_rounds_left
    }

    /// Companions currently alive.
    #[must_use]
    pub fn population(world: &World) -> u32 {
        world.population.alive()
    }

    /// Captures the hunt rank progression.
    #[must_use]
    pub fn rank(world: &World) -> RankSnapshot {
        RankSnapshot {
            rank: world.rank.rank(),
            xp: world.rank.xp(),
            xp_to_next: world.rank.xp_to_next(),
        }
    }

    /// Captures the player weapon.
    #[must_use]
    pub fn weapon(world: &World) -> WeaponSnapshot {
        WeaponSnapshot {
            ammo: world.weapon.ammo(),
            max_ammo: world.weapon.max_ammo(),
            reloading: world.weapon.is_reloading(&world.timers),
            cooling_down: world.weapon.is_cooling_down(&world.timers),
        }
    }

    /// Read-only snapshot of the wave clock.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WaveSnapshot {
        /// One-based wave index; zero before the first run.
        pub wave: u32,
        /// Time left before the wave ends.
        pub time_remaining: Duration,
        /// Maximum number of enemies alive at once.
        pub max_enemies_alive: u32,
        /// Base delay between two spawns.
        pub spawn_interval: Duration,
        /// Phase the state machine is in.
        pub phase: Phase,
    }

    /// Read-only snapshot of the combo meter.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ComboSnapshot {
        /// Fill in `[0, 1]`.
        pub fill: f32,
        /// Current multiplier.
        pub multiplier: f32,
    }

    /// Read-only snapshot of the hunt rank.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RankSnapshot {
        /// Current rank, equal to the upgrade rounds the next wave earns.
        pub rank: u32,
        /// Experience collected toward the next rank.
        pub xp: u32,
        /// Experience required for the next rank.
        pub xp_to_next: u32,
    }

    /// Read-only snapshot of the player weapon.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WeaponSnapshot {
        /// Rounds in the magazine.
        pub ammo: u32,
        /// Magazine capacity.
        pub max_ammo: u32,
        /// Whether a reload is running.
        pub reloading: bool,
        /// Whether the shot cooldown is running.
        pub cooling_down: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_world() -> (World, Vec<Event>) {
        let mut world = World::new(GameConfig::default());
        let mut events = Vec::new();
        apply(&mut world, Command::NewRun, &mut events);
        (world, events)
    }

    #[test]
    fn standby_ignores_everything_but_new_run() {
        let mut world = World::new(GameConfig::default());
        let mut events = Vec::new();
        apply(&mut world, Command::RegisterHit, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::phase(&world), Phase::Standby);
    }

    #[test]
    fn new_run_enters_wave_intro_with_full_wave_clock() {
        let (world, events) = started_world();
        assert_eq!(events.first(), Some(&Event::RunStarted));
        assert!(events.contains(&Event::PhaseChanged {
            from: Phase::Standby,
            to: Phase::WaveIntro,
        }));

        let wave = query::wave(&world);
        assert_eq!(wave.wave, 1);
        assert_eq!(wave.phase, Phase::WaveIntro);
        assert_eq!(wave.time_remaining, Duration::from_secs(60));
        assert_eq!(query::population(&world), 20);
        assert_eq!(query::weapon(&world).ammo, 5);
    }

    #[test]
    fn upgrade_round_skips_when_offer_is_empty() {
        let (mut world, _) = started_world();
        world.phase = Phase::UpgradeSelection;
        world.upgrade_rounds_left = 1;
        world.offer_requested = true;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PresentUpgradeOffer { choices: Vec::new() },
            &mut events,
        );
        assert_eq!(query::upgrade_rounds_remaining(&world), 0);
        assert!(query::active_offer(&world).is_empty());
    }

    #[test]
    fn out_of_range_selection_falls_back_to_an_offered_upgrade() {
        let (mut world, _) = started_world();
        world.phase = Phase::UpgradeSelection;
        world.upgrade_rounds_left = 1;
        world.offer_requested = true;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PresentUpgradeOffer {
                choices: vec![UpgradeKind::ScoreBonus, UpgradeKind::ScoreBonus],
            },
            &mut events,
        );
        apply(&mut world, Command::SelectUpgrade { index: 7 }, &mut events);

        assert!(events.contains(&Event::UpgradeApplied {
            kind: UpgradeKind::ScoreBonus,
            value: 1.05,
        }));
    }
}
