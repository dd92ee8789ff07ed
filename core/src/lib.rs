#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Retro Hunter simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::{fmt, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Retro Hunter.";

/// Lifecycle phase of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No run has been started yet.
    Standby,
    /// Short cinematic that precedes every wave.
    WaveIntro,
    /// Active gameplay; the only phase that advances wave time and spawning.
    Playing,
    /// Manual pause requested by the player.
    Paused,
    /// Between-wave rounds where the player picks upgrades.
    UpgradeSelection,
    /// Companion selection that follows the upgrade rounds.
    Intermission,
    /// Terminal phase entered once every companion is lost.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets every piece of run state and starts the first wave.
    NewRun,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Registers a successful hit that feeds the combo meter.
    RegisterHit,
    /// Fires the player's weapon at the provided target.
    Fire {
        /// What the shot resolved against.
        target: ShotTarget,
    },
    /// Requests a reload of the player's weapon.
    Reload,
    /// Reports that the player destroyed an enemy.
    EnemyKilled {
        /// Kind of the destroyed enemy.
        enemy: EnemyKind,
        /// Points awarded before combo and upgrade multipliers.
        base_points: u32,
    },
    /// Reports that an enemy left the arena without being destroyed.
    EnemyRemoved {
        /// Kind of the removed enemy.
        enemy: EnemyKind,
    },
    /// Grants hunt-rank experience for a player kill.
    GrantExperience,
    /// Reports that a companion died or was removed.
    CompanionLost,
    /// Suspends active gameplay.
    Pause,
    /// Resumes gameplay after a pause.
    Resume,
    /// Presents a drawn set of upgrades for the current upgrade round.
    PresentUpgradeOffer {
        /// Upgrades offered to the player, in display order.
        choices: Vec<UpgradeKind>,
    },
    /// Selects one upgrade from the active offer.
    SelectUpgrade {
        /// Zero-based position within the active offer.
        index: usize,
    },
    /// Chooses the companion that joins the run before the next wave.
    ChooseCompanion {
        /// Companion that should be spawned.
        kind: CompanionKind,
        /// Spawn area the companion should appear in.
        area: usize,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh run started.
    RunStarted,
    /// Indicates that the simulation clock advanced, regardless of phase.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Indicates that the wave clock advanced during active gameplay.
    WaveClockAdvanced {
        /// Duration of gameplay time that elapsed in the tick.
        dt: Duration,
        /// Time left before the wave ends.
        remaining: Duration,
    },
    /// Announces a phase transition.
    PhaseChanged {
        /// Phase that was active before the transition.
        from: Phase,
        /// Phase that is active after the transition.
        to: Phase,
    },
    /// Announces that a new wave was loaded.
    WaveStarted {
        /// One-based index of the wave.
        wave: u32,
        /// Spawn definition that governs the wave.
        definition: WaveDefinition,
        /// Total duration of the wave including upgrade bonuses.
        duration: Duration,
    },
    /// Announces that the wave timer ran out.
    WaveEnded {
        /// One-based index of the finished wave.
        wave: u32,
    },
    /// Reports the combo meter after it changed.
    ComboChanged {
        /// Fill of the combo meter in `[0, 1]`.
        fill: f32,
        /// Current combo multiplier.
        multiplier: f32,
    },
    /// Reports that the combo multiplier increased.
    ComboIncreased {
        /// Multiplier after the increase.
        multiplier: f32,
        /// Camera feedback scaled by the new multiplier.
        shake: CameraShake,
    },
    /// Reports that a combo above the base multiplier was lost.
    ComboBroken {
        /// Multiplier that was active before the reset.
        previous: f32,
    },
    /// Reports points added to the score ledger.
    ScoreAwarded {
        /// Points added by this award.
        points: u64,
        /// Ledger total after the award.
        total: u64,
        /// Whether the double-score roll succeeded.
        double: bool,
    },
    /// Requests that an upgrade offer be drawn for the next round.
    UpgradeRoundRequested {
        /// Rounds left in the current upgrade phase, including this one.
        remaining: u32,
    },
    /// Announces the upgrades offered to the player.
    UpgradesOffered {
        /// Offered upgrades with their preview values.
        offers: Vec<UpgradePreview>,
    },
    /// Confirms that an upgrade was applied.
    UpgradeApplied {
        /// Kind of upgrade applied.
        kind: UpgradeKind,
        /// Value of the upgraded field after application.
        value: f32,
    },
    /// Reports experience granted to the hunt rank.
    ExperienceGained {
        /// Experience points gained.
        gained: u32,
        /// Whether the double-experience roll succeeded.
        double: bool,
        /// Rank after the grant.
        rank: u32,
        /// Progress toward the next rank in `[0, 1)`.
        progress: f32,
    },
    /// Reports that the hunt rank increased.
    RankIncreased {
        /// New hunt rank.
        rank: u32,
    },
    /// Reports that the hunt rank was reset after the upgrade phase.
    RankReset,
    /// Reports the number of surviving companions.
    CompanionsChanged {
        /// Companions currently alive.
        alive: u32,
    },
    /// Confirms that a chosen companion joined the run.
    CompanionSpawned {
        /// Companion that joined.
        kind: CompanionKind,
        /// Spawn area used for the companion.
        area: usize,
    },
    /// Confirms that the weapon fired.
    ShotFired {
        /// What the shot resolved against.
        target: ShotTarget,
        /// Whether the shot consumed ammunition.
        ammo_consumed: bool,
    },
    /// Reports that the trigger was pulled on an empty magazine.
    AmmoEmpty,
    /// Reports the weapon's magazine after it changed.
    AmmoChanged {
        /// Rounds left in the magazine.
        ammo: u32,
        /// Magazine capacity.
        max_ammo: u32,
    },
    /// Confirms that a reload started.
    ReloadStarted {
        /// Time until the magazine is refilled.
        duration: Duration,
    },
    /// Confirms that a delayed ricochet struck a nearby enemy.
    RicochetHit,
    /// Reports that an enemy left the live population.
    EnemyDespawned {
        /// Kind of enemy that left.
        enemy: EnemyKind,
        /// Whether the player destroyed the enemy.
        killed_by_player: bool,
    },
    /// Symbolic audio or visual cue for presentation collaborators.
    Cue {
        /// Cue that should be played.
        cue: SoundCue,
    },
    /// Announces the end of the run.
    RunEnded {
        /// Final score recorded in the ledger.
        final_score: u64,
        /// Last wave reached.
        wave: u32,
    },
}

/// Camera feedback requested when the combo multiplier increases.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraShake {
    /// Duration of the shake.
    pub duration: Duration,
    /// Amplitude of the shake.
    pub intensity: f32,
}

/// Symbolic keys for audio and visual cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Combo multiplier increased.
    MultiplierUp,
    /// Combo multiplier was lost.
    MultiplierFail,
    /// Hunt rank increased.
    LevelUp,
    /// An upgrade was applied.
    UpgradeGet,
    /// A score award was doubled.
    DoublePointsGet,
    /// The upgrade shop opened.
    OpenShop,
    /// The companion selection opened or the game was paused.
    OpenCompanionSelection,
    /// Gameplay resumed after a pause.
    Resume,
    /// Shot that consumed ammunition.
    PlayerShoot,
    /// Shot that did not consume ammunition.
    PlayerShootFree,
    /// Reload started.
    PlayerReload,
    /// Trigger pulled on an empty magazine.
    PlayerAmmoEmpty,
}

/// Outcome of a single player shot as resolved by the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotTarget {
    /// The shot struck an enemy.
    Enemy,
    /// The shot struck a hostile projectile.
    Projectile,
    /// The shot hit nothing of interest.
    Miss,
}

/// Hostile enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Lateral sweeping invader.
    Invader,
    /// Invader that drops down a row at a time.
    Stepper,
    /// Diving enemy that explodes on its assigned target.
    Bomber,
}

/// Companions that can join the run between waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanionKind {
    /// Ranged companion that marks and shoots enemies.
    Kelvin,
    /// Companion that throws explosive cookies.
    Albert,
}

/// Permanent modifiers selectable between waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Shortens the reload time.
    ReloadSpeed,
    /// Enlarges the magazine.
    MaxAmmo,
    /// Adds fill to every combo hit.
    ComboFill,
    /// Chance that a shot does not consume ammunition.
    NoAmmoChance,
    /// Slows the passive combo drain.
    ComboDrain,
    /// Extends every following wave.
    WaveTime,
    /// Raises the enemy spawn rate.
    EnemySpawnRate,
    /// Multiplies every score award.
    ScoreBonus,
    /// Chance that a score award is doubled.
    DoubleScoreChance,
    /// Chance that a kill grants double hunt-rank experience.
    DoubleExpChance,
    /// Chance that an enemy hit ricochets into another enemy.
    RicochetChance,
}

impl UpgradeKind {
    /// Number of distinct upgrade kinds.
    pub const COUNT: usize = 11;

    /// Every upgrade kind in declaration order.
    pub const ALL: [UpgradeKind; Self::COUNT] = [
        Self::ReloadSpeed,
        Self::MaxAmmo,
        Self::ComboFill,
        Self::NoAmmoChance,
        Self::ComboDrain,
        Self::WaveTime,
        Self::EnemySpawnRate,
        Self::ScoreBonus,
        Self::DoubleScoreChance,
        Self::DoubleExpChance,
        Self::RicochetChance,
    ];

    /// Position of the kind within [`UpgradeKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label used by presentation layers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReloadSpeed => "Reload Speed",
            Self::MaxAmmo => "Max Ammo",
            Self::ComboFill => "Combo Fill",
            Self::NoAmmoChance => "Free Shot Chance",
            Self::ComboDrain => "Combo Drain",
            Self::WaveTime => "Wave Time",
            Self::EnemySpawnRate => "Spawn Rate",
            Self::ScoreBonus => "Score Bonus",
            Self::DoubleScoreChance => "Double Score Chance",
            Self::DoubleExpChance => "Double Rank Chance",
            Self::RicochetChance => "Ricochet Chance",
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upgrade offered to the player together with its would-be value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePreview {
    /// Offered upgrade.
    pub kind: UpgradeKind,
    /// Rendered value the upgrade would produce if selected.
    pub preview: String,
}

/// Weighted spawn candidate belonging to a wave definition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    enemy: EnemyKind,
    weight: f32,
    #[serde(default)]
    assign_target: bool,
}

impl SpawnEntry {
    /// Creates a new spawn entry.
    #[must_use]
    pub const fn new(enemy: EnemyKind, weight: f32, assign_target: bool) -> Self {
        Self {
            enemy,
            weight,
            assign_target,
        }
    }

    /// Enemy archetype spawned by the entry.
    #[must_use]
    pub const fn enemy(&self) -> EnemyKind {
        self.enemy
    }

    /// Relative weight within the wave's categorical distribution.
    ///
    /// Negative or non-finite weights are reported as zero so that callers
    /// never observe a malformed distribution.
    #[must_use]
    pub fn weight(&self) -> f32 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }

    /// Weight exactly as declared, before sanitising.
    #[must_use]
    pub const fn declared_weight(&self) -> f32 {
        self.weight
    }

    /// Whether the spawned enemy receives a target on instantiation.
    #[must_use]
    pub const fn assign_target(&self) -> bool {
        self.assign_target
    }
}

/// Spawn parameters governing a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    max_enemies: u32,
    spawn_interval_secs: f32,
    #[serde(default)]
    entries: Vec<SpawnEntry>,
}

impl WaveDefinition {
    /// Creates a new wave definition.
    #[must_use]
    pub fn new(max_enemies: u32, spawn_interval: Duration, entries: Vec<SpawnEntry>) -> Self {
        Self {
            max_enemies,
            spawn_interval_secs: spawn_interval.as_secs_f32(),
            entries,
        }
    }

    /// Maximum number of enemies alive at once.
    #[must_use]
    pub const fn max_enemies(&self) -> u32 {
        self.max_enemies
    }

    /// Base delay between two spawns before upgrade scaling, rounded to whole
    /// microseconds.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        if self.spawn_interval_secs.is_finite() && self.spawn_interval_secs > 0.0 {
            Duration::from_micros((f64::from(self.spawn_interval_secs) * 1e6).round() as u64)
        } else {
            Duration::ZERO
        }
    }

    /// Base spawn delay exactly as declared, in seconds.
    #[must_use]
    pub const fn spawn_interval_secs(&self) -> f32 {
        self.spawn_interval_secs
    }

    /// Weighted spawn candidates.
    #[must_use]
    pub fn entries(&self) -> &[SpawnEntry] {
        &self.entries
    }
}

impl Default for WaveDefinition {
    fn default() -> Self {
        Self {
            max_enemies: 10,
            spawn_interval_secs: 1.0,
            entries: Vec::new(),
        }
    }
}

/// Source of uniform random values used by every stochastic rule.
///
/// The world and systems never reach for a global generator; tests inject
/// fixed or seeded sources through this trait.
pub trait UnitRandom: fmt::Debug {
    /// Returns a uniformly distributed value in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Returns a uniformly distributed index in `0..len`; zero when `len` is zero.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Deterministic [`UnitRandom`] backed by a seeded ChaCha stream.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a new source from the provided seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl UnitRandom for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.rng.gen_range(0..len)
        }
    }
}

/// Errors reported by leaderboard collaborators.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    /// The leaderboard could not be reached.
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
    /// The leaderboard rejected the submission.
    #[error("score submission rejected: {0}")]
    Rejected(String),
}

/// External collaborator that records final scores.
pub trait Leaderboard {
    /// Submits a final score, returning the one-based rank on success.
    fn submit(&mut self, score: u64) -> Result<u32, LeaderboardError>;
}

/// Bracket a submitted score landed in, used to pick the game-over narrative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankTier {
    /// The submission failed or produced no rank.
    Unranked,
    /// Ranks 1 through 10.
    TopTen,
    /// Ranks 11 through 50.
    TopFifty,
    /// Rank 51 or lower.
    Beyond,
}

impl RankTier {
    /// Classifies the outcome of a leaderboard submission.
    #[must_use]
    pub fn from_submission(outcome: &Result<u32, LeaderboardError>) -> Self {
        match outcome {
            Ok(0) | Err(_) => Self::Unranked,
            Ok(rank) if *rank <= 10 => Self::TopTen,
            Ok(rank) if *rank <= 50 => Self::TopFifty,
            Ok(_) => Self::Beyond,
        }
    }
}
