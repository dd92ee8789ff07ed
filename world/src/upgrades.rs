//! Upgrade registry: accumulated upgrade effects and the rule table that
//! drives both applying and previewing them.
//!
//! Every kind maps to exactly one [`Rule`]; [`next_value`] is the single pure
//! computation shared by [`UpgradeState::apply`] and [`UpgradeState::preview`],
//! so the value shown to the player is always the value that gets applied.

use retro_hunter_core::UpgradeKind;
use serde::{Deserialize, Serialize};

/// Ceiling shared by every probability-valued upgrade.
const PROBABILITY_CAP: f32 = 0.95;

/// Growth rule applied to one upgrade field.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Rule {
    /// Multiplies the current value.
    Scale(f32),
    /// Adds to the current value.
    Add(f32),
    /// Adds to the current value, then clamps.
    AddCapped { step: f32, cap: f32 },
    /// Starts at `base` from zero, otherwise multiplies by `factor`, then clamps.
    Grow { base: f32, factor: f32, cap: f32 },
}

impl Rule {
    fn next(self, current: f32) -> f32 {
        match self {
            Self::Scale(factor) => current * factor,
            Self::Add(step) => current + step,
            Self::AddCapped { step, cap } => (current + step).min(cap),
            Self::Grow { base, factor, cap } => {
                let grown = if current == 0.0 { base } else { current * factor };
                grown.min(cap)
            }
        }
    }
}

const fn rule(kind: UpgradeKind) -> Rule {
    match kind {
        UpgradeKind::ReloadSpeed => Rule::Scale(0.9),
        UpgradeKind::MaxAmmo => Rule::Add(1.0),
        UpgradeKind::ComboFill => Rule::Add(0.05),
        UpgradeKind::NoAmmoChance => Rule::Grow {
            base: 0.1,
            factor: 1.1,
            cap: PROBABILITY_CAP,
        },
        UpgradeKind::ComboDrain => Rule::Scale(0.9),
        UpgradeKind::WaveTime => Rule::Add(2.0),
        UpgradeKind::EnemySpawnRate => Rule::Scale(1.05),
        UpgradeKind::ScoreBonus => Rule::Scale(1.05),
        UpgradeKind::DoubleScoreChance => Rule::AddCapped {
            step: 0.05,
            cap: PROBABILITY_CAP,
        },
        UpgradeKind::DoubleExpChance => Rule::Grow {
            base: 0.25,
            factor: 1.25,
            cap: PROBABILITY_CAP,
        },
        UpgradeKind::RicochetChance => Rule::Add(0.03),
    }
}

const fn initial_value(kind: UpgradeKind) -> f32 {
    match kind {
        UpgradeKind::ReloadSpeed
        | UpgradeKind::ComboDrain
        | UpgradeKind::EnemySpawnRate
        | UpgradeKind::ScoreBonus => 1.0,
        UpgradeKind::MaxAmmo
        | UpgradeKind::ComboFill
        | UpgradeKind::NoAmmoChance
        | UpgradeKind::WaveTime
        | UpgradeKind::DoubleScoreChance
        | UpgradeKind::DoubleExpChance
        | UpgradeKind::RicochetChance => 0.0,
    }
}

/// Value the field of `kind` would hold after one more application.
fn next_value(kind: UpgradeKind, state: &UpgradeState) -> f32 {
    rule(kind).next(state.value(kind))
}

/// Accumulated effect of every upgrade taken during the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeState {
    values: [f32; UpgradeKind::COUNT],
}

impl Default for UpgradeState {
    fn default() -> Self {
        let mut values = [0.0; UpgradeKind::COUNT];
        for kind in UpgradeKind::ALL {
            values[kind.index()] = initial_value(kind);
        }
        Self { values }
    }
}

impl UpgradeState {
    /// Current value of the field governed by `kind`.
    #[must_use]
    pub fn value(&self, kind: UpgradeKind) -> f32 {
        self.values[kind.index()]
    }

    /// Applies one level of `kind`, returning the new field value.
    pub fn apply(&mut self, kind: UpgradeKind) -> f32 {
        let value = next_value(kind, self);
        self.values[kind.index()] = value;
        value
    }

    /// Renders the value `kind` would produce without mutating state.
    ///
    /// `base_reload_secs` is the un-upgraded reload time used to show the
    /// resulting reload duration.
    #[must_use]
    pub fn preview(&self, kind: UpgradeKind, base_reload_secs: f32) -> String {
        let next = next_value(kind, self);
        match kind {
            UpgradeKind::ReloadSpeed => format!("{:.2}s", base_reload_secs * next),
            UpgradeKind::MaxAmmo => format!("+{next:.0}"),
            UpgradeKind::ComboFill => as_percent_bonus(next),
            UpgradeKind::ComboDrain => format!("-{:.0}%", (1.0 - next) * 100.0),
            UpgradeKind::WaveTime => format!("+{}s", tenths(next)),
            UpgradeKind::ScoreBonus => as_percent_bonus(next - 1.0),
            UpgradeKind::NoAmmoChance
            | UpgradeKind::EnemySpawnRate
            | UpgradeKind::DoubleScoreChance
            | UpgradeKind::DoubleExpChance
            | UpgradeKind::RicochetChance => as_percent(next),
        }
    }

    /// Reload duration multiplier.
    #[must_use]
    pub fn reload_speed_mult(&self) -> f32 {
        self.value(UpgradeKind::ReloadSpeed)
    }

    /// Additional magazine capacity.
    #[must_use]
    pub fn max_ammo_bonus(&self) -> u32 {
        self.value(UpgradeKind::MaxAmmo).round() as u32
    }

    /// Fill added to every combo hit.
    #[must_use]
    pub fn combo_fill_bonus(&self) -> f32 {
        self.value(UpgradeKind::ComboFill)
    }

    /// Chance that a shot keeps its ammunition.
    #[must_use]
    pub fn no_ammo_chance(&self) -> f32 {
        self.value(UpgradeKind::NoAmmoChance)
    }

    /// Combo drain multiplier.
    #[must_use]
    pub fn combo_drain_mult(&self) -> f32 {
        self.value(UpgradeKind::ComboDrain)
    }

    /// Seconds added to every wave.
    #[must_use]
    pub fn wave_time_bonus(&self) -> f32 {
        self.value(UpgradeKind::WaveTime)
    }

    /// Enemy spawn rate multiplier.
    #[must_use]
    pub fn enemy_spawn_rate_mult(&self) -> f32 {
        self.value(UpgradeKind::EnemySpawnRate)
    }

    /// Score multiplier.
    #[must_use]
    pub fn score_bonus_mult(&self) -> f32 {
        self.value(UpgradeKind::ScoreBonus)
    }

    /// Chance that a score award is doubled.
    #[must_use]
    pub fn double_score_chance(&self) -> f32 {
        self.value(UpgradeKind::DoubleScoreChance)
    }

    /// Chance that a kill grants double experience.
    #[must_use]
    pub fn double_exp_chance(&self) -> f32 {
        self.value(UpgradeKind::DoubleExpChance)
    }

    /// Chance that an enemy hit ricochets.
    #[must_use]
    pub fn ricochet_chance(&self) -> f32 {
        self.value(UpgradeKind::RicochetChance)
    }
}

fn as_percent(value: f32) -> String {
    format!("{:.0}%", value * 100.0)
}

fn as_percent_bonus(value: f32) -> String {
    format!("+{:.0}%", value * 100.0)
}

fn tenths(value: f32) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}
