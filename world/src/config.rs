//! Tunable parameters of a run, loaded from TOML by adapters.

use std::time::Duration;

use retro_hunter_core::{EnemyKind, SpawnEntry, UpgradeKind, WaveDefinition};
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse game configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A duration field was negative or not a number.
    #[error("`{field}` must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A combo tuning value was out of range.
    #[error("`combo.{field}` must be a finite, non-negative number (got {value})")]
    InvalidCombo {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A spawn entry carried a negative or non-finite weight.
    #[error("wave {wave} entry {entry} has invalid weight {weight}")]
    InvalidWeight {
        /// One-based wave index.
        wave: usize,
        /// Zero-based entry index within the wave.
        entry: usize,
        /// Weight found in the configuration.
        weight: f32,
    },
    /// The configuration declared no companion spawn areas.
    #[error("at least one companion spawn area is required")]
    NoCompanionAreas,
}

/// Combo meter tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComboConfig {
    /// Fill added by every hit before upgrade bonuses.
    pub fill_per_hit: f32,
    /// Fill drained per second at multiplier 1.
    pub drain_rate: f32,
    /// Fill kept after the meter rolls over into a higher multiplier.
    pub carry: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            fill_per_hit: 0.25,
            drain_rate: 0.1,
            carry: 0.5,
        }
    }
}

/// Player weapon tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaponConfig {
    /// Magazine capacity before upgrades.
    pub max_ammo: u32,
    /// Reload duration before upgrades, in seconds.
    pub reload_secs: f32,
    /// Minimum delay between two shots, in seconds.
    pub shot_delay_secs: f32,
    /// Delay before a ricochet strikes its second enemy, in seconds.
    pub ricochet_delay_secs: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            max_ammo: 5,
            reload_secs: 1.5,
            shot_delay_secs: 0.2,
            ricochet_delay_secs: 0.15,
        }
    }
}

/// Complete configuration of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Seed for every random draw performed by the world.
    pub seed: u64,
    /// Base wave length in seconds.
    pub wave_duration_secs: f32,
    /// Length of the cinematic before each wave, in seconds.
    pub wave_intro_secs: f32,
    /// Delay between an upgrade pick and the next upgrade round, in seconds.
    pub upgrade_dismiss_secs: f32,
    /// Companions alive when a run starts.
    pub initial_companions: u32,
    /// Number of spawn areas a chosen companion may appear in.
    pub companion_areas: usize,
    /// Experience required for the first rank-up.
    pub base_rank_xp: u32,
    /// Upgrades that may be offered between waves.
    pub upgrade_pool: Vec<UpgradeKind>,
    /// Number of upgrades offered per round.
    pub upgrade_offer_count: usize,
    /// Combo meter tuning.
    pub combo: ComboConfig,
    /// Player weapon tuning.
    pub weapon: WeaponConfig,
    /// Wave definitions, consumed in order; the last one repeats.
    pub waves: Vec<WaveDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_0f_4e7a_0002,
            wave_duration_secs: 60.0,
            wave_intro_secs: 3.5,
            upgrade_dismiss_secs: 0.4,
            initial_companions: 20,
            companion_areas: 3,
            base_rank_xp: 12,
            upgrade_pool: UpgradeKind::ALL.to_vec(),
            upgrade_offer_count: 3,
            combo: ComboConfig::default(),
            weapon: WeaponConfig::default(),
            waves: default_waves(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secs("wave_duration_secs", self.wave_duration_secs)?;
        check_secs("wave_intro_secs", self.wave_intro_secs)?;
        check_secs("upgrade_dismiss_secs", self.upgrade_dismiss_secs)?;
        check_secs("weapon.reload_secs", self.weapon.reload_secs)?;
        check_secs("weapon.shot_delay_secs", self.weapon.shot_delay_secs)?;
        check_secs("weapon.ricochet_delay_secs", self.weapon.ricochet_delay_secs)?;

        for (field, value) in [
            ("fill_per_hit", self.combo.fill_per_hit),
            ("drain_rate", self.combo.drain_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidCombo { field, value });
            }
        }
        if !(0.0..1.0).contains(&self.combo.carry) {
            return Err(ConfigError::InvalidCombo {
                field: "carry",
                value: self.combo.carry,
            });
        }

        for (wave, definition) in self.waves.iter().enumerate() {
            check_secs("waves.spawn_interval_secs", definition.spawn_interval_secs())?;
            for (entry, spawn) in definition.entries().iter().enumerate() {
                let weight = spawn.declared_weight();
                if !weight.is_finite() || weight < 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        wave: wave + 1,
                        entry,
                        weight,
                    });
                }
            }
        }

        if self.companion_areas == 0 {
            return Err(ConfigError::NoCompanionAreas);
        }
        Ok(())
    }

    /// Definition governing the provided one-based wave.
    ///
    /// Waves past the configured list reuse the final definition; an empty
    /// list yields a definition without spawn entries.
    #[must_use]
    pub fn wave(&self, wave: u32) -> WaveDefinition {
        let index = usize::try_from(wave.saturating_sub(1)).unwrap_or(usize::MAX);
        self.waves
            .get(index)
            .or_else(|| self.waves.last())
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn wave_duration(&self) -> Duration {
        secs(self.wave_duration_secs)
    }

    pub(crate) fn wave_intro(&self) -> Duration {
        secs(self.wave_intro_secs)
    }

    pub(crate) fn upgrade_dismiss(&self) -> Duration {
        secs(self.upgrade_dismiss_secs)
    }
}

/// Converts configured seconds into a duration rounded to whole microseconds.
pub(crate) fn secs(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_micros((f64::from(value) * 1e6).round() as u64)
    } else {
        Duration::ZERO
    }
}

fn check_secs(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

fn default_waves() -> Vec<WaveDefinition> {
    vec![
        WaveDefinition::new(
            8,
            Duration::from_millis(1_200),
            vec![SpawnEntry::new(EnemyKind::Invader, 1.0, false)],
        ),
        WaveDefinition::new(
            12,
            Duration::from_millis(1_000),
            vec![
                SpawnEntry::new(EnemyKind::Invader, 2.0, false),
                SpawnEntry::new(EnemyKind::Stepper, 1.0, false),
            ],
        ),
        WaveDefinition::new(
            16,
            Duration::from_millis(800),
            vec![
                SpawnEntry::new(EnemyKind::Invader, 2.0, false),
                SpawnEntry::new(EnemyKind::Stepper, 2.0, false),
                SpawnEntry::new(EnemyKind::Bomber, 1.0, true),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GameConfig};
    use retro_hunter_core::UpgradeKind;

    #[test]
    fn defaults_match_shipped_tuning() {
        let config = GameConfig::default();
        assert!((config.wave_duration_secs - 60.0).abs() < f32::EPSILON);
        assert!((config.combo.fill_per_hit - 0.25).abs() < f32::EPSILON);
        assert!((config.combo.drain_rate - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.initial_companions, 20);
        assert_eq!(config.upgrade_pool.len(), UpgradeKind::COUNT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 42
            wave_duration_secs = 30.0

            [combo]
            drain_rate = 0.2
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 42);
        assert!((config.combo.drain_rate - 0.2).abs() < f32::EPSILON);
        assert!((config.combo.fill_per_hit - 0.25).abs() < f32::EPSILON);
        assert_eq!(config.waves.len(), 3);
    }

    #[test]
    fn wave_definitions_parse_from_tables() {
        let config = GameConfig::from_toml_str(
            r#"
            [[waves]]
            max_enemies = 4
            spawn_interval_secs = 0.5
            entries = [
                { enemy = "Invader", weight = 1.0 },
                { enemy = "Bomber", weight = 3.0, assign_target = true },
            ]
            "#,
        )
        .expect("valid config");

        let wave = config.wave(1);
        assert_eq!(wave.max_enemies(), 4);
        assert_eq!(wave.entries().len(), 2);
        assert!(wave.entries()[1].assign_target());
        assert_eq!(config.wave(9), wave, "last wave repeats");
    }

    #[test]
    fn negative_weights_are_rejected() {
        let error = GameConfig::from_toml_str(
            r#"
            [[waves]]
            max_enemies = 4
            spawn_interval_secs = 0.5
            entries = [{ enemy = "Invader", weight = -1.0 }]
            "#,
        )
        .expect_err("negative weight");

        assert!(matches!(
            error,
            ConfigError::InvalidWeight {
                wave: 1,
                entry: 0,
                ..
            }
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = GameConfig::from_toml_str("wave_length = 3.0").expect_err("unknown field");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_companion_areas_are_rejected() {
        let error =
            GameConfig::from_toml_str("companion_areas = 0").expect_err("no companion areas");
        assert!(matches!(error, ConfigError::NoCompanionAreas));
    }

    #[test]
    fn empty_wave_list_yields_empty_definition() {
        let config = GameConfig {
            waves: Vec::new(),
            ..GameConfig::default()
        };
        assert!(config.wave(1).entries().is_empty());
    }
}
