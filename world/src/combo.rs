//! Combo meter that fills with hits and drains passively over time.

use std::time::Duration;

use retro_hunter_core::{CameraShake, Event, SoundCue};

use crate::config::ComboConfig;

const SHAKE_DURATION: Duration = Duration::from_millis(250);
const SHAKE_BASE_INTENSITY: f32 = 0.3;
const SHAKE_INTENSITY_PER_MULTIPLIER: f32 = 0.1;

/// Fill, drain, and multiplier bookkeeping.
///
/// The multiplier is stored as an integer so it can only ever take the values
/// 1, 2, 3, ...; it is exposed as `f32` because every consumer multiplies with
/// it.
#[derive(Clone, Debug)]
pub(crate) struct ComboTracker {
    fill: f32,
    multiplier: u32,
    fill_per_hit: f32,
    drain_rate: f32,
    carry: f32,
}

impl ComboTracker {
    pub(crate) fn new(config: &ComboConfig) -> Self {
        Self {
            fill: 0.0,
            multiplier: 1,
            fill_per_hit: config.fill_per_hit,
            drain_rate: config.drain_rate,
            carry: config.carry,
        }
    }

    pub(crate) fn fill(&self) -> f32 {
        self.fill
    }

    pub(crate) fn multiplier(&self) -> f32 {
        self.multiplier as f32
    }

    /// Adds one hit worth of fill, rolling over into the next multiplier at 1.
    pub(crate) fn register_hit(&mut self, fill_bonus: f32, out: &mut Vec<Event>) {
        self.fill += self.fill_per_hit + fill_bonus;
        if self.fill >= 1.0 {
            self.roll_over(out);
        }
        self.publish(out);
    }

    /// Drains the meter for one simulation step.
    pub(crate) fn tick(&mut self, dt: Duration, drain_mult: f32, out: &mut Vec<Event>) {
        if self.multiplier <= 1 && self.fill <= 0.0 {
            return;
        }

        let drain = self.drain_rate * self.multiplier() * drain_mult * dt.as_secs_f32();
        self.fill -= drain;

        if self.fill <= 0.0 {
            self.fill = 0.0;
            self.break_combo(out);
        } else if self.fill >= 1.0 {
            self.roll_over(out);
        }
        self.publish(out);
    }

    /// Clears the meter entirely, as happens when a wave times out.
    pub(crate) fn reset(&mut self, out: &mut Vec<Event>) {
        self.fill = 0.0;
        self.break_combo(out);
        self.publish(out);
    }

    fn roll_over(&mut self, out: &mut Vec<Event>) {
        self.multiplier = self.multiplier.saturating_add(1);
        self.fill = self.carry;
        let multiplier = self.multiplier();
        out.push(Event::ComboIncreased {
            multiplier,
            shake: CameraShake {
                duration: SHAKE_DURATION,
                intensity: SHAKE_BASE_INTENSITY + multiplier * SHAKE_INTENSITY_PER_MULTIPLIER,
            },
        });
        out.push(Event::Cue {
            cue: SoundCue::MultiplierUp,
        });
    }

    fn break_combo(&mut self, out: &mut Vec<Event>) {
        if self.multiplier > 1 {
            out.push(Event::ComboBroken {
                previous: self.multiplier(),
            });
            out.push(Event::Cue {
                cue: SoundCue::MultiplierFail,
            });
        }
        self.multiplier = 1;
    }

    fn publish(&self, out: &mut Vec<Event>) {
        out.push(Event::ComboChanged {
            fill: self.fill,
            multiplier: self.multiplier(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retro_hunter_core::{SeededRandom, UnitRandom};

    fn tracker() -> ComboTracker {
        ComboTracker::new(&ComboConfig::default())
    }

    #[test]
    fn fourth_hit_rolls_over_into_next_multiplier() {
        let mut combo = tracker();
        let mut events = Vec::new();
        for _ in 0..3 {
            combo.register_hit(0.0, &mut events);
        }
        assert!((combo.fill() - 0.75).abs() < 1e-6);
        assert!((combo.multiplier() - 1.0).abs() < f32::EPSILON);

        events.clear();
        combo.register_hit(0.0, &mut events);
        assert!((combo.fill() - 0.5).abs() < 1e-6);
        assert!((combo.multiplier() - 2.0).abs() < f32::EPSILON);
        match events.first() {
            Some(Event::ComboIncreased { multiplier, shake }) => {
                assert!((multiplier - 2.0).abs() < f32::EPSILON);
                assert!((shake.intensity - 0.5).abs() < 1e-6);
                assert_eq!(shake.duration, SHAKE_DURATION);
            }
            other => panic!("expected combo increase, got {other:?}"),
        }
    }

    #[test]
    fn fill_bonus_adds_to_every_hit() {
        let mut combo = tracker();
        let mut events = Vec::new();
        combo.register_hit(0.05, &mut events);
        assert!((combo.fill() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn idle_meter_does_not_drain_or_publish() {
        let mut combo = tracker();
        let mut events = Vec::new();
        combo.tick(Duration::from_secs(1), 1.0, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn drain_reaches_zero_within_expected_time() {
        let mut combo = tracker();
        let mut events = Vec::new();
        combo.register_hit(0.0, &mut events);
        combo.register_hit(0.0, &mut events);

        // 0.5 fill at 0.1 per second drains in five seconds.
        let dt = Duration::from_millis(100);
        for _ in 0..45 {
            combo.tick(dt, 1.0, &mut events);
        }
        assert!(combo.fill() > 0.0);

        for _ in 0..6 {
            combo.tick(dt, 1.0, &mut events);
        }
        assert_eq!(combo.fill(), 0.0);
        assert!((combo.multiplier() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn drain_scales_with_multiplier_and_upgrade() {
        let mut combo = tracker();
        let mut events = Vec::new();
        for _ in 0..4 {
            combo.register_hit(0.0, &mut events);
        }
        assert!((combo.multiplier() - 2.0).abs() < f32::EPSILON);

        combo.tick(Duration::from_secs(1), 0.5, &mut events);
        // 0.5 - 0.1 * 2 * 0.5
        assert!((combo.fill() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn draining_above_base_multiplier_breaks_combo() {
        let mut combo = tracker();
        let mut events = Vec::new();
        for _ in 0..4 {
            combo.register_hit(0.0, &mut events);
        }
        events.clear();

        combo.tick(Duration::from_secs(10), 1.0, &mut events);
        assert_eq!(combo.fill(), 0.0);
        assert!((combo.multiplier() - 1.0).abs() < f32::EPSILON);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ComboBroken { previous } if (*previous - 2.0).abs() < f32::EPSILON)));
    }

    #[test]
    fn reset_at_base_multiplier_is_silent() {
        let mut combo = tracker();
        let mut events = Vec::new();
        combo.register_hit(0.0, &mut events);
        events.clear();
        combo.reset(&mut events);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::ComboBroken { .. })));
        assert_eq!(combo.fill(), 0.0);
    }

    #[test]
    fn random_hit_and_tick_sequences_keep_invariants() {
        let mut random = SeededRandom::from_seed(0xc0ffee);
        let mut combo = tracker();
        let mut events = Vec::new();
        let mut previous = combo.multiplier();

        for _ in 0..10_000 {
            if random.next_unit() < 0.35 {
                combo.register_hit(random.next_unit() * 0.2, &mut events);
            } else {
                let millis = 1 + random.next_index(100) as u64;
                combo.tick(Duration::from_millis(millis), 1.0, &mut events);
            }

            let fill = combo.fill();
            let multiplier = combo.multiplier();
            assert!((0.0..=1.0).contains(&fill), "fill escaped [0,1]: {fill}");
            assert!(multiplier >= 1.0);
            assert_eq!(multiplier.fract(), 0.0);
            assert!(
                multiplier == previous || multiplier == previous + 1.0 || multiplier == 1.0,
                "multiplier jumped from {previous} to {multiplier}"
            );
            previous = multiplier;
        }
    }
}
