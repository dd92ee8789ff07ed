//! Player weapon: magazine, reload, shot cooldown, and ricochet rolls.

use retro_hunter_core::{Event, Phase, ShotTarget, SoundCue, UnitRandom};

use crate::{
    config::{secs, WeaponConfig},
    timers::{Deferred, TimerHandle, TimerQueue},
};

/// What a trigger pull resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TriggerOutcome {
    /// The weapon is reloading or cooling down; nothing happened.
    Blocked,
    /// The magazine was empty.
    Empty,
    /// A round left the barrel.
    Fired,
}

#[derive(Clone, Debug)]
pub(crate) struct Weapon {
    config: WeaponConfig,
    ammo: u32,
    max_ammo: u32,
    reload: Option<TimerHandle>,
    cooldown: Option<TimerHandle>,
}

impl Weapon {
    pub(crate) fn new(config: &WeaponConfig) -> Self {
        Self {
            config: config.clone(),
            ammo: config.max_ammo,
            max_ammo: config.max_ammo,
            reload: None,
            cooldown: None,
        }
    }

    pub(crate) fn ammo(&self) -> u32 {
        self.ammo
    }

    pub(crate) fn max_ammo(&self) -> u32 {
        self.max_ammo
    }

    pub(crate) fn is_reloading(&self, timers: &TimerQueue) -> bool {
        self.reload.is_some_and(|handle| timers.is_pending(handle))
    }

    pub(crate) fn is_cooling_down(&self, timers: &TimerQueue) -> bool {
        self.cooldown.is_some_and(|handle| timers.is_pending(handle))
    }

    /// Pulls the trigger. Consumes a round unless the free-shot roll succeeds.
    pub(crate) fn pull_trigger(
        &mut self,
        target: ShotTarget,
        no_ammo_chance: f32,
        random: &mut dyn UnitRandom,
        timers: &mut TimerQueue,
        out: &mut Vec<Event>,
    ) -> TriggerOutcome {
        if self.is_reloading(timers) || self.is_cooling_down(timers) {
            return TriggerOutcome::Blocked;
        }

        if self.ammo == 0 {
            out.push(Event::AmmoEmpty);
            out.push(Event::Cue {
                cue: SoundCue::PlayerAmmoEmpty,
            });
            return TriggerOutcome::Empty;
        }

        let free = random.next_unit() < no_ammo_chance;
        if !free {
            self.ammo -= 1;
        }
        out.push(Event::ShotFired {
            target,
            ammo_consumed: !free,
        });
        out.push(Event::Cue {
            cue: if free {
                SoundCue::PlayerShootFree
            } else {
                SoundCue::PlayerShoot
            },
        });
        self.publish(out);

        self.cooldown = Some(timers.schedule(
            Phase::Playing,
            secs(self.config.shot_delay_secs),
            Deferred::ShotReady,
        ));
        TriggerOutcome::Fired
    }

    /// Rolls the ricochet chance for an enemy hit and schedules the bounce.
    pub(crate) fn roll_ricochet(
        &self,
        ricochet_chance: f32,
        random: &mut dyn UnitRandom,
        timers: &mut TimerQueue,
    ) -> bool {
        if random.next_unit() >= ricochet_chance {
            return false;
        }
        let _ = timers.schedule(
            Phase::Playing,
            secs(self.config.ricochet_delay_secs),
            Deferred::Ricochet,
        );
        true
    }

    /// Starts a reload when the magazine is not full and no reload is running.
    pub(crate) fn start_reload(
        &mut self,
        reload_speed_mult: f32,
        timers: &mut TimerQueue,
        out: &mut Vec<Event>,
    ) -> bool {
        if self.ammo >= self.max_ammo || self.is_reloading(timers) {
            return false;
        }
        let duration = secs(self.config.reload_secs * reload_speed_mult);
        self.reload = Some(timers.schedule(Phase::Playing, duration, Deferred::ReloadComplete));
        out.push(Event::ReloadStarted { duration });
        out.push(Event::Cue {
            cue: SoundCue::PlayerReload,
        });
        true
    }

    pub(crate) fn finish_reload(&mut self, handle: TimerHandle, out: &mut Vec<Event>) {
        if self.reload == Some(handle) {
            self.reload = None;
            self.ammo = self.max_ammo;
            self.publish(out);
        }
    }

    pub(crate) fn finish_cooldown(&mut self, handle: TimerHandle) {
        if self.cooldown == Some(handle) {
            self.cooldown = None;
        }
    }

    /// Refills the magazine instantly, aborting any running reload.
    pub(crate) fn refill(&mut self, timers: &mut TimerQueue, out: &mut Vec<Event>) {
        if let Some(handle) = self.reload.take() {
            let _ = timers.cancel(handle);
        }
        self.ammo = self.max_ammo;
        self.publish(out);
    }

    /// Sets the capacity to the configured base plus `bonus` and refills.
    pub(crate) fn set_capacity_bonus(&mut self, bonus: u32, timers: &mut TimerQueue, out: &mut Vec<Event>) {
        self.max_ammo = self.config.max_ammo.saturating_add(bonus);
        self.refill(timers, out);
    }

    fn publish(&self, out: &mut Vec<Event>) {
        out.push(Event::AmmoChanged {
            ammo: self.ammo,
            max_ammo: self.max_ammo,
        });
    }
}
