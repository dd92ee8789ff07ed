//! Phase-owned queue of deferred effects.
//!
//! Every entry belongs to the phase that scheduled it. Entries only count down
//! while their owner is the active phase and are dropped when the world leaves
//! that phase, so an effect can never fire into a state it was not meant for.

use std::time::Duration;

use retro_hunter_core::Phase;

/// Effect executed by the world once its timer expires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Deferred {
    BeginPlay,
    NextUpgradeRound,
    ShotReady,
    ReloadComplete,
    Ricochet,
}

/// Handle identifying one scheduled effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Timer {
    handle: TimerHandle,
    owner: Phase,
    remaining: Duration,
    effect: Deferred,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TimerQueue {
    timers: Vec<Timer>,
    next_handle: u64,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, owner: Phase, delay: Duration, effect: Deferred) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.timers.push(Timer {
            handle,
            owner,
            remaining: delay,
            effect,
        });
        handle
    }

    /// Cancels one effect; returns whether it was still pending.
    pub(crate) fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.handle != handle);
        self.timers.len() != before
    }

    pub(crate) fn cancel_owned_by(&mut self, owner: Phase) {
        self.timers.retain(|timer| timer.owner != owner);
    }

    pub(crate) fn clear(&mut self) {
        self.timers.clear();
    }

    pub(crate) fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|timer| timer.handle == handle)
    }

    /// Counts down every effect owned by `active` and returns the expired ones,
    /// earliest deadline first with ties broken by scheduling order.
    pub(crate) fn advance(&mut self, active: Phase, dt: Duration) -> Vec<(TimerHandle, Deferred)> {
        let mut expired: Vec<(Duration, TimerHandle, Deferred)> = Vec::new();
        self.timers.retain_mut(|timer| {
            if timer.owner != active {
                return true;
            }
            if timer.remaining <= dt {
                expired.push((timer.remaining, timer.handle, timer.effect));
                false
            } else {
                timer.remaining -= dt;
                true
            }
        });
        expired.sort_by_key(|(remaining, handle, _)| (*remaining, *handle));
        expired
            .into_iter()
            .map(|(_, handle, effect)| (handle, effect))
            .collect()
    }
}
