//! Companion population counter; reaching zero ends the run.

#[derive(Clone, Debug)]
pub(crate) struct Population {
    alive: u32,
}

impl Population {
    pub(crate) fn new(initial: u32) -> Self {
        Self { alive: initial }
    }

    pub(crate) fn alive(&self) -> u32 {
        self.alive
    }

    /// Removes one companion; returns `true` when none remain.
    pub(crate) fn lose_one(&mut self) -> bool {
        self.alive = self.alive.saturating_sub(1);
        self.alive == 0
    }

    pub(crate) fn gain_one(&mut self) {
        self.alive = self.alive.saturating_add(1);
    }
}
