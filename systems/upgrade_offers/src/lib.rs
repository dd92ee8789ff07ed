#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that draws the upgrades offered in each upgrade round.
//!
//! Offers are drawn without replacement from the configured pool after
//! removing every upgrade offered in the previous round, so two consecutive
//! rounds never show the same set.

use retro_hunter_core::{Command, Event, SeededRandom, UnitRandom, UpgradeKind};

/// Configuration parameters required to construct the upgrade offer system.
#[derive(Clone, Debug)]
pub struct Config {
    pool: Vec<UpgradeKind>,
    offer_count: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration. Duplicate pool entries are collapsed.
    #[must_use]
    pub fn new(pool: Vec<UpgradeKind>, offer_count: usize, rng_seed: u64) -> Self {
        let mut unique = Vec::with_capacity(pool.len());
        for kind in pool {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Self {
            pool: unique,
            offer_count,
            rng_seed,
        }
    }
}

/// Draws upgrade offers in response to upgrade round requests.
#[derive(Debug)]
pub struct UpgradeOffers {
    pool: Vec<UpgradeKind>,
    offer_count: usize,
    last_round: Vec<UpgradeKind>,
    random: SeededRandom,
}

impl UpgradeOffers {
    /// Creates a new offer system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            pool: config.pool,
            offer_count: config.offer_count,
            last_round: Vec::new(),
            random: SeededRandom::from_seed(config.rng_seed),
        }
    }

    /// Upgrades offered in the most recent round.
    #[must_use]
    pub fn last_round(&self) -> &[UpgradeKind] {
        &self.last_round
    }

    /// Draws the next offer and remembers it for the following exclusion.
    pub fn draw(&mut self) -> Vec<UpgradeKind> {
        let mut candidates: Vec<UpgradeKind> = self
            .pool
            .iter()
            .copied()
            .filter(|kind| !self.last_round.contains(kind))
            .collect();

        let mut offer = Vec::with_capacity(self.offer_count.min(candidates.len()));
        while offer.len() < self.offer_count && !candidates.is_empty() {
            let index = self.random.next_index(candidates.len()) % candidates.len();
            offer.push(candidates.swap_remove(index));
        }

        if offer.is_empty() {
            tracing::debug!(pool = self.pool.len(), "no upgrades left to offer");
        }
        self.last_round.clone_from(&offer);
        offer
    }

    /// Consumes world events and emits offer commands for requested rounds.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunStarted => self.last_round.clear(),
                Event::UpgradeRoundRequested { .. } => {
                    let choices = self.draw();
                    out.push(Command::PresentUpgradeOffer { choices });
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_collapses_duplicate_pool_entries() {
        let config = Config::new(
            vec![
                UpgradeKind::MaxAmmo,
                UpgradeKind::MaxAmmo,
                UpgradeKind::WaveTime,
            ],
            3,
            1,
        );
        assert_eq!(config.pool, vec![UpgradeKind::MaxAmmo, UpgradeKind::WaveTime]);
    }

    #[test]
    fn draws_without_replacement() {
        let mut offers = UpgradeOffers::new(Config::new(UpgradeKind::ALL.to_vec(), 3, 9));
        for _ in 0..100 {
            let mut offer = offers.draw();
            assert_eq!(offer.len(), 3);
            offer.sort();
            offer.dedup();
            assert_eq!(offer.len(), 3);
        }
    }
}
