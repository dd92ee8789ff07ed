//! Report printed at the end of a simulated session.

use std::fmt;

use retro_hunter_core::{Phase, RankTier, UpgradeKind};
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub(crate) struct Summary {
    pub(crate) seed: u64,
    pub(crate) simulated_secs: f32,
    pub(crate) final_phase: Option<Phase>,
    pub(crate) wave: u32,
    pub(crate) score: u64,
    pub(crate) best_multiplier: f32,
    pub(crate) companions_alive: u32,
    pub(crate) shots_fired: u32,
    pub(crate) free_shots: u32,
    pub(crate) kills: u32,
    pub(crate) ricochet_kills: u32,
    pub(crate) escapes: u32,
    pub(crate) detonations: u32,
    pub(crate) rank_ups: u32,
    pub(crate) upgrades: Vec<UpgradeKind>,
    pub(crate) events: usize,
    pub(crate) leaderboard_rank: Option<u32>,
    pub(crate) rank_tier: Option<RankTier>,
}

impl Summary {
    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed            {:#x}", self.seed)?;
        writeln!(f, "simulated       {:.1}s", self.simulated_secs)?;
        if let Some(phase) = self.final_phase {
            writeln!(f, "final phase     {phase:?}")?;
        }
        writeln!(f, "wave reached    {}", self.wave)?;
        writeln!(f, "score           {}", self.score)?;
        writeln!(f, "best combo      x{:.0}", self.best_multiplier)?;
        writeln!(f, "companions      {}", self.companions_alive)?;
        writeln!(
            f,
            "shots           {} ({} free)",
            self.shots_fired, self.free_shots
        )?;
        writeln!(
            f,
            "kills           {} ({} by ricochet)",
            self.kills, self.ricochet_kills
        )?;
        writeln!(f, "escapes         {}", self.escapes)?;
        writeln!(f, "detonations     {}", self.detonations)?;
        writeln!(f, "rank ups        {}", self.rank_ups)?;
        let upgrades: Vec<&str> = self.upgrades.iter().map(|kind| kind.label()).collect();
        writeln!(f, "upgrades        [{}]", upgrades.join(", "))?;
        writeln!(f, "events          {}", self.events)?;
        match (self.leaderboard_rank, self.rank_tier) {
            (Some(rank), Some(tier)) => write!(f, "leaderboard     #{rank} ({tier:?})"),
            (None, Some(tier)) => write!(f, "leaderboard     {tier:?}"),
            _ => write!(f, "leaderboard     not submitted"),
        }
    }
}
