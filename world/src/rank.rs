//! Hunt rank: kill experience that decides how many upgrade rounds a wave earns.

use retro_hunter_core::{Event, SoundCue, UnitRandom};

const COMBO_EXPERIENCE_FACTOR: f32 = 0.5;

#[derive(Clone, Debug)]
pub(crate) struct HuntRank {
    rank: u32,
    xp: u32,
    xp_to_next: u32,
    base_xp: u32,
}

impl HuntRank {
    pub(crate) fn new(base_xp: u32) -> Self {
        let base_xp = base_xp.max(1);
        Self {
            rank: 1,
            xp: 0,
            xp_to_next: base_xp,
            base_xp,
        }
    }

    pub(crate) fn rank(&self) -> u32 {
        self.rank
    }

    pub(crate) fn xp(&self) -> u32 {
        self.xp
    }

    pub(crate) fn xp_to_next(&self) -> u32 {
        self.xp_to_next
    }

    pub(crate) fn progress(&self) -> f32 {
        self.xp as f32 / self.xp_to_next as f32
    }

    /// Grants `ceil(max(1, combo / 2))` experience, doubled on a successful roll.
    pub(crate) fn grant(
        &mut self,
        combo_multiplier: f32,
        double_chance: f32,
        random: &mut dyn UnitRandom,
        out: &mut Vec<Event>,
    ) {
        let mut raw = (combo_multiplier * COMBO_EXPERIENCE_FACTOR).max(1.0);
        let double = random.next_unit() < double_chance;
        if double {
            raw *= 2.0;
        }
        let gained = raw.ceil() as u32;
        self.xp = self.xp.saturating_add(gained);

        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.rank = self.rank.saturating_add(1);
            self.xp_to_next = self.threshold_for(self.rank);
            out.push(Event::RankIncreased { rank: self.rank });
            out.push(Event::Cue {
                cue: SoundCue::LevelUp,
            });
        }

        out.push(Event::ExperienceGained {
            gained,
            double,
            rank: self.rank,
            progress: self.progress(),
        });
    }

    pub(crate) fn reset(&mut self, out: &mut Vec<Event>) {
        self.rank = 1;
        self.xp = 0;
        self.xp_to_next = self.base_xp;
        out.push(Event::RankReset);
    }

    fn threshold_for(&self, rank: u32) -> u32 {
        let rank = rank as f32;
        let threshold = (self.base_xp as f32 * rank * rank).round();
        if threshold >= u32::MAX as f32 {
            u32::MAX
        } else {
            (threshold as u32).max(1)
        }
    }
}
