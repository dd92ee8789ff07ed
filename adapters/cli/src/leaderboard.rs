//! In-memory leaderboard used when no online service is configured.

use retro_hunter_core::{Leaderboard, LeaderboardError};

/// Keeps submitted scores sorted from best to worst.
#[derive(Debug, Default)]
pub(crate) struct OfflineLeaderboard {
    scores: Vec<u64>,
}

impl OfflineLeaderboard {
    pub(crate) fn with_scores(mut scores: Vec<u64>) -> Self {
        scores.sort_unstable_by(|a, b| b.cmp(a));
        Self { scores }
    }
}

impl Leaderboard for OfflineLeaderboard {
    fn submit(&mut self, score: u64) -> Result<u32, LeaderboardError> {
        if score == 0 {
            return Err(LeaderboardError::Rejected("empty runs are not recorded".into()));
        }
        let position = self.scores.partition_point(|&existing| existing >= score);
        self.scores.insert(position, score);
        u32::try_from(position + 1)
            .map_err(|_| LeaderboardError::Unavailable("leaderboard is full".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retro_hunter_core::RankTier;

    #[test]
    fn ties_rank_below_existing_scores() {
        let mut board = OfflineLeaderboard::with_scores(vec![100, 300, 200]);
        assert_eq!(board.submit(200).ok(), Some(3));
        assert_eq!(board.submit(1_000).ok(), Some(1));
        assert_eq!(board.submit(1).ok(), Some(6));
    }

    #[test]
    fn zero_scores_are_rejected() {
        let mut board = OfflineLeaderboard::default();
        let outcome = board.submit(0);
        assert!(matches!(outcome, Err(LeaderboardError::Rejected(_))));
        assert_eq!(RankTier::from_submission(&outcome), RankTier::Unranked);
    }
}
