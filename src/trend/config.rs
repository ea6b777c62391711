//! Thresholds and rank weights for the trend-diff engine

use crate::store::record::{Rank, RankKey};
use std::collections::HashMap;
use std::env;

/// Significance thresholds and rank-weight table, injected into the
/// diff engine so tests and game-version changes can vary them.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Minimum |winrate delta| in percentage points
    pub win_threshold: f64,

    /// Minimum |pickrate delta| / |banrate delta| in percentage points
    pub general_threshold: f64,

    /// Score weight per rank; higher brackets are more diagnostic of
    /// balance than lower ones. Unlisted ranks weigh 1.
    pub rank_weights: HashMap<Rank, f64>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            win_threshold: 2.0,
            general_threshold: 3.0,
            rank_weights: HashMap::from([
                (Rank::Master, 8.0),
                (Rank::Diamond, 6.0),
                (Rank::Challenger, 3.0),
                (Rank::Legendary, 1.0),
                (Rank::Emerald, 1.0),
            ]),
        }
    }
}

impl DiffConfig {
    /// Defaults with threshold overrides from the environment
    ///
    /// Environment variables:
    /// - `RIFTPULSE_WIN_THRESHOLD` (default: 2.0)
    /// - `RIFTPULSE_GENERAL_THRESHOLD` (default: 3.0)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env::var("RIFTPULSE_WIN_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.win_threshold = v;
        }
        if let Some(v) = env::var("RIFTPULSE_GENERAL_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.general_threshold = v;
        }
        config
    }

    /// Weight for a rank key; unknown and raw ranks default to 1
    pub fn weight(&self, rank: RankKey) -> f64 {
        match rank {
            RankKey::Known(rank) => self.rank_weights.get(&rank).copied().unwrap_or(1.0),
            RankKey::Raw(_) => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let config = DiffConfig::default();
        assert_eq!(config.weight(RankKey::Known(Rank::Master)), 8.0);
        assert_eq!(config.weight(RankKey::Known(Rank::Diamond)), 6.0);
        assert_eq!(config.weight(RankKey::Known(Rank::Challenger)), 3.0);
        assert_eq!(config.weight(RankKey::Known(Rank::Legendary)), 1.0);
        assert_eq!(config.weight(RankKey::Known(Rank::Emerald)), 1.0);
        assert_eq!(config.weight(RankKey::Raw(7)), 1.0);
    }

    #[test]
    fn test_env_threshold_overrides() {
        env::set_var("RIFTPULSE_WIN_THRESHOLD", "1.5");
        env::set_var("RIFTPULSE_GENERAL_THRESHOLD", "4.0");

        let config = DiffConfig::from_env();
        assert_eq!(config.win_threshold, 1.5);
        assert_eq!(config.general_threshold, 4.0);

        env::remove_var("RIFTPULSE_WIN_THRESHOLD");
        env::remove_var("RIFTPULSE_GENERAL_THRESHOLD");
    }
}
