//! Provider bucket-code tables for lanes and ranks
//!
//! The stats provider keys its payload by small integers. The tables are
//! injected configuration rather than process-wide globals so tests and
//! game-version changes can swap them. Codes with no mapping pass through
//! as opaque raw keys instead of being rejected.

use crate::store::record::{Lane, LaneKey, Rank, RankKey};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CodeTables {
    lanes: HashMap<u32, Lane>,
    ranks: HashMap<u32, Rank>,
}

impl CodeTables {
    pub fn new(lanes: HashMap<u32, Lane>, ranks: HashMap<u32, Rank>) -> Self {
        Self { lanes, ranks }
    }

    /// The provider's current Wild Rift bucket numbering
    pub fn wild_rift() -> Self {
        let lanes = HashMap::from([
            (1, Lane::Mid),
            (2, Lane::Top),
            (3, Lane::Adc),
            (4, Lane::Sup),
            (5, Lane::Jg),
        ]);
        let ranks = HashMap::from([
            (0, Rank::Emerald),
            (1, Rank::Diamond),
            (2, Rank::Master),
            (3, Rank::Challenger),
            (4, Rank::Legendary),
        ]);
        Self::new(lanes, ranks)
    }

    pub fn lane(&self, code: u32) -> LaneKey {
        match self.lanes.get(&code) {
            Some(lane) => LaneKey::Known(*lane),
            None => LaneKey::Raw(code),
        }
    }

    pub fn rank(&self, code: u32) -> RankKey {
        match self.ranks.get(&code) {
            Some(rank) => RankKey::Known(*rank),
            None => RankKey::Raw(code),
        }
    }
}
