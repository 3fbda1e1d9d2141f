use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::block::BlockKey;

/// Booked/remaining counts for one day in one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub booked_total: u32,
    /// Sum of configured capacities only.
    pub capacity_total: u32,
    /// Sum of positive remainders.
    pub net_available: u32,
    /// Sum of the magnitudes of negative remainders.
    pub day_over: u32,
    pub per_block_booked: BTreeMap<BlockKey, u32>,
    /// `None` when the block has no configured capacity.
    pub per_block_remaining: BTreeMap<BlockKey, Option<i64>>,
}

impl DailyTotals {
    pub fn remaining(&self, key: BlockKey) -> Option<i64> {
        self.per_block_remaining.get(&key).copied().flatten()
    }

    pub fn booked(&self, key: BlockKey) -> u32 {
        self.per_block_booked.get(&key).copied().unwrap_or(0)
    }

    pub fn has_open_block(&self) -> bool {
        BlockKey::ALL
            .iter()
            .any(|key| self.remaining(*key).map(|r| r > 0).unwrap_or(false))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CityBlockCount {
    pub total: u32,
    pub per_block: BTreeMap<BlockKey, u32>,
}

/// City label -> occupancy counts for one day. Keys iterate in a stable order.
pub type CityTally = BTreeMap<String, CityBlockCount>;

/// Everything needed to render one day of the visible week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub totals: DailyTotals,
    pub city_tally: CityTally,
    /// City labels by total desc, then name asc.
    pub ranked_cities: Vec<String>,
}
