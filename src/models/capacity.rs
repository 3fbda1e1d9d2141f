use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::block::BlockKey;

/// Per-weekday capacities for one block, Monday-first. `None` means no capacity
/// configured, which is distinct from `Some(0)`.
pub type WeekdayCapacities = [Option<u32>; 7];

/// Per-block, per-weekday booking limits for one region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct CapacityGrid {
    blocks: BTreeMap<BlockKey, WeekdayCapacities>,
}

impl CapacityGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, key: BlockKey, capacities: WeekdayCapacities) -> Self {
        self.blocks.insert(key, capacities);
        self
    }

    pub fn set(&mut self, key: BlockKey, capacities: WeekdayCapacities) {
        self.blocks.insert(key, capacities);
    }

    pub fn block(&self, key: BlockKey) -> Option<&WeekdayCapacities> {
        self.blocks.get(&key)
    }

    /// Capacity at a Monday-first grid index.
    pub fn at(&self, key: BlockKey, grid_index: usize) -> Option<u32> {
        self.blocks
            .get(&key)
            .and_then(|row| row.get(grid_index).copied().flatten())
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockKey, &WeekdayCapacities)> {
        self.blocks.iter()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    North,
    Central,
    South,
    /// Elementwise sum of the three concrete regions.
    All,
}

impl Region {
    pub const CONCRETE: [Region; 3] = [Region::North, Region::Central, Region::South];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::North => "north",
            Region::Central => "central",
            Region::South => "south",
            Region::All => "all",
        }
    }

    pub fn is_derived(self) -> bool {
        matches!(self, Region::All)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Region {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "north" => Ok(Region::North),
            "central" => Ok(Region::Central),
            "south" => Ok(Region::South),
            "all" => Ok(Region::All),
            other => Err(format!("unsupported region: {other}")),
        }
    }
}

/// Capacity grids for one week, keyed by region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct RegionalCapacity {
    grids: BTreeMap<Region, CapacityGrid>,
}

impl RegionalCapacity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Region, grid: CapacityGrid) -> Self {
        self.grids.insert(region, grid);
        self
    }

    pub fn insert(&mut self, region: Region, grid: CapacityGrid) {
        self.grids.insert(region, grid);
    }

    pub fn grid(&self, region: Region) -> Option<&CapacityGrid> {
        self.grids.get(&region)
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
