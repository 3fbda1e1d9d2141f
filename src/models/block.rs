use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One of the four fixed daily appointment windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKey {
    B1,
    B2,
    B3,
    B4,
}

impl BlockKey {
    pub const ALL: [BlockKey; 4] = [BlockKey::B1, BlockKey::B2, BlockKey::B3, BlockKey::B4];

    /// Position within the day, B1=0 .. B4=3.
    pub fn index(self) -> usize {
        match self {
            BlockKey::B1 => 0,
            BlockKey::B2 => 1,
            BlockKey::B3 => 2,
            BlockKey::B4 => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKey::B1 => "B1",
            BlockKey::B2 => "B2",
            BlockKey::B3 => "B3",
            BlockKey::B4 => "B4",
        }
    }

    /// Wall-clock window as (start hour, start minute, end hour, end minute).
    pub(crate) fn window(self) -> (u32, u32, u32, u32) {
        match self {
            BlockKey::B1 => (7, 30, 9, 0),
            BlockKey::B2 => (10, 0, 12, 0),
            BlockKey::B3 => (13, 0, 15, 0),
            BlockKey::B4 => (16, 0, 18, 0),
        }
    }

    pub fn start_time(self) -> NaiveTime {
        let (hour, minute, _, _) = self.window();
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn end_time(self) -> NaiveTime {
        let (_, _, hour, minute) = self.window();
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn label(self) -> String {
        format!(
            "{} {}-{}",
            self.as_str(),
            self.start_time().format("%H:%M"),
            self.end_time().format("%H:%M")
        )
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BlockKey {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "B1" => Ok(BlockKey::B1),
            "B2" => Ok(BlockKey::B2),
            "B3" => Ok(BlockKey::B3),
            "B4" => Ok(BlockKey::B4),
            other => Err(format!("unsupported block key: {other}")),
        }
    }
}

/// A block anchored to a concrete calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub key: BlockKey,
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
