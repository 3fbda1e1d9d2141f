use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::block::BlockKey;
use crate::models::capacity::Region;
use crate::models::week::{NavDirection, WeekId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Med,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Med => "med",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "med" | "medium" => Ok(Priority::Med),
            "low" => Ok(Priority::Low),
            other => Err(format!("unsupported priority: {other}")),
        }
    }
}

/// A single (day, block) recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub date: NaiveDate,
    pub block: BlockKey,
    pub stack_size: u32,
    pub remaining: i64,
    pub min_distance: usize,
    /// Human-readable justification; not used for ranking.
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityResolution {
    pub candidates: Vec<Candidate>,
    pub target_date: Option<NaiveDate>,
    pub needs_week_change: Option<NavDirection>,
}

impl PriorityResolution {
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            target_date: None,
            needs_week_change: None,
        }
    }

    pub fn week_change(direction: NavDirection) -> Self {
        Self {
            needs_week_change: Some(direction),
            ..Self::empty()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "phase", content = "direction")]
pub enum GuardPhase {
    Idle,
    AwaitingWeekChange(NavDirection),
    Resolved,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotFoundReason {
    /// The resolver found nothing and asked for no further navigation.
    NoCandidates,
    /// Another navigation would exceed the per-request cap.
    NavigationCapReached,
    /// A week change pointed back against the last navigation, or a
    /// navigation landed on a week this request had already seen.
    OscillationDetected,
}

impl NotFoundReason {
    pub fn message(self) -> &'static str {
        match self {
            NotFoundReason::NoCandidates => "no slot found",
            NotFoundReason::NavigationCapReached => "no slot found nearby",
            NotFoundReason::OscillationDetected => "no slot found nearby (stopped week oscillation)",
        }
    }
}

/// Per-request search session. Created fresh for every user-triggered request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationState {
    pub request_id: Uuid,
    pub candidates: Vec<Candidate>,
    pub index: usize,
    pub pending_week_change: Option<NavDirection>,
    pub last_nav_direction: Option<NavDirection>,
    pub week_nav_count: u8,
    /// Weeks evaluated since the last resolution, in visiting order.
    pub visited_weeks: Vec<WeekId>,
    pub phase: GuardPhase,
}

/// What the caller must do after the guard has seen a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Navigate(NavDirection),
    Resolved,
    NotFound(NotFoundReason),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub city: String,
    pub priority: Priority,
    #[serde(default)]
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Found {
        state: RecommendationState,
        target_date: Option<NaiveDate>,
    },
    NotFound {
        request_id: Uuid,
        reason: NotFoundReason,
        weeks_navigated: u8,
    },
    /// A newer request started while this one was running.
    Superseded { request_id: Uuid },
}
