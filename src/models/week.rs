use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::appointment::Appointment;
use crate::models::capacity::{Region, RegionalCapacity};

/// Opaque identifier the calendar collaborator uses for a visible week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct WeekId(pub String);

impl WeekId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Next,
    Prev,
}

impl NavDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            NavDirection::Next => "next",
            NavDirection::Prev => "prev",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            NavDirection::Next => NavDirection::Prev,
            NavDirection::Prev => NavDirection::Next,
        }
    }
}

impl fmt::Display for NavDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The seven consecutive dates currently shown by the calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    pub id: WeekId,
    pub days: [NaiveDate; 7],
}

impl WeekWindow {
    pub fn new(id: WeekId, days: [NaiveDate; 7]) -> AppResult<Self> {
        for pair in days.windows(2) {
            if pair[1] - pair[0] != Duration::days(1) {
                return Err(AppError::validation(format!(
                    "visible week {id} is not seven consecutive dates ({} then {})",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { id, days })
    }

    /// Builds the window starting at `first_day`.
    pub fn starting(id: WeekId, first_day: NaiveDate) -> Self {
        let days = std::array::from_fn(|offset| first_day + Duration::days(offset as i64));
        Self { id, days }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days[6]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }
}

/// Events and capacity fetched together for one visible week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekSnapshot {
    pub week: WeekWindow,
    pub region: Region,
    pub events: Vec<Appointment>,
    /// `None` when no grid was configured for the requested region.
    pub capacity: Option<RegionalCapacity>,
}
