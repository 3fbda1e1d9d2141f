use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// City label used for events whose city could not be determined.
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

/// A calendar event supplied by the event collaborator, in local wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Attached by a `CityClassifier`; never derived here.
    #[serde(default)]
    pub city: Option<String>,
}

impl Appointment {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, title: impl Into<String>) -> Self {
        Self {
            start,
            end,
            title: title.into(),
            address: None,
            notes: None,
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// The detected city, or `None` for the uncategorized state.
    pub fn city_label(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }

    pub fn matches_city(&self, city: &str) -> bool {
        self.city_label()
            .map(|label| label.to_lowercase() == city.trim().to_lowercase())
            .unwrap_or(false)
    }
}

/// Events whose start falls on `day`.
pub fn events_on(events: &[Appointment], day: NaiveDate) -> Vec<&Appointment> {
    events.iter().filter(|event| event.day() == day).collect()
}
