use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::AppResult;
use crate::models::appointment::Appointment;
use crate::models::capacity::{CapacityGrid, Region};
use crate::models::week::{NavDirection, WeekId, WeekWindow};

/// Supplies the calendar events for a visible week.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self, week: &WeekId) -> AppResult<Vec<Appointment>>;
}

/// Supplies the capacity grid of one concrete region for a week.
#[async_trait::async_trait]
pub trait CapacitySource: Send + Sync {
    async fn fetch_capacity_grid(
        &self,
        region: Region,
        week: &WeekId,
    ) -> AppResult<Option<CapacityGrid>>;
}

/// Drives the paginated calendar view.
#[async_trait::async_trait]
pub trait CalendarNavigator: Send + Sync {
    async fn current_week(&self) -> AppResult<WeekWindow>;

    /// Moves one week and resolves once the new week is visible.
    async fn navigate(&self, direction: NavDirection) -> AppResult<()>;
}

/// Maps an event to its city. Must be pure.
pub trait CityClassifier: Send + Sync {
    fn city_of(&self, event: &Appointment) -> Option<String>;
}

/// Keeps whatever city the event source already attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreassignedCity;

impl CityClassifier for PreassignedCity {
    fn city_of(&self, event: &Appointment) -> Option<String> {
        event.city.clone()
    }
}

impl<F> CityClassifier for F
where
    F: Fn(&Appointment) -> Option<String> + Send + Sync,
{
    fn city_of(&self, event: &Appointment) -> Option<String> {
        self(event)
    }
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
