use chrono::NaiveDate;

use crate::error::AppResult;
use crate::models::appointment::{events_on, Appointment};
use crate::models::capacity::{Region, RegionalCapacity};
use crate::models::totals::DaySummary;
use crate::models::week::WeekSnapshot;
use crate::services::{capacity_service, city_tally};

pub fn summarize_day(
    date: NaiveDate,
    events: &[Appointment],
    capacity: Option<&RegionalCapacity>,
    region: Region,
) -> AppResult<DaySummary> {
    let day_events = events_on(events, date);
    let totals = capacity_service::compute_daily_totals(date, &day_events, capacity, region)?;
    let tally = city_tally::build_city_tally(date, &day_events);
    let ranked_cities = city_tally::ranked_cities(&tally);
    Ok(DaySummary {
        date,
        totals,
        city_tally: tally,
        ranked_cities,
    })
}

/// One summary per visible day, in calendar order.
pub fn summarize_snapshot(snapshot: &WeekSnapshot) -> AppResult<Vec<DaySummary>> {
    snapshot
        .week
        .days
        .iter()
        .map(|day| {
            summarize_day(
                *day,
                &snapshot.events,
                snapshot.capacity.as_ref(),
                snapshot.region,
            )
        })
        .collect()
}
