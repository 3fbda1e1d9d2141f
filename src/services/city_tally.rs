use chrono::NaiveDate;

use crate::models::appointment::{Appointment, UNCATEGORIZED};
use crate::models::totals::{CityBlockCount, CityTally};
use crate::services::schedule_utils;

/// Counts block occupancies per city for one day, using the same 15-minute rule
/// as the capacity totals.
pub fn build_city_tally(date: NaiveDate, events_of_day: &[&Appointment]) -> CityTally {
    let blocks = schedule_utils::blocks_for_day(date);
    let mut tally = CityTally::new();

    for event in events_of_day {
        let city = event.city_label().unwrap_or(UNCATEGORIZED).to_string();
        for block in blocks
            .iter()
            .filter(|block| schedule_utils::occupies(event.start, event.end, block))
        {
            let entry: &mut CityBlockCount = tally.entry(city.clone()).or_default();
            *entry.per_block.entry(block.key).or_insert(0) += 1;
            entry.total += 1;
        }
    }

    tally
}

/// Presentation order: busiest city first, ties alphabetical.
pub fn ranked_cities(tally: &CityTally) -> Vec<String> {
    let mut ranked: Vec<(&String, u32)> = tally.iter().map(|(city, c)| (city, c.total)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(city, _)| city.clone()).collect()
}
