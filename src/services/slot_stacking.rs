use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::appointment::{events_on, Appointment};
use crate::models::block::BlockKey;
use crate::models::capacity::{Region, RegionalCapacity};
use crate::models::recommendation::Candidate;
use crate::services::{capacity_service, schedule_utils};

/// A day already holding this many jobs for the city cannot take another.
pub const MAX_STACK_SIZE: u32 = 4;

/// Finds at most one candidate block per eligible visible day, ordered by
/// descending stack size and then ascending date. Days before `today + 1` are
/// never considered.
pub fn find_best_slot_stacking(
    city: &str,
    visible_days: &[NaiveDate],
    all_events: &[Appointment],
    capacity: Option<&RegionalCapacity>,
    region: Region,
    today: NaiveDate,
) -> AppResult<Vec<Candidate>> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AppError::validation("target city must not be empty"));
    }

    let tomorrow = today + Duration::days(1);
    let mut candidates = Vec::new();

    for &day in visible_days.iter().filter(|day| **day >= tomorrow) {
        let events = events_on(all_events, day);
        let totals = capacity_service::compute_daily_totals(day, &events, capacity, region)?;
        if totals.net_available == 0 && !totals.has_open_block() {
            continue;
        }

        let city_events: Vec<&&Appointment> =
            events.iter().filter(|event| event.matches_city(city)).collect();
        let stack_size = city_events.len() as u32;
        if stack_size >= MAX_STACK_SIZE {
            continue;
        }

        let used: BTreeSet<BlockKey> = city_events
            .iter()
            .flat_map(|event| schedule_utils::occupied_blocks(day, event.start, event.end))
            .collect();

        let mut options: Vec<(BlockKey, usize, i64)> = BlockKey::ALL
            .iter()
            .filter(|key| !used.contains(key))
            .filter_map(|key| {
                let remaining = totals.remaining(*key).filter(|r| *r > 0)?;
                Some((*key, min_distance(*key, &used, stack_size), remaining))
            })
            .collect();

        options.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| a.0.index().cmp(&b.0.index()))
        });

        if let Some(&(block, distance, remaining)) = options.first() {
            candidates.push(Candidate {
                date: day,
                block,
                stack_size,
                remaining,
                min_distance: distance,
                reason: describe_choice(city, block, &used, stack_size),
            });
        }
    }

    candidates.sort_by(|a, b| match b.stack_size.cmp(&a.stack_size) {
        Ordering::Equal => a.date.cmp(&b.date),
        other => other,
    });

    debug!(
        target: "app::stacking",
        city,
        %region,
        candidates = candidates.len(),
        "slot stacking search finished"
    );

    Ok(candidates)
}

fn min_distance(block: BlockKey, used: &BTreeSet<BlockKey>, stack_size: u32) -> usize {
    if stack_size == 0 {
        return 0;
    }
    used.iter()
        .map(|other| block.index().abs_diff(other.index()))
        .min()
        .unwrap_or(0)
}

fn describe_choice(city: &str, block: BlockKey, used: &BTreeSet<BlockKey>, stack_size: u32) -> String {
    let jobs = if stack_size == 1 { "job" } else { "jobs" };
    let (first, last) = match (used.first(), used.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ if stack_size == 0 => return format!("No {city} jobs yet; start a new stack in {block}"),
        _ => {
            return format!(
                "{stack_size} {city} {jobs} already booked outside the fixed blocks; start a new stack in {block}"
            )
        }
    };
    let cluster = used
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    if block < first {
        format!("{block} precedes {stack_size} {city} {jobs} in {cluster}")
    } else if block > last {
        format!("{block} follows {stack_size} {city} {jobs} in {cluster}")
    } else {
        format!("{block} is surrounded by {stack_size} {city} {jobs} in {cluster}")
    }
}
