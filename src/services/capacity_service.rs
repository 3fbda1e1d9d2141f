use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::trace;

use crate::error::{AppError, AppResult};
use crate::models::appointment::Appointment;
use crate::models::block::BlockKey;
use crate::models::capacity::{CapacityGrid, Region, RegionalCapacity};
use crate::models::totals::DailyTotals;
use crate::services::schedule_utils;

/// Maps a Sunday-first weekday (0=Sunday..6=Saturday) onto the Monday-first grid index.
pub fn weekday_grid_index(weekday: u32) -> AppResult<usize> {
    if weekday > 6 {
        return Err(AppError::invalid_weekday(weekday));
    }
    Ok(((weekday + 6) % 7) as usize)
}

/// Configured capacity, or `None` when the grid, region or slot is absent.
pub fn get_capacity(
    region: Region,
    weekday: u32,
    block: BlockKey,
    capacity: Option<&RegionalCapacity>,
) -> AppResult<Option<u32>> {
    let index = weekday_grid_index(weekday)?;
    Ok(capacity
        .and_then(|regional| regional.grid(region))
        .and_then(|grid| grid.at(block, index)))
}

pub fn compute_daily_totals(
    date: NaiveDate,
    events_of_day: &[&Appointment],
    capacity: Option<&RegionalCapacity>,
    region: Region,
) -> AppResult<DailyTotals> {
    let weekday = date.weekday().num_days_from_sunday();
    let mut per_block_booked = BTreeMap::new();
    let mut per_block_remaining = BTreeMap::new();
    let mut booked_total = 0u32;
    let mut capacity_total = 0u32;
    let mut net_available = 0u32;
    let mut day_over = 0u32;

    for block in schedule_utils::blocks_for_day(date) {
        let booked = events_of_day
            .iter()
            .filter(|event| schedule_utils::occupies(event.start, event.end, &block))
            .count() as u32;
        booked_total = booked_total.saturating_add(booked);
        per_block_booked.insert(block.key, booked);

        let remaining = match get_capacity(region, weekday, block.key, capacity)? {
            Some(cap) => {
                capacity_total = capacity_total.saturating_add(cap);
                let remaining = i64::from(cap) - i64::from(booked);
                if remaining > 0 {
                    net_available = net_available.saturating_add(remaining as u32);
                } else if remaining < 0 {
                    day_over = day_over.saturating_add(remaining.unsigned_abs() as u32);
                }
                Some(remaining)
            }
            None => None,
        };
        per_block_remaining.insert(block.key, remaining);
    }

    trace!(
        target: "app::capacity",
        %date,
        %region,
        booked_total,
        capacity_total,
        net_available,
        day_over,
        "daily totals computed"
    );

    Ok(DailyTotals {
        date,
        booked_total,
        capacity_total,
        net_available,
        day_over,
        per_block_booked,
        per_block_remaining,
    })
}

/// Elementwise sum. A missing grid acts as all-zero here only; a slot that is
/// unconfigured on both sides stays unconfigured.
pub fn sum_grids(a: Option<&CapacityGrid>, b: Option<&CapacityGrid>) -> Option<CapacityGrid> {
    match (a, b) {
        (None, None) => None,
        (Some(grid), None) | (None, Some(grid)) => Some(grid.clone()),
        (Some(a), Some(b)) => {
            let mut combined = CapacityGrid::new();
            for key in BlockKey::ALL {
                let row = match (a.block(key), b.block(key)) {
                    (None, None) => continue,
                    (Some(row), None) | (None, Some(row)) => *row,
                    (Some(left), Some(right)) => std::array::from_fn(|i| match (left[i], right[i]) {
                        (None, None) => None,
                        (l, r) => Some(l.unwrap_or(0).saturating_add(r.unwrap_or(0))),
                    }),
                };
                combined.set(key, row);
            }
            Some(combined)
        }
    }
}

/// Fills in the `All` grid as the sum of the three concrete regions.
pub fn with_derived_all(mut capacity: RegionalCapacity) -> RegionalCapacity {
    let all = Region::CONCRETE
        .iter()
        .fold(None, |acc: Option<CapacityGrid>, region| {
            sum_grids(acc.as_ref(), capacity.grid(*region))
        });
    if let Some(grid) = all {
        capacity.insert(Region::All, grid);
    }
    capacity
}
