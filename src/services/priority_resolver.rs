use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::recommendation::{Candidate, Priority, PriorityResolution};
use crate::models::week::{NavDirection, WeekWindow};

const MED_OFFSET_DAYS: i64 = 2;
const LOW_OFFSET_DAYS: i64 = 4;

impl Priority {
    /// Days after the HIGH anchor this tier aims for.
    pub fn offset_days(self) -> i64 {
        match self {
            Priority::High => 0,
            Priority::Med => MED_OFFSET_DAYS,
            Priority::Low => LOW_OFFSET_DAYS,
        }
    }

    /// Dates tried in order: exact for HIGH; exact, +1, -1 otherwise.
    pub fn search_dates(self, target: NaiveDate) -> Vec<NaiveDate> {
        match self {
            Priority::High => vec![target],
            Priority::Med | Priority::Low => vec![
                target,
                target + Duration::days(1),
                target - Duration::days(1),
            ],
        }
    }
}

/// Earliest candidate date from tomorrow onward inside the visible week.
pub fn high_anchor(
    candidates: &[Candidate],
    visible_week: &WeekWindow,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let tomorrow = today + Duration::days(1);
    candidates
        .iter()
        .map(|candidate| candidate.date)
        .filter(|date| *date >= tomorrow && visible_week.contains(*date))
        .min()
}

/// Maps the requested priority to a target date and the candidates on it.
///
/// Week-change signals are reported as-is; refusing them after a navigation
/// is the guard's job.
pub fn filter_candidates_by_priority(
    all_candidates: &[Candidate],
    priority: Priority,
    visible_week: &WeekWindow,
    today: NaiveDate,
) -> PriorityResolution {
    let anchor = match high_anchor(all_candidates, visible_week, today) {
        Some(anchor) => anchor,
        None => {
            debug!(target: "app::priority", %priority, "no anchor in visible week");
            return PriorityResolution::week_change(NavDirection::Next);
        }
    };

    // The anchor is inside the visible week and offsets only add days, so the
    // target can only run past the end of the week.
    let target = anchor + Duration::days(priority.offset_days());
    if target > visible_week.last_day() {
        debug!(target: "app::priority", %priority, %anchor, %target, "target beyond visible week");
        return PriorityResolution::week_change(NavDirection::Next);
    }

    for date in priority.search_dates(target) {
        let mut selected: Vec<Candidate> = all_candidates
            .iter()
            .filter(|candidate| candidate.date == date)
            .cloned()
            .collect();
        if selected.is_empty() {
            continue;
        }

        selected.sort_by(|a, b| {
            (b.stack_size > 0)
                .cmp(&(a.stack_size > 0))
                .then_with(|| b.remaining.cmp(&a.remaining))
        });
        debug!(
            target: "app::priority",
            %priority,
            %anchor,
            resolved = %date,
            count = selected.len(),
            "priority resolved"
        );
        return PriorityResolution {
            candidates: selected,
            target_date: Some(date),
            needs_week_change: None,
        };
    }

    debug!(target: "app::priority", %priority, %anchor, %target, "nothing on target or fallback dates");
    PriorityResolution::empty()
}
