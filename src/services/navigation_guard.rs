use tracing::{debug, info};
use uuid::Uuid;

use crate::models::recommendation::{
    Candidate, GuardDecision, GuardPhase, NotFoundReason, PriorityResolution, RecommendationState,
};
use crate::models::week::WeekId;

/// Automatic week navigations allowed per logical request.
pub const MAX_WEEK_NAVIGATIONS: u8 = 2;

impl RecommendationState {
    /// Fresh session for a user-initiated request.
    pub fn fresh() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            candidates: Vec::new(),
            index: 0,
            pending_week_change: None,
            last_nav_direction: None,
            week_nav_count: 0,
            visited_weeks: Vec::new(),
            phase: GuardPhase::Idle,
        }
    }

    /// Feeds the resolver result for the visible `week` through the guard and
    /// says what to do next.
    pub fn apply(&mut self, week: &WeekId, resolution: PriorityResolution) -> GuardDecision {
        self.pending_week_change = None;
        let revisited = self.visited_weeks.contains(week);
        if !revisited {
            self.visited_weeks.push(week.clone());
        }

        if !resolution.candidates.is_empty() {
            self.candidates = resolution.candidates;
            self.index = 0;
            self.last_nav_direction = None;
            self.week_nav_count = 0;
            self.visited_weeks.clear();
            self.phase = GuardPhase::Resolved;
            debug!(
                target: "app::navigation",
                request_id = %self.request_id,
                candidates = self.candidates.len(),
                "recommendation resolved"
            );
            return GuardDecision::Resolved;
        }

        let direction = match resolution.needs_week_change {
            Some(direction) => direction,
            None => return self.give_up(NotFoundReason::NoCandidates),
        };

        // Bouncing back, or a navigation that did not reach a new week.
        if revisited || self.last_nav_direction == Some(direction.reversed()) {
            debug!(
                target: "app::navigation",
                request_id = %self.request_id,
                %week,
                %direction,
                revisited,
                "week change refused"
            );
            return self.give_up(NotFoundReason::OscillationDetected);
        }
        if self.week_nav_count >= MAX_WEEK_NAVIGATIONS {
            return self.give_up(NotFoundReason::NavigationCapReached);
        }

        self.week_nav_count += 1;
        self.last_nav_direction = Some(direction);
        self.pending_week_change = Some(direction);
        self.phase = GuardPhase::AwaitingWeekChange(direction);
        info!(
            target: "app::navigation",
            request_id = %self.request_id,
            %direction,
            count = self.week_nav_count,
            "navigating to {} week",
            direction
        );
        GuardDecision::Navigate(direction)
    }

    /// Drops candidates, e.g. when the target city input is cleared.
    pub fn discard(&mut self) {
        *self = Self::fresh();
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.candidates.get(self.index)
    }

    /// Steps to the next candidate, wrapping to the first.
    pub fn advance(&mut self) -> Option<&Candidate> {
        if self.candidates.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.candidates.len();
        self.current()
    }

    /// Steps to the previous candidate, wrapping to the last.
    pub fn step_back(&mut self) -> Option<&Candidate> {
        if self.candidates.is_empty() {
            return None;
        }
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.candidates.len() - 1);
        self.current()
    }

    fn give_up(&mut self, reason: NotFoundReason) -> GuardDecision {
        info!(
            target: "app::navigation",
            request_id = %self.request_id,
            navigations = self.week_nav_count,
            ?reason,
            "{}",
            reason.message()
        );
        self.candidates.clear();
        self.index = 0;
        self.last_nav_direction = None;
        self.visited_weeks.clear();
        self.phase = GuardPhase::Idle;
        GuardDecision::NotFound(reason)
    }
}
