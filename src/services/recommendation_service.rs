use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::capacity::{Region, RegionalCapacity};
use crate::models::collaborators::{
    CalendarNavigator, CapacitySource, CityClassifier, Clock, EventSource, SystemClock,
};
use crate::models::recommendation::{
    GuardDecision, RecommendationOutcome, RecommendationRequest, RecommendationState,
};
use crate::models::settings::EngineSettings;
use crate::models::totals::DaySummary;
use crate::models::week::{WeekId, WeekSnapshot};
use crate::services::capacity_service;
use crate::services::daily_summary;
use crate::services::priority_resolver;
use crate::services::slot_stacking;
use crate::services::week_cache::WeekCache;

/// External collaborators the pipeline drives.
#[derive(Clone)]
pub struct Collaborators {
    pub events: Arc<dyn EventSource>,
    pub capacity: Arc<dyn CapacitySource>,
    pub navigator: Arc<dyn CalendarNavigator>,
    pub classifier: Arc<dyn CityClassifier>,
}

/// Runs fetch, search, priority resolution and guarded week navigation as one
/// sequential loop per request.
pub struct RecommendationService {
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    cache: WeekCache,
    default_region: Region,
    generation: AtomicU64,
}

impl RecommendationService {
    pub fn new(collaborators: Collaborators, settings: &EngineSettings) -> AppResult<Self> {
        Ok(Self {
            collaborators,
            clock: Arc::new(SystemClock::new(settings.timezone)),
            cache: WeekCache::new(&settings.snapshot_cache)?,
            default_region: settings.default_region,
            generation: AtomicU64::new(0),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Handles one user-initiated request. Any run still in flight from an
    /// earlier request is superseded.
    pub async fn recommend(&self, request: RecommendationRequest) -> AppResult<RecommendationOutcome> {
        let city = request.city.trim();
        if city.is_empty() {
            self.cancel_pending();
            return Err(AppError::validation("target city must not be empty"));
        }
        let region = request.region.unwrap_or(self.default_region);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = RecommendationState::fresh();
        let request_id = state.request_id;

        info!(
            target: "app::recommendation",
            %request_id,
            city,
            priority = %request.priority,
            %region,
            "recommendation requested"
        );

        loop {
            let snapshot = self.load_snapshot(region, false).await?;
            if self.is_superseded(generation) {
                return Ok(self.superseded(request_id));
            }

            let today = self.clock.today();
            let candidates = slot_stacking::find_best_slot_stacking(
                city,
                &snapshot.week.days,
                &snapshot.events,
                snapshot.capacity.as_ref(),
                region,
                today,
            )?;
            let resolution = priority_resolver::filter_candidates_by_priority(
                &candidates,
                request.priority,
                &snapshot.week,
                today,
            );
            let target_date = resolution.target_date;

            match state.apply(&snapshot.week.id, resolution) {
                GuardDecision::Resolved => {
                    info!(
                        target: "app::recommendation",
                        %request_id,
                        week = %snapshot.week.id,
                        target_date = ?target_date,
                        candidates = state.candidates.len(),
                        "slot found"
                    );
                    return Ok(RecommendationOutcome::Found { state, target_date });
                }
                GuardDecision::NotFound(reason) => {
                    return Ok(RecommendationOutcome::NotFound {
                        request_id,
                        reason,
                        weeks_navigated: state.week_nav_count,
                    });
                }
                GuardDecision::Navigate(direction) => {
                    if self.is_superseded(generation) {
                        return Ok(self.superseded(request_id));
                    }
                    self.collaborators.navigator.navigate(direction).await?;
                }
            }
        }
    }

    /// Daily totals and city tallies for the currently visible week.
    pub async fn summarize_week(&self, region: Option<Region>) -> AppResult<Vec<DaySummary>> {
        let snapshot = self
            .load_snapshot(region.unwrap_or(self.default_region), true)
            .await?;
        daily_summary::summarize_snapshot(&snapshot)
    }

    /// Invalidates any in-flight request, e.g. when the city input is cleared.
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Fetches events and capacity for the visible week as one unit and checks
    /// the calendar did not move while they were in flight. Only summaries may
    /// be served from the cache; recommendations always see current bookings.
    async fn load_snapshot(&self, region: Region, reuse_cached: bool) -> AppResult<WeekSnapshot> {
        let week = self.collaborators.navigator.current_week().await?;
        if reuse_cached {
            if let Some(snapshot) = self.cache.get(&week.id, region) {
                return Ok(snapshot);
            }
        }

        let started = Instant::now();
        let (events, capacity) = tokio::try_join!(
            self.collaborators.events.fetch_events(&week.id),
            self.fetch_capacity(region, &week.id),
        )?;

        let visible = self.collaborators.navigator.current_week().await?;
        if visible.id != week.id {
            return Err(AppError::week_mismatch(week.id.as_str(), visible.id.as_str()));
        }

        let classifier = &self.collaborators.classifier;
        let events = events
            .into_iter()
            .map(|mut event| {
                event.city = classifier.city_of(&event);
                event
            })
            .collect::<Vec<_>>();

        debug!(
            target: "app::recommendation",
            week = %week.id,
            %region,
            events = events.len(),
            has_capacity = capacity.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "week snapshot fetched"
        );

        let snapshot = WeekSnapshot {
            week,
            region,
            events,
            capacity,
        };
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    async fn fetch_capacity(&self, region: Region, week: &WeekId) -> AppResult<Option<RegionalCapacity>> {
        let source = &self.collaborators.capacity;
        if !region.is_derived() {
            let grid = source.fetch_capacity_grid(region, week).await?;
            return Ok(grid.map(|grid| RegionalCapacity::new().with_region(region, grid)));
        }

        let (north, central, south) = tokio::try_join!(
            source.fetch_capacity_grid(Region::North, week),
            source.fetch_capacity_grid(Region::Central, week),
            source.fetch_capacity_grid(Region::South, week),
        )?;

        let mut regional = RegionalCapacity::new();
        for (concrete, grid) in Region::CONCRETE.into_iter().zip([north, central, south]) {
            if let Some(grid) = grid {
                regional.insert(concrete, grid);
            }
        }
        if regional.is_empty() {
            return Ok(None);
        }
        Ok(Some(capacity_service::with_derived_all(regional)))
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn superseded(&self, request_id: uuid::Uuid) -> RecommendationOutcome {
        debug!(target: "app::recommendation", %request_id, "request superseded");
        RecommendationOutcome::Superseded { request_id }
    }
}
