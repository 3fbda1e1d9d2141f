use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};
use slotstack_lib::models::appointment::Appointment;
use slotstack_lib::models::block::BlockKey;
use slotstack_lib::models::capacity::{CapacityGrid, Region};
use slotstack_lib::models::collaborators::{
    CalendarNavigator, CapacitySource, EventSource, FixedClock, PreassignedCity,
};
use slotstack_lib::models::recommendation::NotFoundReason;
use slotstack_lib::models::settings::{EngineSettings, SnapshotCacheSettings};
use slotstack_lib::models::week::{NavDirection, WeekId, WeekWindow};
use slotstack_lib::{
    AppError, AppResult, Candidate, Collaborators, Priority, RecommendationOutcome, RecommendationRequest,
    RecommendationService,
};

struct WeekFixture {
    window: WeekWindow,
    events: Vec<Appointment>,
    grids: BTreeMap<Region, CapacityGrid>,
}

/// In-memory calendar standing in for the event page, the capacity sheet and
/// the week pager at once.
struct FakeCalendar {
    weeks: Vec<WeekFixture>,
    position: Mutex<usize>,
    navigations: Mutex<Vec<NavDirection>>,
    event_fetches: AtomicUsize,
    booked: Mutex<Vec<Appointment>>,
    fetch_delay: Option<StdDuration>,
    drift_during_fetch: bool,
    wrap_around: bool,
}

impl FakeCalendar {
    fn new(weeks: Vec<WeekFixture>) -> Self {
        Self {
            weeks,
            position: Mutex::new(0),
            navigations: Mutex::new(Vec::new()),
            event_fetches: AtomicUsize::new(0),
            booked: Mutex::new(Vec::new()),
            fetch_delay: None,
            drift_during_fetch: false,
            wrap_around: false,
        }
    }

    fn book(&self, appointment: Appointment) {
        self.booked.lock().expect("lock").push(appointment);
    }

    fn fixture(&self, week: &WeekId) -> AppResult<&WeekFixture> {
        self.weeks
            .iter()
            .find(|fixture| &fixture.window.id == week)
            .ok_or_else(|| AppError::collaborator("fake-calendar", format!("unknown week {week}")))
    }

    fn navigations(&self) -> Vec<NavDirection> {
        self.navigations.lock().expect("lock").clone()
    }
}

#[async_trait::async_trait]
impl EventSource for FakeCalendar {
    async fn fetch_events(&self, week: &WeekId) -> AppResult<Vec<Appointment>> {
        self.event_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.drift_during_fetch {
            let mut position = self.position.lock().expect("lock");
            *position = (*position + 1).min(self.weeks.len() - 1);
        }
        let fixture = self.fixture(week)?;
        let mut events = fixture.events.clone();
        events.extend(
            self.booked
                .lock()
                .expect("lock")
                .iter()
                .filter(|event| fixture.window.contains(event.day()))
                .cloned(),
        );
        Ok(events)
    }
}

#[async_trait::async_trait]
impl CapacitySource for FakeCalendar {
    async fn fetch_capacity_grid(
        &self,
        region: Region,
        week: &WeekId,
    ) -> AppResult<Option<CapacityGrid>> {
        Ok(self.fixture(week)?.grids.get(&region).cloned())
    }
}

#[async_trait::async_trait]
impl CalendarNavigator for FakeCalendar {
    async fn current_week(&self) -> AppResult<WeekWindow> {
        let position = *self.position.lock().expect("lock");
        Ok(self.weeks[position].window.clone())
    }

    async fn navigate(&self, direction: NavDirection) -> AppResult<()> {
        let mut position = self.position.lock().expect("lock");
        *position = match direction {
            NavDirection::Next if self.wrap_around => (*position + 1) % self.weeks.len(),
            NavDirection::Next => (*position + 1).min(self.weeks.len() - 1),
            NavDirection::Prev => position.saturating_sub(1),
        };
        self.navigations.lock().expect("lock").push(direction);
        Ok(())
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).expect("valid date")
}

fn day(offset: i64) -> NaiveDate {
    monday() + Duration::days(offset)
}

fn empty_week(index: i64) -> WeekFixture {
    WeekFixture {
        window: WeekWindow::starting(WeekId::new(format!("week-{index}")), day(index * 7)),
        events: Vec::new(),
        grids: BTreeMap::new(),
    }
}

fn open_week(index: i64, per_block: u32) -> WeekFixture {
    let mut fixture = empty_week(index);
    let mut grid = CapacityGrid::new();
    for key in BlockKey::ALL {
        grid.set(key, [Some(per_block); 7]);
    }
    fixture.grids.insert(Region::North, grid);
    fixture
}

fn job(date: NaiveDate, block: BlockKey, city: &str) -> Appointment {
    Appointment::new(date.and_time(block.start_time()), date.and_time(block.end_time()), "job")
        .with_city(city)
}

fn no_cache() -> EngineSettings {
    EngineSettings {
        snapshot_cache: SnapshotCacheSettings {
            capacity: 4,
            ttl_seconds: 0,
        },
        ..EngineSettings::default()
    }
}

fn service_for(calendar: &Arc<FakeCalendar>, today: NaiveDate) -> AppResult<RecommendationService> {
    service_with(calendar, today, &no_cache())
}

fn service_with(
    calendar: &Arc<FakeCalendar>,
    today: NaiveDate,
    settings: &EngineSettings,
) -> AppResult<RecommendationService> {
    let collaborators = Collaborators {
        events: calendar.clone(),
        capacity: calendar.clone(),
        navigator: calendar.clone(),
        classifier: Arc::new(PreassignedCity),
    };
    Ok(RecommendationService::new(collaborators, settings)?.with_clock(Arc::new(FixedClock(today))))
}

fn found_slot(outcome: RecommendationOutcome) -> Candidate {
    match outcome {
        RecommendationOutcome::Found { state, .. } => state.current().cloned().expect("a candidate"),
        other => panic!("expected a slot, got {other:?}"),
    }
}

fn not_found_reason(outcome: RecommendationOutcome) -> NotFoundReason {
    match outcome {
        RecommendationOutcome::NotFound { reason, .. } => reason,
        other => panic!("expected not found, got {other:?}"),
    }
}

fn request(city: &str, priority: Priority) -> RecommendationRequest {
    RecommendationRequest {
        city: city.to_string(),
        priority,
        region: Some(Region::North),
    }
}

#[tokio::test]
async fn priorities_map_onto_anchor_offsets_in_the_visible_week() -> AppResult<()> {
    let mut week = open_week(0, 2);
    week.events.push(job(day(2), BlockKey::B2, "Dayton"));
    let calendar = Arc::new(FakeCalendar::new(vec![week, open_week(1, 2)]));
    let service = service_for(&calendar, monday())?;

    let expectations = [
        (Priority::High, day(1)),
        (Priority::Med, day(3)),
        (Priority::Low, day(5)),
    ];
    for (priority, expected) in expectations {
        match service.recommend(request("Dayton", priority)).await? {
            RecommendationOutcome::Found { state, target_date } => {
                assert_eq!(target_date, Some(expected), "{priority}");
                assert_eq!(state.current().map(|c| c.date), Some(expected));
                assert_eq!(state.week_nav_count, 0);
            }
            other => panic!("expected a slot for {priority}, got {other:?}"),
        }
    }
    assert!(calendar.navigations().is_empty());
    Ok(())
}

#[tokio::test]
async fn full_week_navigates_forward_once_and_resolves() -> AppResult<()> {
    let mut next = open_week(1, 1);
    next.events.push(job(day(9), BlockKey::B3, "Xenia"));
    let calendar = Arc::new(FakeCalendar::new(vec![empty_week(0), next]));
    let service = service_for(&calendar, monday())?;

    let (state, target_date) = match service.recommend(request("xenia", Priority::High)).await? {
        RecommendationOutcome::Found { state, target_date } => (state, target_date),
        other => panic!("expected a slot, got {other:?}"),
    };
    assert_eq!(target_date, Some(day(7)));
    assert_eq!(state.candidates[0].stack_size, 0);
    assert_eq!(state.last_nav_direction, None);
    assert_eq!(calendar.navigations(), vec![NavDirection::Next]);
    Ok(())
}

#[tokio::test]
async fn low_priority_past_week_end_is_found_in_following_week() -> AppResult<()> {
    let calendar = Arc::new(FakeCalendar::new(vec![open_week(0, 1), open_week(1, 1)]));
    let service = service_for(&calendar, day(3))?;

    let target_date = match service.recommend(request("Dayton", Priority::Low)).await? {
        RecommendationOutcome::Found { target_date, .. } => target_date,
        other => panic!("expected a slot, got {other:?}"),
    };
    assert_eq!(target_date, Some(day(11)));
    assert_eq!(calendar.navigations(), vec![NavDirection::Next]);
    Ok(())
}

#[tokio::test]
async fn navigation_stops_after_two_weeks_without_capacity() -> AppResult<()> {
    let weeks = (0..5).map(empty_week).collect();
    let calendar = Arc::new(FakeCalendar::new(weeks));
    let service = service_for(&calendar, monday())?;

    let outcome = service.recommend(request("Dayton", Priority::High)).await?;
    match outcome {
        RecommendationOutcome::NotFound {
            reason,
            weeks_navigated,
            ..
        } => {
            assert_eq!(reason, NotFoundReason::NavigationCapReached);
            assert_eq!(weeks_navigated, 2);
        }
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(calendar.navigations(), vec![NavDirection::Next, NavDirection::Next]);

    // A fresh request gets a fresh navigation budget.
    service.recommend(request("Dayton", Priority::High)).await?;
    assert_eq!(calendar.navigations().len(), 4);
    Ok(())
}

#[tokio::test]
async fn week_moving_mid_fetch_is_rejected() -> AppResult<()> {
    let mut calendar = FakeCalendar::new(vec![open_week(0, 1), open_week(1, 1)]);
    calendar.drift_during_fetch = true;
    let calendar = Arc::new(calendar);
    let service = service_for(&calendar, monday())?;

    let result = service.recommend(request("Dayton", Priority::High)).await;
    assert!(matches!(result, Err(AppError::WeekMismatch { .. })));
    Ok(())
}

#[tokio::test]
async fn newer_request_supersedes_in_flight_one() -> AppResult<()> {
    let mut calendar = FakeCalendar::new(vec![open_week(0, 1), open_week(1, 1)]);
    calendar.fetch_delay = Some(StdDuration::from_millis(20));
    let calendar = Arc::new(calendar);
    let service = service_for(&calendar, monday())?;

    let (first, second) = tokio::join!(
        service.recommend(request("Dayton", Priority::High)),
        service.recommend(request("Kettering", Priority::High)),
    );
    assert!(matches!(first?, RecommendationOutcome::Superseded { .. }));
    assert!(matches!(second?, RecommendationOutcome::Found { .. }));
    Ok(())
}

#[tokio::test]
async fn blank_city_is_a_validation_error() -> AppResult<()> {
    let calendar = Arc::new(FakeCalendar::new(vec![open_week(0, 1)]));
    let service = service_for(&calendar, monday())?;
    let err = service
        .recommend(request("   ", Priority::Med))
        .await
        .expect_err("blank city");
    assert!(err.is_validation());
    assert_eq!(calendar.event_fetches.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn injected_classifier_assigns_cities_before_search() -> AppResult<()> {
    let mut week = open_week(0, 2);
    let mut unlabeled = Appointment::new(
        day(3).and_time(BlockKey::B1.start_time()),
        day(3).and_time(BlockKey::B1.end_time()),
        "furnace tune-up",
    );
    unlabeled.address = Some("12 Main St, Dayton".to_string());
    week.events.push(unlabeled);
    let calendar = Arc::new(FakeCalendar::new(vec![week]));

    let collaborators = Collaborators {
        events: calendar.clone(),
        capacity: calendar.clone(),
        navigator: calendar.clone(),
        classifier: Arc::new(|event: &Appointment| {
            event
                .address
                .as_deref()
                .and_then(|address| address.rsplit(',').next())
                .map(|city| city.trim().to_string())
        }),
    };
    let service = RecommendationService::new(collaborators, &no_cache())?
        .with_clock(Arc::new(FixedClock(monday())));

    let summaries = service.summarize_week(Some(Region::North)).await?;
    assert_eq!(summaries[3].ranked_cities, vec!["Dayton".to_string()]);
    Ok(())
}

#[tokio::test]
async fn summaries_use_derived_all_region_and_cache_snapshots() -> AppResult<()> {
    let mut week = empty_week(0);
    week.grids.insert(
        Region::North,
        CapacityGrid::new().with_block(BlockKey::B1, [Some(1); 7]),
    );
    week.grids.insert(
        Region::South,
        CapacityGrid::new().with_block(BlockKey::B1, [Some(2); 7]),
    );
    let calendar = Arc::new(FakeCalendar::new(vec![week]));
    let service = service_with(&calendar, monday(), &EngineSettings::default())?;

    let summaries = service.summarize_week(Some(Region::All)).await?;
    assert_eq!(summaries.len(), 7);
    assert!(summaries.iter().all(|s| s.totals.capacity_total == 3));
    assert_eq!(summaries[0].totals.remaining(BlockKey::B2), None);

    service.summarize_week(Some(Region::All)).await?;
    assert_eq!(calendar.event_fetches.load(Ordering::SeqCst), 1);

    service.clear_cache();
    service.summarize_week(Some(Region::All)).await?;
    assert_eq!(calendar.event_fetches.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn bookings_made_between_requests_are_seen_with_default_settings() -> AppResult<()> {
    let mut week = empty_week(0);
    week.grids.insert(
        Region::North,
        CapacityGrid::new().with_block(BlockKey::B1, [Some(1); 7]),
    );
    let calendar = Arc::new(FakeCalendar::new(vec![week]));
    let service = service_with(&calendar, monday(), &EngineSettings::default())?;

    let first = found_slot(service.recommend(request("Dayton", Priority::High)).await?);
    assert_eq!((first.date, first.block), (day(1), BlockKey::B1));

    calendar.book(job(day(1), BlockKey::B1, "Dayton"));
    let second = found_slot(service.recommend(request("Dayton", Priority::High)).await?);
    assert_eq!((second.date, second.block), (day(2), BlockKey::B1));
    assert_eq!(second.remaining, 1);
    assert_eq!(calendar.event_fetches.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn navigation_that_does_not_leave_the_week_stops_as_oscillation() -> AppResult<()> {
    let calendar = Arc::new(FakeCalendar::new(vec![empty_week(0)]));
    let service = service_for(&calendar, monday())?;

    let reason = not_found_reason(service.recommend(request("Dayton", Priority::High)).await?);
    assert_eq!(reason, NotFoundReason::OscillationDetected);
    assert_eq!(calendar.navigations(), vec![NavDirection::Next]);
    Ok(())
}

#[tokio::test]
async fn calendar_bouncing_back_to_a_seen_week_stops_before_the_cap() -> AppResult<()> {
    let mut calendar = FakeCalendar::new(vec![empty_week(0), empty_week(1)]);
    calendar.wrap_around = true;
    let calendar = Arc::new(calendar);
    let service = service_for(&calendar, monday())?;

    match service.recommend(request("Dayton", Priority::Med)).await? {
        RecommendationOutcome::NotFound {
            reason,
            weeks_navigated,
            ..
        } => {
            assert_eq!(reason, NotFoundReason::OscillationDetected);
            assert_eq!(weeks_navigated, 2);
        }
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(calendar.navigations(), vec![NavDirection::Next, NavDirection::Next]);
    Ok(())
}
