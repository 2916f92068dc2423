//! The countdown refresh loop.
//!
//! The ticker owns a single repeating timer. Arming replaces the pending
//! timer and cancelling drops it, so at most one is ever pending. Every
//! tick re-fetches the rest of today's events and feeds them through
//! [`RefreshState`]. Calendar changes arrive as commands through a
//! [`TickerHandle`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, Utc};
use nextup_core::{
    CalendarEvent, FormatOptions, Menu, PollInterval, StatusFormatter, TimeWindow,
    select_relevant_event,
};
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ServerResult;
use crate::refresh::{Change, RefreshOutcome, RefreshState, TimerCommand};
use crate::source::EventSource;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Which timezone decides where "today" ends and how menu times are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayBoundary {
    /// The system timezone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl DayBoundary {
    /// The window from `now` until the end of the day.
    pub fn today_remaining(&self, now: DateTime<Utc>) -> TimeWindow {
        match self {
            Self::Local => TimeWindow::today_remaining(now, &Local),
            Self::Fixed(offset) => TimeWindow::today_remaining(now, offset),
        }
    }

    fn build_menu(
        &self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
        calendars: &[nextup_core::Calendar],
        selected_ids: &[String],
        formatter: &StatusFormatter,
    ) -> Menu {
        let selection = select_relevant_event(events, now);
        match self {
            Self::Local => Menu::build(
                events,
                selection.as_ref(),
                calendars,
                selected_ids,
                formatter,
                &Local,
            ),
            Self::Fixed(offset) => Menu::build(
                events,
                selection.as_ref(),
                calendars,
                selected_ids,
                formatter,
                offset,
            ),
        }
    }
}

/// Ticker configuration.
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Status text options.
    pub format: FormatOptions,
    /// Where the day ends.
    pub day_boundary: DayBoundary,
    /// Delay before retrying after a failed fetch when no timer is pending.
    pub retry_interval: PollInterval,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            format: FormatOptions::default(),
            day_boundary: DayBoundary::Local,
            retry_interval: PollInterval::MIN,
        }
    }
}

impl TickerConfig {
    /// Builder: set format options.
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Builder: set the day boundary.
    pub fn with_day_boundary(mut self, boundary: DayBoundary) -> Self {
        self.day_boundary = boundary;
        self
    }

    /// Builder: set the retry interval.
    pub fn with_retry_interval(mut self, interval: PollInterval) -> Self {
        self.retry_interval = interval;
        self
    }
}

/// Commands that can be sent to the ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerCommand {
    /// Calendar data changed; re-fetch and switch from scratch.
    Refresh,
    /// Watch a different set of calendars.
    SetCalendars(Vec<String>),
    /// Stop the ticker.
    Stop,
}

/// Published after every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub change: Change,
    /// Status bar title.
    pub status: String,
    /// Interval the timer is armed with, `None` when no timer is pending.
    pub interval: Option<PollInterval>,
    /// Rebuilt menu, present on [`Change::Switched`].
    pub menu: Option<Menu>,
    pub at: DateTime<Utc>,
}

/// Observable ticker state.
#[derive(Debug, Clone, Default)]
pub struct TickerState {
    /// Last published status title.
    pub status: Option<String>,
    /// Number of timer firings.
    pub ticks: u64,
    /// Interval of the pending timer.
    pub scheduled: Option<PollInterval>,
    /// Last successful refresh.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Last fetch error message.
    pub last_error: Option<String>,
    /// Fetch failures since the last success.
    pub consecutive_failures: u32,
}

/// Shared ticker state.
pub type SharedTickerState = Arc<RwLock<TickerState>>;

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    deadline: Instant,
    period: Duration,
}

/// Drives [`RefreshState`] from a single repeating timer.
pub struct Ticker {
    config: TickerConfig,
    formatter: StatusFormatter,
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    calendars: Vec<String>,
    refresh: RefreshState,
    timer: Option<ArmedTimer>,
    state: SharedTickerState,
    command_tx: mpsc::Sender<TickerCommand>,
    command_rx: Option<mpsc::Receiver<TickerCommand>>,
}

impl Ticker {
    /// Creates a ticker watching `calendars` of `source`.
    pub fn new(
        config: TickerConfig,
        source: Arc<dyn EventSource>,
        calendars: Vec<String>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        Self {
            formatter: StatusFormatter::new(config.format.clone()),
            config,
            source,
            clock: Arc::new(SystemClock),
            calendars,
            refresh: RefreshState::new(),
            timer: None,
            state: Arc::new(RwLock::new(TickerState::default())),
            command_tx,
            command_rx: Some(command_rx),
        }
    }

    /// Builder: replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a handle for sending commands to the ticker.
    pub fn handle(&self) -> TickerHandle {
        TickerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Returns the shared state.
    pub fn state(&self) -> SharedTickerState {
        self.state.clone()
    }

    /// Runs until [`TickerCommand::Stop`].
    ///
    /// `on_update` is called with every new status.
    pub async fn run<F>(mut self, mut on_update: F)
    where
        F: FnMut(StatusUpdate) + Send,
    {
        let Some(mut command_rx) = self.command_rx.take() else {
            warn!("ticker already ran");
            return;
        };

        info!(calendars = ?self.calendars, "ticker started");
        self.switch(&mut on_update).await;

        loop {
            let deadline = self.timer.map(|t| t.deadline);

            tokio::select! {
                _ = sleep_until(deadline) => {
                    self.state.write().await.ticks += 1;
                    self.tick(&mut on_update).await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(TickerCommand::Refresh) => {
                            debug!("received Refresh command");
                            self.switch(&mut on_update).await;
                        }
                        Some(TickerCommand::SetCalendars(ids)) => {
                            info!(calendars = ?ids, "switching calendars");
                            self.calendars = ids;
                            self.switch(&mut on_update).await;
                        }
                        Some(TickerCommand::Stop) | None => {
                            info!("ticker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn switch<F>(&mut self, on_update: &mut F)
    where
        F: FnMut(StatusUpdate),
    {
        let now = self.clock.now();
        let Some(events) = self.fetch(now).await else {
            return;
        };
        let outcome = self.refresh.switch_to(&events, now, &self.formatter);
        self.publish(outcome, &events, now, on_update).await;
    }

    async fn tick<F>(&mut self, on_update: &mut F)
    where
        F: FnMut(StatusUpdate),
    {
        let now = self.clock.now();
        let Some(events) = self.fetch(now).await else {
            return;
        };
        let outcome = self.refresh.on_tick(&events, now, &self.formatter);
        self.publish(outcome, &events, now, on_update).await;
    }

    /// Fetches the rest of today's events. On failure the error is recorded,
    /// the timer keeps repeating (or a retry is armed) and `None` is returned.
    async fn fetch(&mut self, now: DateTime<Utc>) -> Option<Vec<CalendarEvent>> {
        let window = self.config.day_boundary.today_remaining(now);
        match self.source.events(&self.calendars, &window) {
            Ok(events) => {
                debug!(count = events.len(), "fetched events");
                Some(events)
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch events");
                let retry = self.timer.is_none().then_some(self.config.retry_interval);
                match retry {
                    Some(interval) => self.apply(TimerCommand::Arm(interval)),
                    None => self.apply(TimerCommand::Keep),
                }

                let mut state = self.state.write().await;
                state.consecutive_failures += 1;
                state.last_error = Some(e.to_string());
                if retry.is_some() {
                    state.scheduled = retry;
                }
                None
            }
        }
    }

    async fn publish<F>(
        &mut self,
        outcome: RefreshOutcome,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
        on_update: &mut F,
    ) where
        F: FnMut(StatusUpdate),
    {
        self.apply(outcome.timer);

        let menu = match outcome.change {
            Change::Switched => self.menu(events, now),
            Change::Refreshed => None,
        };

        {
            let mut state = self.state.write().await;
            state.status = Some(outcome.status.clone());
            state.scheduled = self.refresh.scheduled();
            state.last_refresh = Some(now);
            state.last_error = None;
            state.consecutive_failures = 0;
        }

        on_update(StatusUpdate {
            change: outcome.change,
            status: outcome.status,
            interval: self.refresh.scheduled(),
            menu,
            at: now,
        });
    }

    fn menu(&self, events: &[CalendarEvent], now: DateTime<Utc>) -> Option<Menu> {
        match self.source.calendars() {
            Ok(calendars) => Some(self.config.day_boundary.build_menu(
                events,
                now,
                &calendars,
                &self.calendars,
                &self.formatter,
            )),
            Err(e) => {
                warn!(error = %e, "failed to list calendars, menu not rebuilt");
                None
            }
        }
    }

    fn apply(&mut self, command: TimerCommand) {
        let now = Instant::now();
        match command {
            TimerCommand::Arm(interval) => {
                let period = interval.as_duration();
                debug!(interval_secs = interval.as_secs(), "arming timer");
                self.timer = Some(ArmedTimer {
                    deadline: now + period,
                    period,
                });
            }
            TimerCommand::Keep => {
                if let Some(timer) = self.timer.as_mut() {
                    timer.deadline = now + timer.period;
                }
            }
            TimerCommand::Cancel => {
                debug!("cancelling timer");
                self.timer = None;
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Handle for sending commands to a running ticker.
#[derive(Clone, Debug)]
pub struct TickerHandle {
    command_tx: mpsc::Sender<TickerCommand>,
    state: SharedTickerState,
}

impl TickerHandle {
    /// Calendar data changed; re-fetch and switch.
    pub async fn refresh(&self) -> Result<(), mpsc::error::SendError<TickerCommand>> {
        self.command_tx.send(TickerCommand::Refresh).await
    }

    /// Watch a different set of calendars.
    pub async fn set_calendars(
        &self,
        ids: Vec<String>,
    ) -> Result<(), mpsc::error::SendError<TickerCommand>> {
        self.command_tx.send(TickerCommand::SetCalendars(ids)).await
    }

    /// Stops the ticker.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<TickerCommand>> {
        self.command_tx.send(TickerCommand::Stop).await
    }

    /// Returns a snapshot of the ticker state.
    pub async fn state(&self) -> TickerState {
        self.state.read().await.clone()
    }
}

/// Convenience for callers that only need a fetch-and-select snapshot.
pub fn today_events(
    source: &dyn EventSource,
    calendars: &[String],
    boundary: DayBoundary,
    now: DateTime<Utc>,
) -> ServerResult<Vec<CalendarEvent>> {
    source.events(calendars, &boundary.today_remaining(now))
}
