use chrono::{Days, NaiveDateTime, NaiveTime};
use snafu::{OptionExt, ensure};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::batch::{BatchRunner, Trigger};
use crate::error::InvalidScheduleSnafu;
use crate::log_sink::LogSink;
use crate::utils::local_now;
use crate::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wall clock time of day in the host's local zone, written as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTime(NaiveTime);

impl DailyTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).context(InvalidScheduleSnafu {
            msg: format!("{:02}:{:02} is not a valid time", hour, minute),
        })?;
        Ok(Self(time))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// First occurrence strictly after `now`
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.0);
        if today > now {
            return today;
        }

        match now.date().checked_add_days(Days::new(1)) {
            Some(tomorrow) => tomorrow.and_time(self.0),
            None => NaiveDateTime::MAX,
        }
    }
}

impl FromStr for DailyTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (hour, minute) = s.trim().split_once(':').context(InvalidScheduleSnafu {
            msg: format!("expected HH:MM, got {:?}", s),
        })?;

        let two_digits = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_digit());
        ensure!(
            two_digits(hour) && two_digits(minute),
            InvalidScheduleSnafu {
                msg: format!("expected HH:MM, got {:?}", s),
            }
        );

        let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) else {
            return Err(Error::InvalidSchedule {
                msg: format!("expected HH:MM, got {:?}", s),
            });
        };

        DailyTime::new(hour, minute)
    }
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Tracks the next due firing of a daily time
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    at: DailyTime,
    next_run: NaiveDateTime,
}

impl DailyTrigger {
    pub fn new(at: DailyTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            next_run: at.next_after(now),
        }
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    /// True once per due time; missed days are not caught up
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        if now < self.next_run {
            return false;
        }
        self.next_run = self.at.next_after(now);
        true
    }
}

/// Source of the current local time
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct Scheduler {
    at: DailyTime,
    poll_interval: Duration,
    runner: Arc<BatchRunner>,
    log: Arc<LogSink>,
    clock: Clock,
}

impl Scheduler {
    pub fn new(
        at: DailyTime,
        poll_interval: Duration,
        runner: Arc<BatchRunner>,
        log: Arc<LogSink>,
    ) -> Self {
        Self {
            at,
            poll_interval,
            runner,
            log,
            clock: Arc::new(local_now),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Spawns the polling loop on the current tokio runtime
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(self.run_loop(stop_rx, running.clone()));

        SchedulerHandle {
            stop_tx,
            running,
            task,
        }
    }

    async fn run_loop(self, mut stop_rx: watch::Receiver<bool>, running: Arc<AtomicBool>) {
        self.log_line(format!(
            "Scheduler started, scheduled daily at {} (server local time).",
            self.at
        ))
        .await;

        let mut trigger = DailyTrigger::new(self.at, (self.clock)());
        info!("Next scheduled run at {}", trigger.next_run());

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.step(&mut trigger, (self.clock)()).await;
                }
                changed = stop_rx.changed() => {
                    // A dropped sender also means stop
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        running.store(false, Ordering::SeqCst);
        self.log_line("Scheduler stopping".to_string()).await;
    }

    /// Fires the batch when the trigger is due at `now`
    async fn step(&self, trigger: &mut DailyTrigger, now: NaiveDateTime) -> bool {
        if !trigger.poll(now) {
            return false;
        }
        self.fire().await;
        info!("Next scheduled run at {}", trigger.next_run());
        true
    }

    async fn fire(&self) {
        match self.runner.run_stored(Trigger::Scheduled).await {
            Ok(results) => {
                let failed = results.iter().filter(|r| !r.ok).count();
                info!(
                    "Scheduled run completed: total={}, failed={}",
                    results.len(),
                    failed
                );
            }
            Err(Error::RunInProgress) => {
                self.log_line("JOB_RUN_ALL skipped: a run is already in progress".to_string())
                    .await;
            }
            Err(e) => error!("Scheduled run failed: {}", e),
        }
    }

    async fn log_line(&self, message: String) {
        if let Err(e) = self.log.append(&message).await {
            error!("{}", e);
        }
    }
}

/// Owner of a started scheduler; stopping consumes it
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    pub fn status(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub async fn stop(self) {
        if self.stop_tx.send(true).is_err() {
            warn!("Scheduler loop already exited");
        }
        if let Err(e) = self.task.await {
            error!("Scheduler task failed: {}", e);
        }
    }
}
