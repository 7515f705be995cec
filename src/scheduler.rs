//! Daily digest scheduler
//!
//! Runs one job at a fixed local wall-clock time every day on its own tokio
//! task, independent of inbound updates.

use crate::bot::messaging::MessageSender;
use crate::news::{NewsDigest, NewsFetcher};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Text pushed by the daily job
#[must_use]
pub fn format_scheduled_push(digest: &NewsDigest) -> String {
    format!("📰 定时新闻推送：\n\n{digest}")
}

/// A wall-clock time that repeats every day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time: NaiveTime,
}

impl DailySchedule {
    /// Returns `None` if `hour`/`minute` is out of range
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|time| Self { time })
    }

    /// Time of day the schedule fires
    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    /// First occurrence strictly after `now` in the zone of `now`.
    ///
    /// Days on which the time does not exist (DST gap) are skipped; an
    /// ambiguous time resolves to the earlier instant.
    #[must_use]
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let today = now.date_naive();
        for offset in 0..=2 {
            let candidate = today.checked_add_days(Days::new(offset)).and_then(|day| {
                day.and_time(self.time)
                    .and_local_timezone(now.timezone())
                    .earliest()
            });
            if let Some(at) = candidate {
                if at > *now {
                    return at;
                }
            }
        }
        now.clone() + chrono::Duration::days(1)
    }
}

/// Work executed on every firing
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Run the job once
    async fn run(&self) -> Result<()>;
}

/// Fetches the digest and pushes it to one fixed chat
pub struct DailyDigestJob {
    news: Arc<NewsFetcher>,
    sender: Arc<dyn MessageSender>,
    chat_id: i64,
}

impl DailyDigestJob {
    /// Create the job for the given destination chat
    #[must_use]
    pub fn new(news: Arc<NewsFetcher>, sender: Arc<dyn MessageSender>, chat_id: i64) -> Self {
        Self {
            news,
            sender,
            chat_id,
        }
    }
}

#[async_trait]
impl ScheduledJob for DailyDigestJob {
    fn name(&self) -> &str {
        "daily_digest"
    }

    async fn run(&self) -> Result<()> {
        let digest = self.news.fetch_digest().await?;
        self.sender
            .send_text(self.chat_id, &format_scheduled_push(&digest))
            .await?;
        info!(
            "Scheduled digest with {} headlines sent to chat {}",
            digest.items().len(),
            self.chat_id
        );
        Ok(())
    }
}

/// Source of the current local time
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Owns the background task driving a [`ScheduledJob`]
pub struct NewsScheduler {
    schedule: DailySchedule,
    job: Arc<dyn ScheduledJob>,
    clock: Clock,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl NewsScheduler {
    /// Create a stopped scheduler
    #[must_use]
    pub fn new(schedule: DailySchedule, job: Arc<dyn ScheduledJob>) -> Self {
        Self {
            schedule,
            job,
            clock: Arc::new(Local::now),
            token: CancellationToken::new(),
            handle: None,
        }
    }

    /// Replace the wall clock used to compute firing times
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns true while the background task is alive
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the background task. Calling it twice has no effect.
    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Scheduler for {} already running", self.job.name());
            return;
        }

        self.token = CancellationToken::new();
        let schedule = self.schedule;
        let job = self.job.clone();
        let clock = self.clock.clone();
        let token = self.token.clone();

        info!(
            "Scheduling {} daily at {}",
            job.name(),
            schedule.time().format("%H:%M")
        );
        self.handle = Some(tokio::spawn(run_daily(schedule, job, clock, token)));
    }

    /// Cancel the background task and wait for it to finish.
    pub async fn stop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Scheduler task ended abnormally: {e}");
            }
        }
    }
}

async fn run_daily(
    schedule: DailySchedule,
    job: Arc<dyn ScheduledJob>,
    clock: Clock,
    token: CancellationToken,
) {
    let mut last_run: Option<DateTime<Local>> = None;

    loop {
        let now = clock();
        // Never fire the same slot twice if the timer wakes early
        let from = last_run.map_or(now, |last| last.max(now));
        let next = schedule.next_after(&from);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(
            "Next {} run at {}",
            job.name(),
            next.format("%Y-%m-%d %H:%M:%S %:z")
        );

        tokio::select! {
            () = token.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }

        last_run = Some(next);
        if let Err(e) = job.run().await {
            error!("Scheduled job {} failed: {e:#}", job.name());
        }
    }

    info!("Scheduler for {} stopped", job.name());
}
