use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    delivery::{NotificationChannel, StationNotification},
    task::{BackgroundTask, SHUTDOWN_TIMEOUT},
};

use super::{
    clock::{CivilTime, Clock},
    countdown::{Countdown, SpecialBroadcast},
    resolver::{ScheduleInfo, ScheduleResolver},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub civil: CivilTime,
    pub info: ScheduleInfo,
    pub special_countdown: Option<Countdown>,
}

type SnapshotSender = Arc<watch::Sender<Option<TickSnapshot>>>;

#[derive(Clone)]
struct TickerContext {
    resolver: Arc<ScheduleResolver>,
    special: Option<Arc<SpecialBroadcast>>,
    clock: Arc<dyn Clock>,
    channel: Arc<dyn NotificationChannel>,
    snapshots: SnapshotSender,
}

impl TickerContext {
    fn snapshot(&self, now: DateTime<Utc>) -> TickSnapshot {
        let civil = self.resolver.civil_time(now);
        let info = self.resolver.resolve_at(&civil);
        let special_countdown = self.special.as_ref().map(|special| special.countdown(&civil));

        TickSnapshot {
            civil,
            info,
            special_countdown,
        }
    }
}

/// Re-resolves the schedule once per wall-clock second and announces program changes.
pub struct ScheduleTicker {
    context: TickerContext,
    task: Mutex<Option<BackgroundTask>>,
}

impl ScheduleTicker {
    pub fn new(
        resolver: Arc<ScheduleResolver>,
        special: Option<SpecialBroadcast>,
        clock: Arc<dyn Clock>,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        let (snapshots, _) = watch::channel(None);

        Self {
            context: TickerContext {
                resolver,
                special: special.map(Arc::new),
                clock,
                channel,
                snapshots: Arc::new(snapshots),
            },
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TickSnapshot>> {
        self.context.snapshots.subscribe()
    }

    /// Resolves once against the current clock without touching the running loop.
    pub fn snapshot_now(&self) -> TickSnapshot {
        self.context.snapshot(self.context.clock.now())
    }

    /// Starts the tick loop. Returns `false` if it is already running.
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(BackgroundTask::is_running) {
            log::warn!("Schedule ticker is already running");
            return false;
        }

        let context = self.context.clone();
        *task = Some(BackgroundTask::spawn("schedule ticker", move |token| {
            run_ticker(context, token)
        }));

        true
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(BackgroundTask::is_running)
    }

    pub async fn shutdown(&self) {
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.cancel(SHUTDOWN_TIMEOUT).await;
        }
    }
}

async fn run_ticker(context: TickerContext, cancellation_token: CancellationToken) {
    let mut previous_program: Option<String> = None;

    loop {
        let now = context.clock.now();
        let snapshot = context.snapshot(now);
        let current_program = snapshot.info.current.name().to_owned();

        context.snapshots.send_replace(Some(snapshot));

        if let Some(previous) = previous_program.as_deref() {
            if previous != current_program {
                log::info!("[NOW AIRING] {previous} -> {current_program}");
                context
                    .channel
                    .send_notification(StationNotification::NowAiring(current_program.clone()))
                    .await;
            }
        }
        previous_program = Some(current_program);

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::info!("Schedule ticker cancelled");
                break;
            }
            _ = tokio::time::sleep(delay_until_next_second(now)) => {}
        }
    }
}

/// Time left until the next wall-clock second boundary.
pub fn delay_until_next_second(now: DateTime<Utc>) -> Duration {
    let millis = now.timestamp_subsec_millis().min(999);
    Duration::from_millis(u64::from(1000 - millis))
}
