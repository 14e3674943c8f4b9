use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::usecases::{BroadcastOnceUseCase, PollWatchesUseCase};
use crate::application::{
    BroadcastTargetStore, ContentProvider, DeliveryDispatcher, ProfileSource, WatchRegistry,
};

/// Fixed-cadence timing for a periodic task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    /// Delay before the first tick.
    pub warmup: Duration,
    pub interval: Duration,
}

impl Schedule {
    fn ticker(&self) -> tokio::time::Interval {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.warmup, self.interval);
        // a slow tick pushes the next one back instead of bursting to catch up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }
}

pub struct WatchPoller {
    pub registry: Arc<dyn WatchRegistry>,
    pub source: Arc<dyn ProfileSource>,
    pub dispatcher: DeliveryDispatcher,
    pub lookup_timeout: Duration,
}

/// Runs poll passes until `shutdown` fires. An in-flight pass is abandoned.
pub async fn run_watch_poller(
    poller: WatchPoller,
    schedule: Schedule,
    shutdown: CancellationToken,
) {
    let mut ticker = schedule.ticker();
    tracing::info!(interval = ?schedule.interval, "watch poller started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let pass = PollWatchesUseCase {
            registry: poller.registry.as_ref(),
            source: poller.source.as_ref(),
            dispatcher: &poller.dispatcher,
            lookup_timeout: poller.lookup_timeout,
        };

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("watch poller interrupted mid-pass");
                break;
            }
            result = pass.execute() => {
                match result {
                    Ok(r) => tracing::info!(
                        scanned = r.scanned,
                        delivered = r.delivered,
                        unmatched = r.unmatched,
                        unavailable = r.unavailable,
                        failed = r.failed,
                        "poll pass completed"
                    ),
                    Err(e) => tracing::error!("poll pass aborted: {e}"),
                }
            }
        }
    }

    tracing::info!("watch poller stopped");
}

pub struct BroadcastScheduler {
    pub targets: Arc<dyn BroadcastTargetStore>,
    pub content: Arc<dyn ContentProvider>,
    pub dispatcher: DeliveryDispatcher,
    pub purposes: Vec<String>,
}

/// Runs broadcast ticks until `shutdown` fires. Prior failures never shift the cadence.
pub async fn run_broadcast_scheduler(
    scheduler: BroadcastScheduler,
    schedule: Schedule,
    shutdown: CancellationToken,
) {
    let mut ticker = schedule.ticker();
    tracing::info!(
        warmup = ?schedule.warmup,
        interval = ?schedule.interval,
        purposes = ?scheduler.purposes,
        "broadcast scheduler started"
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let tick = BroadcastOnceUseCase {
            targets: scheduler.targets.as_ref(),
            content: scheduler.content.as_ref(),
            dispatcher: &scheduler.dispatcher,
            purposes: &scheduler.purposes,
        };

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("broadcast scheduler interrupted mid-tick");
                break;
            }
            r = tick.execute() => tracing::info!(
                targets = r.targets,
                delivered = r.delivered,
                failed = r.failed,
                skipped_purposes = r.skipped_purposes,
                "broadcast tick completed"
            ),
        }
    }

    tracing::info!("broadcast scheduler stopped");
}
