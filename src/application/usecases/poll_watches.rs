use std::time::Duration;

use crate::application::status_cache::PassStatusCache;
use crate::application::{AppResult, DeliveryDispatcher, ProfileSource, WatchRegistry};
use crate::domain::matches;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub scanned: usize,
    pub delivered: usize,
    pub unmatched: usize,
    pub unavailable: usize,
    pub failed: usize,
}

/// One watch poll pass: scan, resolve, match, dispatch, retire.
pub struct PollWatchesUseCase<'a> {
    pub registry: &'a dyn WatchRegistry,
    pub source: &'a dyn ProfileSource,
    pub dispatcher: &'a DeliveryDispatcher,
    pub lookup_timeout: Duration,
}

impl<'a> PollWatchesUseCase<'a> {
    pub async fn execute(&self) -> AppResult<PollReport> {
        let requests = self.registry.scan_all().await?;
        let mut cache = PassStatusCache::new(self.source, self.lookup_timeout);
        let mut report = PollReport {
            scanned: requests.len(),
            ..PollReport::default()
        };

        for request in requests {
            let status = match cache.get(&request.target_handle).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(
                        request_id = request.id,
                        target = %request.target_handle,
                        "status lookup failed, keeping request pending: {e}"
                    );
                    report.unavailable += 1;
                    continue;
                }
            };

            let Some(activity) = status
                .observed_activity
                .as_deref()
                .filter(|a| matches(Some(*a), &request.game_pattern))
            else {
                report.unmatched += 1;
                continue;
            };

            let destination = request.destination();
            let text = request.notification_text(activity);
            if let Err(e) = self.dispatcher.deliver(&destination, &text).await {
                tracing::warn!(
                    request_id = request.id,
                    destination = %destination,
                    "notification not delivered, will retry next pass: {e}"
                );
                report.failed += 1;
                continue;
            }

            // delivered: retire; a concurrent removal by the watcher is a no-op here
            if let Err(e) = self.registry.remove(request.id).await {
                tracing::error!(request_id = request.id, "failed to retire delivered request: {e}");
            }
            tracing::info!(
                request_id = request.id,
                target = %request.target_handle,
                activity = %activity,
                "watch matched and delivered"
            );
            report.delivered += 1;
        }

        Ok(report)
    }
}
