use crate::application::{AppResult, BroadcastTargetStore, WatchRegistry};
use crate::domain::{BroadcastTarget, NewNotifyRequest, NotifyRequest};

/// Foreground operations on the watch registry.
pub struct ManageWatchesUseCase<'a> {
    pub registry: &'a dyn WatchRegistry,
}

impl<'a> ManageWatchesUseCase<'a> {
    pub async fn register_watch(&self, request: NewNotifyRequest) -> AppResult<i64> {
        let request = request.validate()?;
        let id = self.registry.add(request.clone()).await?;
        tracing::info!(
            request_id = id,
            watcher = %request.watcher_id,
            target = %request.target_handle,
            scope = %request.scope,
            "watch registered"
        );
        Ok(id)
    }

    pub async fn list_watches(&self, watcher_id: &str) -> AppResult<Vec<NotifyRequest>> {
        self.registry.list_by_watcher(watcher_id).await
    }

    pub async fn remove_watch(&self, id: i64) -> AppResult<()> {
        self.registry.remove(id).await?;
        tracing::info!(request_id = id, "watch removed");
        Ok(())
    }
}

pub struct RegisterBroadcastTargetUseCase<'a> {
    pub store: &'a dyn BroadcastTargetStore,
}

impl<'a> RegisterBroadcastTargetUseCase<'a> {
    pub async fn execute(
        &self,
        destination_id: &str,
        channel_ref: Option<&str>,
        purpose: &str,
    ) -> AppResult<()> {
        let target = BroadcastTarget::new(destination_id, channel_ref, purpose)?;
        self.store.upsert_target(&target).await?;
        tracing::info!(
            destination = %target.destination_id,
            purpose = %target.purpose,
            "broadcast target registered"
        );
        Ok(())
    }
}
