use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::application::{AppError, AppResult, BroadcastTargetStore, WatchRegistry};
use crate::domain::{BroadcastTarget, NewNotifyRequest, NotifyRequest};

/// Process-local registry. Every operation holds the lock for its whole
/// effect, so records are never observed half-written.
#[derive(Clone, Default)]
pub struct InMemoryWatchRegistry {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    requests: BTreeMap<i64, NotifyRequest>,
}

impl InMemoryWatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))
    }
}

#[async_trait]
impl WatchRegistry for InMemoryWatchRegistry {
    async fn add(&self, request: NewNotifyRequest) -> AppResult<i64> {
        let request = request.validate()?;
        let mut inner = self.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.requests.insert(
            id,
            NotifyRequest {
                id,
                watcher_id: request.watcher_id,
                target_handle: request.target_handle,
                game_pattern: request.game_pattern,
                scope: request.scope,
                group_id: request.group_id,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn list_by_watcher(&self, watcher_id: &str) -> AppResult<Vec<NotifyRequest>> {
        let inner = self.lock()?;
        Ok(inner
            .requests
            .values()
            .filter(|r| r.watcher_id == watcher_id)
            .cloned()
            .collect())
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        let mut inner = self.lock()?;
        inner.requests.remove(&id);
        Ok(())
    }

    async fn scan_all(&self) -> AppResult<Vec<NotifyRequest>> {
        let inner = self.lock()?;
        Ok(inner.requests.values().cloned().collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBroadcastTargetStore {
    targets: Arc<Mutex<HashMap<(String, String), BroadcastTarget>>>,
}

impl InMemoryBroadcastTargetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BroadcastTargetStore for InMemoryBroadcastTargetStore {
    async fn upsert_target(&self, target: &BroadcastTarget) -> AppResult<()> {
        let mut targets = self
            .targets
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        targets.insert(
            (target.destination_id.clone(), target.purpose.clone()),
            target.clone(),
        );
        Ok(())
    }

    async fn list_by_purpose(&self, purpose: &str) -> AppResult<Vec<BroadcastTarget>> {
        let targets = self
            .targets
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        let mut out: Vec<BroadcastTarget> = targets
            .values()
            .filter(|t| t.purpose == purpose)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.destination_id.cmp(&b.destination_id));
        Ok(out)
    }
}
