use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::{AppError, AppResult, ProfileSource};
use crate::domain::ObservedProfile;

/// Scripted profile source that counts upstream calls per handle.
/// Unknown handles fail as unavailable.
#[derive(Clone, Default)]
pub struct FakeProfileSource {
    inner: Arc<Mutex<FakeInner>>,
}

#[derive(Default)]
struct FakeInner {
    profiles: HashMap<String, Result<ObservedProfile, String>>,
    delays: HashMap<String, Duration>,
    calls: HashMap<String, u32>,
}

impl FakeProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target is online and playing `activity` (or idle when `None`).
    pub fn set_playing(&self, handle: &str, activity: Option<&str>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.profiles.insert(
            handle.to_string(),
            Ok(ObservedProfile {
                observed_activity: activity.map(str::to_string),
                online: true,
            }),
        );
    }

    pub fn set_failing(&self, handle: &str, reason: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .profiles
            .insert(handle.to_string(), Err(reason.to_string()));
    }

    /// Every lookup of `handle` waits this long before answering.
    pub fn set_delay(&self, handle: &str, delay: Duration) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.delays.insert(handle.to_string(), delay);
    }

    pub fn calls(&self, handle: &str) -> u32 {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.calls.get(handle).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ProfileSource for FakeProfileSource {
    async fn fetch_status(&self, target_key: &str) -> AppResult<ObservedProfile> {
        let (answer, delay) = {
            let mut inner = self
                .inner
                .lock()
                .map_err(|_| AppError::SourceUnavailable("lock poisoned".into()))?;
            *inner.calls.entry(target_key.to_string()).or_default() += 1;
            (
                inner.profiles.get(target_key).cloned(),
                inner.delays.get(target_key).copied(),
            )
        };

        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }

        match answer {
            Some(Ok(p)) => Ok(p),
            Some(Err(reason)) => Err(AppError::SourceUnavailable(reason)),
            None => Err(AppError::SourceUnavailable(format!(
                "unknown profile {}",
                target_key
            ))),
        }
    }
}
