#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use steamsync::application::{AppError, AppResult, DeliveryDispatcher, Transport};
use steamsync::domain::Destination;

/// Records every successful send; destinations in `failing` are refused.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<(Destination, String)>>>,
    failing: Arc<Mutex<HashSet<Destination>>>,
    attempts: Arc<Mutex<u32>>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_for(&self, destination: Destination) {
        self.failing.lock().unwrap().insert(destination);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn sent(&self) -> Vec<(Destination, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }

    pub fn dispatcher(&self) -> DeliveryDispatcher {
        DeliveryDispatcher::new(Arc::new(self.clone()), Duration::from_secs(5))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, destination: &Destination, text: &str) -> AppResult<()> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.failing.lock().unwrap().contains(destination) {
            return Err(AppError::DeliveryFailed("refused".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.clone(), text.to_string()));
        Ok(())
    }
}

pub fn watcher(id: &str) -> Destination {
    Destination::Watcher {
        watcher_id: id.to_string(),
    }
}

pub fn group(id: &str, channel: Option<&str>) -> Destination {
    Destination::Group {
        group_id: id.to_string(),
        channel_ref: channel.map(str::to_string),
    }
}
