use crate::domain::{
    BroadcastTarget, Destination, NewNotifyRequest, NotifyRequest, ObservedProfile, RequestError,
};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::InvalidRequest(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Current observable state of a target, looked up by handle.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_status(&self, target_key: &str) -> AppResult<ObservedProfile>;
}

/// Durable store of pending notify requests.
///
/// `remove` is idempotent: a missing id is not an error, so a watcher's
/// removal racing the poller's retirement never faults either side.
#[async_trait]
pub trait WatchRegistry: Send + Sync {
    async fn add(&self, request: NewNotifyRequest) -> AppResult<i64>;
    async fn list_by_watcher(&self, watcher_id: &str) -> AppResult<Vec<NotifyRequest>>;
    async fn remove(&self, id: i64) -> AppResult<()>;
    async fn scan_all(&self) -> AppResult<Vec<NotifyRequest>>;
}

/// `(destination_id, purpose)` keyed table of broadcast targets.
#[async_trait]
pub trait BroadcastTargetStore: Send + Sync {
    async fn upsert_target(&self, target: &BroadcastTarget) -> AppResult<()>;
    async fn list_by_purpose(&self, purpose: &str) -> AppResult<Vec<BroadcastTarget>>;
}

/// Underlying send primitive of the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, destination: &Destination, text: &str) -> AppResult<()>;
}

/// Generates scheduled content. `None` means nothing to post for the purpose.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate(&self, purpose: &str) -> AppResult<Option<String>>;
}
