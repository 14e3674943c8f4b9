use std::sync::Arc;
use std::time::Duration;

use crate::application::{AppError, AppResult, Transport};
use crate::domain::Destination;

/// Sends plain text to a destination with a bounded wait.
///
/// Cheap to clone; safe to call from the poller and the broadcaster at once.
#[derive(Clone)]
pub struct DeliveryDispatcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl DeliveryDispatcher {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub async fn deliver(&self, destination: &Destination, message: &str) -> AppResult<()> {
        match tokio::time::timeout(self.timeout, self.transport.send(destination, message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(AppError::DeliveryFailed(e))) => Err(AppError::DeliveryFailed(e)),
            Ok(Err(e)) => Err(AppError::DeliveryFailed(e.to_string())),
            Err(_) => Err(AppError::DeliveryFailed(format!(
                "send to {} timed out after {:?}",
                destination, self.timeout
            ))),
        }
    }
}
