use async_trait::async_trait;

use crate::application::{AppResult, Transport};
use crate::domain::Destination;

/// Prints instead of sending. Used for dry runs.
pub struct ConsoleTransport;

impl ConsoleTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, destination: &Destination, text: &str) -> AppResult<()> {
        println!("SEND: to={} text={}", destination, text.replace('\n', " | "));
        Ok(())
    }
}
