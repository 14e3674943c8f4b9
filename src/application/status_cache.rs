use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;

use crate::application::{AppError, AppResult, ProfileSource};
use crate::domain::Status;

/// Memoizes profile lookups for exactly one poll pass.
///
/// Create one per pass and drop it afterwards; a fresh pass always re-fetches.
/// Failures are memoized too, so a failing target costs one upstream call per pass.
pub struct PassStatusCache<'a> {
    source: &'a dyn ProfileSource,
    timeout: Duration,
    entries: HashMap<String, Result<Status, String>>,
}

impl<'a> PassStatusCache<'a> {
    pub fn new(source: &'a dyn ProfileSource, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            entries: HashMap::new(),
        }
    }

    pub async fn get(&mut self, target_key: &str) -> AppResult<Status> {
        if let Some(entry) = self.entries.get(target_key) {
            return entry.clone().map_err(AppError::SourceUnavailable);
        }

        let fetched = match tokio::time::timeout(self.timeout, self.source.fetch_status(target_key))
            .await
        {
            Ok(Ok(profile)) => Ok(Status::observed(profile, Utc::now())),
            Ok(Err(AppError::SourceUnavailable(msg))) => Err(msg),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("lookup timed out after {:?}", self.timeout)),
        };

        self.entries.insert(target_key.to_string(), fetched.clone());
        fetched.map_err(AppError::SourceUnavailable)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
