use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Destination, RequestError, Scope};

/// A pending "tell me when X plays Y" registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub id: i64,
    pub watcher_id: String,
    /// Re-resolved on every poll pass, never pinned at registration.
    pub target_handle: String,
    pub game_pattern: String,
    pub scope: Scope,
    /// Only set for `Scope::Group`.
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotifyRequest {
    pub fn destination(&self) -> Destination {
        match (self.scope, &self.group_id) {
            (Scope::Group, Some(group_id)) => Destination::Group {
                group_id: group_id.clone(),
                channel_ref: None,
            },
            _ => Destination::Watcher {
                watcher_id: self.watcher_id.clone(),
            },
        }
    }

    /// Plain-text notification sent when the request matches.
    pub fn notification_text(&self, observed_activity: &str) -> String {
        format!(
            "🎮 {} is now playing {} (watching for \"{}\")",
            self.target_handle, observed_activity, self.game_pattern
        )
    }
}

/// Registration input, validated before it reaches a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotifyRequest {
    pub watcher_id: String,
    pub target_handle: String,
    pub game_pattern: String,
    pub scope: Scope,
    #[serde(default)]
    pub group_id: Option<String>,
}

impl NewNotifyRequest {
    /// Trims every field and enforces the scope/destination invariant.
    /// A private request drops any group id it was given.
    pub fn validate(self) -> Result<Self, RequestError> {
        let watcher_id = self.watcher_id.trim().to_string();
        let target_handle = self.target_handle.trim().to_string();
        let game_pattern = self.game_pattern.trim().to_string();

        if watcher_id.is_empty() {
            return Err(RequestError::EmptyWatcher);
        }
        if target_handle.is_empty() {
            return Err(RequestError::EmptyTarget);
        }
        if game_pattern.is_empty() {
            return Err(RequestError::EmptyPattern);
        }

        let group_id = match self.scope {
            Scope::Group => {
                let g = self
                    .group_id
                    .map(|g| g.trim().to_string())
                    .filter(|g| !g.is_empty())
                    .ok_or(RequestError::MissingGroup)?;
                Some(g)
            }
            Scope::Private => None,
        };

        Ok(Self {
            watcher_id,
            target_handle,
            game_pattern,
            scope: self.scope,
            group_id,
        })
    }
}
