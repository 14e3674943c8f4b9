use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a watch notification goes once it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Private,
    Group,
}

impl Scope {
    pub fn parse(s: &str) -> Result<Self, RequestError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(Scope::Private),
            "group" => Ok(Scope::Group),
            other => Err(RequestError::UnknownScope(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Private => "private",
            Scope::Group => "group",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An addressable delivery endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// The watcher's private chat.
    Watcher { watcher_id: String },
    /// A group chat, optionally narrowed to a topic/thread.
    Group {
        group_id: String,
        channel_ref: Option<String>,
    },
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Watcher { watcher_id } => write!(f, "watcher:{}", watcher_id),
            Destination::Group {
                group_id,
                channel_ref: Some(channel),
            } => write!(f, "group:{}#{}", group_id, channel),
            Destination::Group { group_id, .. } => write!(f, "group:{}", group_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("watcher id must not be empty")]
    EmptyWatcher,
    #[error("target handle must not be empty")]
    EmptyTarget,
    #[error("game pattern must not be empty")]
    EmptyPattern,
    #[error("unknown scope: {0} (expected private or group)")]
    UnknownScope(String),
    #[error("group scope requires a group destination")]
    MissingGroup,
    #[error("broadcast destination and purpose must not be empty")]
    InvalidBroadcastTarget,
}
