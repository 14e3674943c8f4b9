use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the profile source reports about a target right now.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedProfile {
    /// Name of the game/activity the target is engaged in, if any.
    pub observed_activity: Option<String>,
    pub online: bool,
}

/// Pass-scoped status snapshot entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub observed_activity: Option<String>,
    pub online: bool,
    pub observed_at: DateTime<Utc>,
}

impl Status {
    pub fn observed(profile: ObservedProfile, at: DateTime<Utc>) -> Self {
        Self {
            observed_activity: profile.observed_activity,
            online: profile.online,
            observed_at: at,
        }
    }
}
