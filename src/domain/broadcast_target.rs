use serde::{Deserialize, Serialize};

use super::{Destination, RequestError};

pub const PURPOSE_DEALS: &str = "deals";

/// A scheduled-post destination. `(destination_id, purpose)` is the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastTarget {
    pub destination_id: String,
    /// Sub-channel (topic/thread) inside the destination.
    pub channel_ref: Option<String>,
    pub purpose: String,
}

impl BroadcastTarget {
    pub fn new(
        destination_id: &str,
        channel_ref: Option<&str>,
        purpose: &str,
    ) -> Result<Self, RequestError> {
        let destination_id = destination_id.trim();
        let purpose = purpose.trim();
        if destination_id.is_empty() || purpose.is_empty() {
            return Err(RequestError::InvalidBroadcastTarget);
        }
        Ok(Self {
            destination_id: destination_id.to_string(),
            channel_ref: channel_ref
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            purpose: purpose.to_string(),
        })
    }

    pub fn destination(&self) -> Destination {
        Destination::Group {
            group_id: self.destination_id.clone(),
            channel_ref: self.channel_ref.clone(),
        }
    }
}
