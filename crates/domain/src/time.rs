//! Timestamps for entity updates and events.

use chrono::{DateTime, Utc};

/// UTC timestamp stored on entities (`last_changed`, `last_updated`) and events.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
