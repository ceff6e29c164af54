//! Pull request activity feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of action recorded in the activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Commented,
    Reviewed,
    Approved,
    Unapproved,
    Opened,
    Updated,
    Rescoped,
    Merged,
    Declined,
    Reopened,
    #[serde(other)]
    Other,
}

impl ActivityAction {
    /// Actions that show someone is actively working the review.
    pub fn is_engagement(self) -> bool {
        matches!(self, Self::Commented | Self::Reviewed | Self::Approved)
    }
}

/// A single entry of `GET .../pull-requests/{id}/activities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Option<u64>,
    pub action: ActivityAction,
    /// Epoch milliseconds.
    pub created_date: i64,
}

impl Activity {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_date)
    }
}
