//! Commit model.

use serde::{Deserialize, Serialize};

/// Commit on a pull request. The server lists them latest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full commit hash.
    pub id: String,
    pub display_id: Option<String>,
    pub message: Option<String>,
    pub author_timestamp: Option<i64>,
}
