//! Build status model from the build-status 1.0 API.

use serde::{Deserialize, Serialize};

/// Result reported by a CI server for a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildState {
    Successful,
    Failed,
    #[serde(rename = "INPROGRESS")]
    InProgress,
    #[serde(other)]
    Other,
}

/// Build status attached to a commit.
///
/// The endpoint does not echo the commit hash back, so the client fills
/// `commit_id` in after fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub state: BuildState,
    pub key: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub date_added: Option<i64>,
    #[serde(skip)]
    pub commit_id: String,
}

impl BuildStatus {
    pub fn is_successful(&self) -> bool {
        self.state == BuildState::Successful
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_states() {
        let json = r#"[
            { "state": "SUCCESSFUL", "key": "REPO-MASTER", "name": "REPO-MASTER-42", "url": "https://ci/42", "dateAdded": 1380000000000 },
            { "state": "FAILED", "key": "REPO-MASTER" },
            { "state": "INPROGRESS", "key": "REPO-MASTER" },
            { "state": "CANCELLED", "key": "REPO-MASTER" }
        ]"#;
        let statuses: Vec<BuildStatus> = serde_json::from_str(json).unwrap();
        assert!(statuses[0].is_successful());
        assert_eq!(statuses[1].state, BuildState::Failed);
        assert_eq!(statuses[2].state, BuildState::InProgress);
        assert_eq!(statuses[3].state, BuildState::Other);
        assert!(statuses[0].commit_id.is_empty());
    }
}
