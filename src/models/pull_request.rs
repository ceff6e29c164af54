//! Pull request model as returned by the Bitbucket Server 1.0 REST API.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a participant on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewerRole {
    Author,
    Reviewer,
    Participant,
    #[serde(other)]
    Other,
}

/// Approval status a participant has given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewerStatus {
    Approved,
    Unapproved,
    NeedsWork,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ReviewerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::Unapproved => write!(f, "UNAPPROVED"),
            Self::NeedsWork => write!(f, "NEEDS_WORK"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// Bitbucket user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitbucketUser {
    /// Login name, used for `@mentions`.
    pub name: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub slug: Option<String>,
}

/// A user attached to a pull request (author, reviewer or participant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reviewer {
    pub user: BitbucketUser,
    pub role: ReviewerRole,
    pub status: ReviewerStatus,
}

impl Reviewer {
    /// Whether this entry was explicitly added as a reviewer.
    pub fn is_reviewer(&self) -> bool {
        self.role == ReviewerRole::Reviewer
    }
}

/// Open pull request with the fields the reminder checks read.
///
/// `createdDate` and `updatedDate` are epoch milliseconds. They are kept
/// optional here so a missing value surfaces as [`AppError::MissingField`]
/// rather than an opaque parse failure.
///
/// `reviewers` is `None` when the key is absent, which is not the same as
/// an empty list: only an explicit `[]` asks the author to add reviewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub state: Option<String>,
    pub created_date: Option<i64>,
    pub updated_date: Option<i64>,
    pub author: Option<Reviewer>,
    #[serde(default)]
    pub reviewers: Option<Vec<Reviewer>>,
}

impl PullRequest {
    /// Creation time, failing if the server omitted it.
    pub fn created_at(&self) -> Result<DateTime<Utc>, AppError> {
        self.timestamp(self.created_date, "createdDate")
    }

    /// Last update time, failing if the server omitted it.
    pub fn updated_at(&self) -> Result<DateTime<Utc>, AppError> {
        self.timestamp(self.updated_date, "updatedDate")
    }

    /// Login name of the author, if present.
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.user.name.as_str())
    }

    /// Login name of the author, failing if the server omitted it.
    pub fn require_author(&self) -> Result<&str, AppError> {
        self.author_name()
            .ok_or_else(|| AppError::missing_field(self.id, "author"))
    }

    /// Reviewer entries, empty when the key was absent.
    pub fn reviewer_entries(&self) -> &[Reviewer] {
        self.reviewers.as_deref().unwrap_or(&[])
    }

    /// True only when the server sent a reviewer list and it is empty.
    pub fn has_empty_reviewer_list(&self) -> bool {
        matches!(&self.reviewers, Some(reviewers) if reviewers.is_empty())
    }

    /// Names of REVIEWER-role entries still marked UNAPPROVED, in list order.
    pub fn unapproved_reviewers(&self) -> Vec<&str> {
        self.reviewer_entries()
            .iter()
            .filter(|r| r.is_reviewer() && r.status == ReviewerStatus::Unapproved)
            .map(|r| r.user.name.as_str())
            .collect()
    }

    /// True when no REVIEWER-role entry has a status other than APPROVED.
    ///
    /// Vacuously true when there are no REVIEWER-role entries.
    pub fn all_reviewers_approved(&self) -> bool {
        self.reviewer_entries()
            .iter()
            .filter(|r| r.is_reviewer())
            .all(|r| r.status == ReviewerStatus::Approved)
    }

    fn timestamp(&self, millis: Option<i64>, field: &str) -> Result<DateTime<Utc>, AppError> {
        let millis = millis.ok_or_else(|| AppError::missing_field(self.id, field))?;
        DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            AppError::invalid_input_field(
                format!("Timestamp {} out of range on pull request {}", millis, self.id),
                field,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 42,
            "version": 3,
            "title": "Add retry to uploader",
            "state": "OPEN",
            "open": true,
            "createdDate": 1700000000000,
            "updatedDate": 1700500000000,
            "author": {
                "user": { "name": "alice", "displayName": "Alice", "slug": "alice" },
                "role": "AUTHOR",
                "approved": false,
                "status": "UNAPPROVED"
            },
            "reviewers": [
                {
                    "user": { "name": "bob" },
                    "role": "REVIEWER",
                    "approved": true,
                    "status": "APPROVED"
                },
                {
                    "user": { "name": "carol" },
                    "role": "REVIEWER",
                    "approved": false,
                    "status": "UNAPPROVED"
                },
                {
                    "user": { "name": "dave" },
                    "role": "PARTICIPANT",
                    "approved": false,
                    "status": "UNAPPROVED"
                }
            ]
        }"#
    }

    #[test]
    fn test_deserialize_pull_request() {
        let pr: PullRequest = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(pr.id, 42);
        assert_eq!(pr.author_name(), Some("alice"));
        assert_eq!(pr.reviewer_entries().len(), 3);
        assert_eq!(pr.reviewer_entries()[0].status, ReviewerStatus::Approved);
        assert_eq!(pr.reviewer_entries()[2].role, ReviewerRole::Participant);
        assert!(!pr.has_empty_reviewer_list());
        assert_eq!(pr.created_at().unwrap().timestamp_millis(), 1700000000000);
    }

    #[test]
    fn test_unknown_role_and_status() {
        let json = r#"{ "user": { "name": "eve" }, "role": "WATCHER", "status": "SNOOZED" }"#;
        let reviewer: Reviewer = serde_json::from_str(json).unwrap();
        assert_eq!(reviewer.role, ReviewerRole::Other);
        assert_eq!(reviewer.status, ReviewerStatus::Other);
    }

    #[test]
    fn test_unapproved_reviewers_ignores_non_reviewers() {
        let pr: PullRequest = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(pr.unapproved_reviewers(), vec!["carol"]);
        assert!(!pr.all_reviewers_approved());
    }

    #[test]
    fn test_needs_work_is_not_unapproved() {
        let mut pr: PullRequest = serde_json::from_str(sample_json()).unwrap();
        if let Some(reviewers) = pr.reviewers.as_mut() {
            reviewers[1].status = ReviewerStatus::NeedsWork;
        }
        assert!(pr.unapproved_reviewers().is_empty());
        assert!(!pr.all_reviewers_approved());
    }

    #[test]
    fn test_missing_timestamps() {
        let pr: PullRequest = serde_json::from_str(r#"{ "id": 5 }"#).unwrap();
        let err = pr.created_at().unwrap_err();
        assert!(matches!(err, AppError::MissingField { pr_id: 5, ref field } if field == "createdDate"));
        assert!(pr.updated_at().is_err());
        assert!(pr.reviewers.is_none());
        assert!(pr.require_author().is_err());
    }

    #[test]
    fn test_absent_reviewers_differs_from_empty_list() {
        let absent: PullRequest = serde_json::from_str(r#"{ "id": 6 }"#).unwrap();
        assert!(absent.reviewer_entries().is_empty());
        assert!(!absent.has_empty_reviewer_list());
        assert!(absent.all_reviewers_approved());

        let empty: PullRequest = serde_json::from_str(r#"{ "id": 7, "reviewers": [] }"#).unwrap();
        assert!(empty.reviewer_entries().is_empty());
        assert!(empty.has_empty_reviewer_list());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ReviewerStatus::NeedsWork.to_string(), "NEEDS_WORK");
        assert_eq!(ReviewerStatus::Approved.to_string(), "APPROVED");
    }
}
