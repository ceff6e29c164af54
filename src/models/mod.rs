//! Data models for the Bitbucket entities a reminder run inspects.
//!
//! All models are transient: they are fetched fresh for every run and
//! dropped once the pull request has been decided.

pub mod activity;
pub mod build_status;
pub mod commit;
pub mod page;
pub mod pull_request;

// Re-exports for convenient access
pub use activity::{Activity, ActivityAction};
pub use build_status::{BuildState, BuildStatus};
pub use commit::Commit;
pub use page::Page;
pub use pull_request::{BitbucketUser, PullRequest, Reviewer, ReviewerRole, ReviewerStatus};
