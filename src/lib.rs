//! PR Reminders - nudges stale Bitbucket pull requests.
//!
//! Polls a Bitbucket Server repository, picks at most one canned reminder
//! per open pull request (decline suggestion, broken build, missing
//! reviewers, missing approvals, ready to merge) and posts it as a comment.
//! Nothing is remembered between runs.

pub mod error;
pub mod models;
pub mod services;

pub use error::AppError;
pub use services::{
    run, run_at, BitbucketClient, BitbucketClientConfig, Outcome, Reminder, RunConfig, RunSummary,
    Thresholds,
};
