//! Business logic services.
//!
//! `bitbucket_client` owns every HTTP call, `reminder` holds the decision
//! logic as pure functions, and `runner` drives one pass over the open
//! pull requests.

pub mod bitbucket_client;
pub mod reminder;
pub mod runner;

pub use bitbucket_client::{BitbucketClient, BitbucketClientConfig};
pub use reminder::{BuildHealth, Reminder, Staleness, Thresholds};
pub use runner::{run, run_at, Outcome, RunConfig, RunSummary};
