//! Reminder decision logic.
//!
//! Pure functions that decide which (if any) reminder comment a pull
//! request should receive. Network access stays in [`super::runner`]; the
//! functions here only look at data that has already been fetched.
//!
//! Order of evaluation for one pull request:
//! 1. [`staleness`]: too old gets a decline suggestion, too fresh gets nothing.
//! 2. [`recently_engaged`]: recent comments/reviews/approvals suppress the rest.
//! 3. [`evaluate`]: build, reviewers, approvals, merge readiness; first match wins.

use crate::error::AppError;
use crate::models::{Activity, BuildStatus, Commit, PullRequest};
use chrono::{DateTime, Duration, Utc};

/// Default age after which a pull request is considered abandoned.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 10;

/// Default quiet period used by both the update and the activity gates.
pub const DEFAULT_QUIET_PERIOD_DAYS: i64 = 2;

/// Day thresholds used by the gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Pull requests strictly older than this get a decline suggestion.
    pub stale_after: Duration,

    /// Checks run only when `updated - created` is strictly longer than this.
    pub update_window: Duration,

    /// Engagement strictly younger than this suppresses the checks.
    pub activity_window: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stale_after: Duration::days(DEFAULT_STALE_AFTER_DAYS),
            update_window: Duration::days(DEFAULT_QUIET_PERIOD_DAYS),
            activity_window: Duration::days(DEFAULT_QUIET_PERIOD_DAYS),
        }
    }
}

impl Thresholds {
    /// Build thresholds from whole days.
    pub fn from_days(stale_after: i64, quiet_period: i64) -> Result<Self, AppError> {
        let stale_after = positive_days(stale_after, "stale_after_days")?;
        let quiet_period = positive_days(quiet_period, "quiet_period_days")?;
        Ok(Self {
            stale_after,
            update_window: quiet_period,
            activity_window: quiet_period,
        })
    }
}

fn positive_days(days: i64, field: &str) -> Result<Duration, AppError> {
    if days <= 0 {
        return Err(AppError::invalid_input_field(
            "must be a positive number of days",
            field,
        ));
    }
    Duration::try_days(days)
        .ok_or_else(|| AppError::invalid_input_field("number of days out of range", field))
}

/// Outcome of the staleness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Older than the stale threshold: suggest declining, nothing else.
    Stale,
    /// Last update was too close to creation: leave it alone.
    Fresh,
    /// Old enough and updated long enough after creation: run the checks.
    Due,
}

/// Classify a pull request by its age and update period.
///
/// Fails when the pull request has no `createdDate` or `updatedDate`.
pub fn staleness(
    pr: &PullRequest,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> Result<Staleness, AppError> {
    let created = pr.created_at()?;
    let updated = pr.updated_at()?;

    let age = now - created;
    let update_period = updated - created;

    if age > thresholds.stale_after {
        Ok(Staleness::Stale)
    } else if update_period > thresholds.update_window {
        Ok(Staleness::Due)
    } else {
        Ok(Staleness::Fresh)
    }
}

/// Whether anyone commented, reviewed or approved inside the activity window.
pub fn recently_engaged(
    activities: &[Activity],
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> bool {
    activities
        .iter()
        .filter(|a| a.action.is_engagement())
        .filter_map(Activity::created_at)
        .any(|at| now - at < thresholds.activity_window)
}

/// State of the pull request's latest build, as far as the checks care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildHealth {
    /// The pull request has no commits at all.
    NoCommits,
    /// The latest commit has no build status reported.
    Unreported,
    /// Latest build on the latest commit is SUCCESSFUL.
    Passing,
    /// Latest build on the latest commit is anything else.
    Broken,
}

impl BuildHealth {
    /// Derive health from the latest commit and its statuses (latest first).
    pub fn assess(latest_commit: Option<&Commit>, statuses: &[BuildStatus]) -> Self {
        if latest_commit.is_none() {
            return Self::NoCommits;
        }
        match statuses.first() {
            None => Self::Unreported,
            Some(status) if status.is_successful() => Self::Passing,
            Some(_) => Self::Broken,
        }
    }

    /// Whether this warrants the build-broken reminder.
    pub fn is_broken(&self) -> bool {
        matches!(self, Self::NoCommits | Self::Broken)
    }
}

/// One of the canned reminder comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reminder {
    SuggestDecline,
    BuildBroken,
    NeedsReviewers { author: String },
    NeedsApproval { reviewers: Vec<String> },
    ReadyToMerge { author: String },
}

impl Reminder {
    /// Short identifier used in logs and run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SuggestDecline => "decline-suggestion",
            Self::BuildBroken => "build-broken",
            Self::NeedsReviewers { .. } => "needs-reviewers",
            Self::NeedsApproval { .. } => "needs-approval",
            Self::ReadyToMerge { .. } => "ready-to-merge",
        }
    }

    /// Plain-text comment body.
    pub fn comment_body(&self) -> String {
        let lines: Vec<String> = match self {
            Self::SuggestDecline => vec![
                "Good day sir,".to_string(),
                "It appears your review has gone rather stale!".to_string(),
                "May I suggest declining and performing further work?".to_string(),
            ],
            Self::BuildBroken => vec![
                "Sir,".to_string(),
                "I don't mean to alarm you but your current build is rather broken!".to_string(),
                "Some fixes should be in order.".to_string(),
            ],
            Self::NeedsReviewers { author } => vec![
                format!("Pardon me, @{},", author),
                "Your pull request would benefit from a reviewer or two.".to_string(),
                "May I suggest adding some?".to_string(),
            ],
            Self::NeedsApproval { reviewers } => vec![
                format!("Ehem, @{}", reviewers.join(", @")),
                "Your input is required to progress this review.".to_string(),
                "Kindly address this at your earliest convenience.".to_string(),
            ],
            Self::ReadyToMerge { author } => vec![
                format!("Pardon me, @{},", author),
                "With a passing build and approved reviewers, I see no reason not to merge this pull request!".to_string(),
                "Would you agree?".to_string(),
            ],
        };
        lines.join("\n")
    }
}

/// Run the rule chain on a pull request that passed both gates.
///
/// Rules, first match wins:
/// 1. broken build (or no commits)
/// 2. reviewer list present but empty
/// 3. REVIEWER-role entries still UNAPPROVED
/// 4. every REVIEWER-role entry APPROVED
pub fn evaluate(build: &BuildHealth, pr: &PullRequest) -> Result<Option<Reminder>, AppError> {
    if build.is_broken() {
        return Ok(Some(Reminder::BuildBroken));
    }

    if pr.has_empty_reviewer_list() {
        return Ok(Some(Reminder::NeedsReviewers {
            author: pr.require_author()?.to_string(),
        }));
    }

    let unapproved = pr.unapproved_reviewers();
    if !unapproved.is_empty() {
        return Ok(Some(Reminder::NeedsApproval {
            reviewers: unapproved.into_iter().map(String::from).collect(),
        }));
    }

    if pr.all_reviewers_approved() {
        return Ok(Some(Reminder::ReadyToMerge {
            author: pr.require_author()?.to_string(),
        }));
    }

    Ok(None)
}
