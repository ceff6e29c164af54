//! Reminder run over every open pull request of a repository.
//!
//! A run is strictly sequential: probe the server, list open pull requests,
//! then for each one fetch what the gates need, decide, and post at most
//! one comment. The first failed request aborts the whole run.

use crate::error::AppError;
use crate::services::bitbucket_client::BitbucketClient;
use crate::services::reminder::{self, BuildHealth, Reminder, Staleness, Thresholds};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Options for a reminder run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Day thresholds for the staleness and activity gates.
    pub thresholds: Thresholds,

    /// Log the comments instead of posting them.
    pub dry_run: bool,
}

/// What happened to a single pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Updated too soon after creation to need a nudge.
    Fresh,
    /// Someone engaged within the activity window.
    RecentlyActive,
    /// Passed both gates but no rule matched.
    NoAction,
    /// A reminder was chosen (and posted unless this was a dry run).
    Reminded(Reminder),
}

/// Counts gathered over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pull requests examined.
    pub examined: usize,

    /// Pull requests skipped as fresh.
    pub fresh: usize,

    /// Pull requests skipped because of recent engagement.
    pub recently_active: usize,

    /// Pull requests that passed the gates but needed nothing.
    pub no_action: usize,

    /// Reminders chosen, keyed by [`Reminder::kind`].
    pub reminders: BTreeMap<&'static str, usize>,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.examined += 1;
        match outcome {
            Outcome::Fresh => self.fresh += 1,
            Outcome::RecentlyActive => self.recently_active += 1,
            Outcome::NoAction => self.no_action += 1,
            Outcome::Reminded(r) => *self.reminders.entry(r.kind()).or_insert(0) += 1,
        }
    }

    /// Total number of reminders chosen.
    pub fn reminded(&self) -> usize {
        self.reminders.values().sum()
    }
}

/// Process every open pull request, using the wall clock as "now".
pub async fn run(client: &BitbucketClient, config: &RunConfig) -> Result<RunSummary, AppError> {
    run_at(client, config, Utc::now()).await
}

/// Process every open pull request as of `now`.
pub async fn run_at(
    client: &BitbucketClient,
    config: &RunConfig,
    now: DateTime<Utc>,
) -> Result<RunSummary, AppError> {
    client.status().await?;
    log::info!(
        "Connected to {} ({}/{})",
        client.config().base_url,
        client.config().project,
        client.config().repository
    );

    let pr_ids = client.list_open_pull_request_ids().await?;
    let mut summary = RunSummary::default();

    if pr_ids.is_empty() {
        log::info!("No open pull requests");
        return Ok(summary);
    }

    log::info!("Found {} open pull request(s)", pr_ids.len());

    for pr_id in pr_ids {
        let outcome = process_pull_request(client, config, pr_id, now).await?;
        summary.record(&outcome);
    }

    Ok(summary)
}

/// Decide on, and post, the reminder for one pull request.
pub async fn process_pull_request(
    client: &BitbucketClient,
    config: &RunConfig,
    pr_id: u64,
    now: DateTime<Utc>,
) -> Result<Outcome, AppError> {
    let pr = client.get_pull_request(pr_id).await?;

    match reminder::staleness(&pr, now, &config.thresholds)? {
        Staleness::Stale => {
            let reminder = Reminder::SuggestDecline;
            post(client, config, pr_id, &reminder).await?;
            return Ok(Outcome::Reminded(reminder));
        }
        Staleness::Fresh => {
            log::info!("PR #{}: fresh, no action", pr_id);
            return Ok(Outcome::Fresh);
        }
        Staleness::Due => {}
    }

    let activities = client.get_activities(pr_id).await?;
    if reminder::recently_engaged(&activities, now, &config.thresholds) {
        log::info!("PR #{}: recently active, no action", pr_id);
        return Ok(Outcome::RecentlyActive);
    }

    let build = fetch_build_health(client, pr_id).await?;
    log::debug!("PR #{}: build {:?}", pr_id, build);

    match reminder::evaluate(&build, &pr)? {
        Some(reminder) => {
            post(client, config, pr_id, &reminder).await?;
            Ok(Outcome::Reminded(reminder))
        }
        None => {
            log::info!("PR #{}: no action required", pr_id);
            Ok(Outcome::NoAction)
        }
    }
}

async fn fetch_build_health(client: &BitbucketClient, pr_id: u64) -> Result<BuildHealth, AppError> {
    let latest = client.get_latest_commit(pr_id).await?;
    let statuses = match &latest {
        Some(commit) => client.get_build_statuses(&commit.id).await?,
        None => Vec::new(),
    };
    Ok(BuildHealth::assess(latest.as_ref(), &statuses))
}

async fn post(
    client: &BitbucketClient,
    config: &RunConfig,
    pr_id: u64,
    reminder: &Reminder,
) -> Result<(), AppError> {
    let body = reminder.comment_body();
    if config.dry_run {
        log::info!("PR #{}: would post {} comment:\n{}", pr_id, reminder.kind(), body);
        return Ok(());
    }
    client.add_comment(pr_id, &body).await?;
    log::info!("PR #{}: posted {} comment", pr_id, reminder.kind());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&Outcome::Fresh);
        summary.record(&Outcome::RecentlyActive);
        summary.record(&Outcome::Reminded(Reminder::BuildBroken));
        summary.record(&Outcome::Reminded(Reminder::BuildBroken));
        summary.record(&Outcome::Reminded(Reminder::SuggestDecline));
        summary.record(&Outcome::NoAction);

        assert_eq!(summary.examined, 6);
        assert_eq!(summary.fresh, 1);
        assert_eq!(summary.recently_active, 1);
        assert_eq!(summary.no_action, 1);
        assert_eq!(summary.reminders.get("build-broken"), Some(&2));
        assert_eq!(summary.reminded(), 3);
    }

    #[test]
    fn test_default_run_config() {
        let config = RunConfig::default();
        assert!(!config.dry_run);
        assert_eq!(config.thresholds, Thresholds::default());
    }
}
