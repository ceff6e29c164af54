use clap::Parser;
use std::process::ExitCode;

use pr_reminders::services::bitbucket_client::{
    DEFAULT_BASE_URL, DEFAULT_PROJECT, DEFAULT_REPOSITORY,
};
use pr_reminders::services::reminder::{DEFAULT_QUIET_PERIOD_DAYS, DEFAULT_STALE_AFTER_DAYS};
use pr_reminders::{AppError, BitbucketClient, BitbucketClientConfig, RunConfig, Thresholds};

/// Post reminder comments on stale Bitbucket pull requests
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bitbucket Server base URL
    #[arg(long, env = "BITBUCKET_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Project key
    #[arg(long, env = "BITBUCKET_PROJECT", default_value = DEFAULT_PROJECT)]
    project: String,

    /// Repository slug
    #[arg(long, env = "BITBUCKET_REPO", default_value = DEFAULT_REPOSITORY)]
    repo: String,

    /// HTTP access token
    #[arg(long, env = "BITBUCKET_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Days after creation before a pull request is considered stale
    #[arg(long, default_value_t = DEFAULT_STALE_AFTER_DAYS)]
    stale_after_days: i64,

    /// Quiet period in days for the update and activity checks
    #[arg(long, default_value_t = DEFAULT_QUIET_PERIOD_DAYS)]
    quiet_period_days: i64,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Print the comments instead of posting them
    #[arg(long)]
    dry_run: bool,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let thresholds = Thresholds::from_days(cli.stale_after_days, cli.quiet_period_days)?;

    let client = BitbucketClient::new(BitbucketClientConfig {
        base_url: cli.url,
        project: cli.project,
        repository: cli.repo,
        token: cli.token,
        timeout_secs: cli.timeout_secs,
    })?;

    let config = RunConfig {
        thresholds,
        dry_run: cli.dry_run,
    };

    let summary = pr_reminders::run(&client, &config).await?;
    log::info!(
        "Done: {} examined, {} reminded, {} fresh, {} recently active, {} needed nothing",
        summary.examined,
        summary.reminded(),
        summary.fresh,
        summary.recently_active,
        summary.no_action
    );
    for (kind, count) in &summary.reminders {
        log::info!("  {}: {}", kind, count);
    }

    Ok(())
}
