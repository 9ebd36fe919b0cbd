//! # Machine Cinema News
//!
//! A daily Polish-language AI news digest. Items are pulled from RSS feeds
//! (or a curated fallback file), filtered, deduplicated, checked against a
//! seen-cache and a deterministic selection is rendered to Markdown and a
//! static HTML site, optionally emailed to subscribers.
//!
//! ## Usage
//!
//! ```sh
//! machine_cinema_news --config config.yaml --root .
//! ```
//!
//! ## Architecture
//!
//! One sequential pass per day:
//! 1. **Guard**: stop if `site/<date>.html` exists (unless forced)
//! 2. **Fetching**: live feeds, curated file as fallback
//! 3. **Filtering**: relevance filter, URL dedup, seen-cache
//! 4. **Selection**: deterministic sort and slice
//! 5. **Output**: Markdown, issue page, `index.html`, archive, seen-cache
//! 6. **Email**: optional delivery of the page

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod canonical;
mod cli;
mod config;
mod email;
mod filters;
mod models;
mod outputs;
mod pipeline;
mod seen;
mod selector;
mod sources;
mod utils;

use cli::{Cli, Command};
use config::{Config, load_config};
use email::{SendOutcome, SmtpSettings, send_issue};
use outputs::html::issue_path;
use pipeline::{RunOutcome, RunSwitches, run_daily};
use sources::FeedSource;
use utils::{issue_date, now_pl, resolve_path};

/// Whether the environment variable `name` is set to `1`.
fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v.trim() == "1")
}

/// Resolve the run switches from the CLI and the configured environment variables.
fn switches_from_env(config: &Config, force_flag: bool) -> RunSwitches {
    RunSwitches {
        force_run: force_flag || env_flag(&config.guard.force_run_env),
        reset_cache: config
            .seen_cache
            .allow_reset_env
            .as_deref()
            .is_some_and(env_flag),
    }
}

fn smtp_settings(args: &cli::SmtpArgs) -> SmtpSettings {
    SmtpSettings {
        host: args.smtp_host.clone(),
        port: args.smtp_port,
        user: args.smtp_user.clone(),
        pass: args.smtp_pass.clone(),
        from: args.smtp_from.clone(),
    }
}

/// Send the page, logging instead of failing: email is never fatal.
async fn deliver(config: &Config, root: &std::path::Path, html_path: &std::path::Path, date: &str, smtp: &SmtpSettings) {
    let subscribers = resolve_path(root, &config.email.subscribers_path);
    match send_issue(html_path, date, &config.email.subject_prefix, &subscribers, smtp).await {
        Ok(SendOutcome::Sent { recipients }) => info!(recipients, "Email delivered"),
        Ok(outcome) => info!(?outcome, "Email skipped"),
        Err(e) => warn!(error = %e, "Email delivery failed"),
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("machine_cinema_news starting up");

    let args = Cli::parse();
    debug!(config = %args.config.display(), root = %args.root.display(), "Parsed CLI arguments");

    let config = match load_config(&args.config).await {
        Ok(config) => config,
        Err(e) => {
            error!(path = %args.config.display(), error = %e, "Failed to load configuration");
            return Err(e);
        }
    };
    let smtp = smtp_settings(&args.smtp);
    debug!(smtp_configured = smtp.is_configured(), "Resolved SMTP settings");

    let now = now_pl();
    match args.command() {
        Command::Generate { force, send_email } => {
            let switches = switches_from_env(&config, force);
            let source = FeedSource::from_config(&config, &args.root);
            match run_daily(&config, &args.root, &now, switches, &source).await? {
                RunOutcome::Published(issue) => {
                    info!(
                        date = %issue.date,
                        items = issue.item_count,
                        markdown = %issue.markdown_path.display(),
                        "Issue published"
                    );
                    if send_email {
                        deliver(&config, &args.root, &issue.html_path, &issue.date, &smtp).await;
                    }
                }
                RunOutcome::AlreadyPublished { date } => info!(%date, "Today's issue already exists. Exiting."),
                RunOutcome::NothingSelected { date } => warn!(%date, "Nothing to publish today"),
            }
        }
        Command::Send { html } => {
            let date = issue_date(&now);
            let html_path = html.unwrap_or_else(|| issue_path(&args.root.join("site"), &date));
            deliver(&config, &args.root, &html_path, &date, &smtp).await;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
