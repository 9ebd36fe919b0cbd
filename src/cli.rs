//! Command-line interface definitions.
//!
//! The CLI is defined with the `clap` crate. SMTP credentials are normally
//! supplied through `SMTP_*` environment variables rather than flags.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the digest.
///
/// # Examples
///
/// ```sh
/// # Generate today's issue (no-op if it already exists)
/// machine_cinema_news
///
/// # Regenerate today's issue and mail it to subscribers
/// machine_cinema_news generate --force --send-email
///
/// # Mail an already generated page
/// machine_cinema_news send --html site/2024-01-01.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Working root holding out/, site/ and data/
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    #[command(flatten)]
    pub smtp: SmtpArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate today's issue (the default)
    Generate {
        /// Generate even if today's issue already exists
        #[arg(short, long)]
        force: bool,

        /// Email the issue to subscribers after publishing
        #[arg(long)]
        send_email: bool,
    },
    /// Email an existing issue page to subscribers
    Send {
        /// Page to send; defaults to today's site/<date>.html
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

/// SMTP settings for the optional email step.
#[derive(Args, Debug, Clone)]
pub struct SmtpArgs {
    #[arg(long, env = "SMTP_HOST", hide_env_values = true)]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER", hide_env_values = true)]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    #[arg(long, env = "SMTP_FROM")]
    pub smtp_from: Option<String>,
}

impl Cli {
    /// The subcommand to run, `generate` without flags when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Generate {
            force: false,
            send_email: false,
        })
    }
}
