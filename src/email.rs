//! Email delivery of an issue to the subscriber list.
//!
//! The rendered HTML page is sent as the message body over authenticated SMTP
//! (STARTTLS, or implicit TLS on port 465). Delivery is optional: without SMTP
//! credentials or without subscribers the step is skipped, never failed.

use crate::utils::read_lines;
use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::{AsyncSmtpTransport, authentication::Credentials};
use lettre::{AsyncTransport, Tokio1Executor};
use std::error::Error;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Port that speaks TLS from the first byte instead of upgrading with STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP credentials, usually taken from `SMTP_*` environment variables.
#[derive(Clone, Default)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Sender address; falls back to `user`.
    pub from: Option<String>,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .finish()
    }
}

impl SmtpSettings {
    fn present(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Host, user and password are all set.
    pub fn is_configured(&self) -> bool {
        Self::present(&self.host).is_some()
            && Self::present(&self.user).is_some()
            && Self::present(&self.pass).is_some()
    }

    pub fn sender(&self) -> Option<&str> {
        Self::present(&self.from).or_else(|| Self::present(&self.user))
    }
}

/// What the delivery step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    NotConfigured,
    NoSubscribers,
    Sent { recipients: usize },
}

/// Build the HTML message addressed to every valid subscriber.
///
/// Subscribers that are not valid addresses are logged and left out. Returns
/// `Ok(None)` when no valid subscriber remains.
pub fn build_message(
    from: &str,
    subscribers: &[String],
    subject: &str,
    html: String,
) -> Result<Option<Message>, Box<dyn Error>> {
    let from: Mailbox = from.parse()?;
    let mut builder = Message::builder()
        .from(from)
        .subject(subject)
        .header(header::ContentType::TEXT_HTML);

    let mut recipients = 0usize;
    for address in subscribers {
        match address.parse::<Mailbox>() {
            Ok(mailbox) => {
                builder = builder.to(mailbox);
                recipients += 1;
            }
            Err(e) => warn!(%address, error = %e, "Skipping invalid subscriber address"),
        }
    }
    if recipients == 0 {
        return Ok(None);
    }
    Ok(Some(builder.body(html)?))
}

/// Email the page at `html_path` to the subscribers listed in `subscribers_path`.
///
/// The subject is `"<subject_prefix> <date>"`.
#[instrument(level = "info", skip_all, fields(html_path = %html_path.display(), date = %date))]
pub async fn send_issue(
    html_path: &Path,
    date: &str,
    subject_prefix: &str,
    subscribers_path: &Path,
    smtp: &SmtpSettings,
) -> Result<SendOutcome, Box<dyn Error>> {
    let (Some(host), Some(user), Some(pass), Some(from)) = (
        SmtpSettings::present(&smtp.host),
        SmtpSettings::present(&smtp.user),
        SmtpSettings::present(&smtp.pass),
        smtp.sender(),
    ) else {
        info!("SMTP not configured; skipping email");
        return Ok(SendOutcome::NotConfigured);
    };

    let subscribers = read_lines(subscribers_path).await;
    if subscribers.is_empty() {
        info!(path = %subscribers_path.display(), "No subscribers; skipping email");
        return Ok(SendOutcome::NoSubscribers);
    }

    let html = fs::read_to_string(html_path).await?;
    let subject = format!("{subject_prefix} {date}");
    let Some(message) = build_message(from, &subscribers, &subject, html)? else {
        warn!("No valid subscriber addresses; skipping email");
        return Ok(SendOutcome::NoSubscribers);
    };
    let recipients = message.envelope().to().len();

    let relay = if smtp.port == IMPLICIT_TLS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
    };
    let mailer = relay
        .port(smtp.port)
        .credentials(Credentials::new(user.to_string(), pass.to_string()))
        .build();

    mailer.send(message).await?;
    info!(recipients, %subject, "Sent issue email");
    Ok(SendOutcome::Sent { recipients })
}
