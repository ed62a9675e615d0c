//! Deployment configuration, read once at startup from `LEADS_*` environment
//! variables.
//!
//! Every setting has a default so the server starts with an empty environment;
//! each fallback is logged at `info`. Values that are present but malformed
//! (a port that is not a number, an operator address that is not a mailbox)
//! stop the server before it binds.

use std::{env, path::PathBuf, str::FromStr};

use lettre::message::Mailbox;
use log::info;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";
const DEFAULT_ENDPOINT_PATH: &str = "/form-handler.php";
const DEFAULT_TO_EMAIL: &str = "hello@soulfulkitchen.example";
const DEFAULT_FROM_EMAIL: &str = "Soulful Kitchen <no-reply@soulfulkitchen.example>";
const DEFAULT_EMAIL_SUBJECT: &str = "New Soulful Kitchen Inquiry";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CSV_NAME: &str = "submissions.csv";
const DEFAULT_SUCCESS_REDIRECT: &str = "success.html";
const DEFAULT_SITE_DIR: &str = "public";
const DEFAULT_MAX_BODY_BYTES: &str = "65536";
const DEFAULT_MAIL_TRANSPORT: &str = "sendmail";
const DEFAULT_SMTP_HOST: &str = "localhost";
const DEFAULT_SMTP_PORT: &str = "25";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("{key} must be a mailbox such as `Name <user@example.com>`: {message}")]
    InvalidMailbox { key: &'static str, message: String },

    #[error("unknown mail transport `{0}` (expected `sendmail` or `smtp`)")]
    UnknownTransport(String),
}

/// How the notifier hands messages to the mail system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// Pipe the message into the local `sendmail` binary. `None` uses lettre's
    /// default command.
    Sendmail { command: Option<PathBuf> },
    /// Plain SMTP to a relay on the local network.
    Smtp { host: String, port: u16 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Route the site's forms post to.
    pub endpoint_path: String,
    /// Operator address that receives every notification.
    pub to_email: Mailbox,
    pub from_email: Mailbox,
    pub email_subject: String,
    pub data_dir: PathBuf,
    pub csv_file: PathBuf,
    /// Page browsers are redirected to after a native form post.
    pub success_redirect: String,
    pub site_dir: PathBuf,
    pub max_body_bytes: usize,
    pub mail: MailTransport,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. `from_env` is
    /// this over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let load = |key: &'static str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| {
                info!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let data_dir = PathBuf::from(load("LEADS_DATA_DIR", DEFAULT_DATA_DIR));
        let csv_file = match lookup("LEADS_CSV_FILE") {
            Some(path) => PathBuf::from(path),
            None => data_dir.join(DEFAULT_CSV_NAME),
        };

        let mail = match load("LEADS_MAIL_TRANSPORT", DEFAULT_MAIL_TRANSPORT)
            .to_ascii_lowercase()
            .as_str()
        {
            "sendmail" => MailTransport::Sendmail {
                command: lookup("LEADS_SENDMAIL_PATH").map(PathBuf::from),
            },
            "smtp" => MailTransport::Smtp {
                host: load("LEADS_SMTP_HOST", DEFAULT_SMTP_HOST),
                port: parse("LEADS_SMTP_PORT", &load("LEADS_SMTP_PORT", DEFAULT_SMTP_PORT))?,
            },
            other => return Err(ConfigError::UnknownTransport(other.to_string())),
        };

        let mut endpoint_path = load("LEADS_ENDPOINT_PATH", DEFAULT_ENDPOINT_PATH);
        if !endpoint_path.starts_with('/') {
            endpoint_path.insert(0, '/');
        }

        Ok(Self {
            host: load("LEADS_HOST", DEFAULT_HOST),
            port: parse("LEADS_PORT", &load("LEADS_PORT", DEFAULT_PORT))?,
            endpoint_path,
            to_email: mailbox("LEADS_TO_EMAIL", &load("LEADS_TO_EMAIL", DEFAULT_TO_EMAIL))?,
            from_email: mailbox("LEADS_FROM_EMAIL", &load("LEADS_FROM_EMAIL", DEFAULT_FROM_EMAIL))?,
            email_subject: load("LEADS_EMAIL_SUBJECT", DEFAULT_EMAIL_SUBJECT),
            data_dir,
            csv_file,
            success_redirect: load("LEADS_SUCCESS_REDIRECT", DEFAULT_SUCCESS_REDIRECT),
            site_dir: PathBuf::from(load("LEADS_SITE_DIR", DEFAULT_SITE_DIR)),
            max_body_bytes: parse(
                "LEADS_MAX_BODY_BYTES",
                &load("LEADS_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            )?,
            mail,
        })
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            message: e.to_string(),
        })
}

fn mailbox(key: &'static str, value: &str) -> Result<Mailbox, ConfigError> {
    value.parse().map_err(|e: lettre::address::AddressError| ConfigError::InvalidMailbox {
        key,
        message: e.to_string(),
    })
}
