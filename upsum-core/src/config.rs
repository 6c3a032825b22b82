use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_MAIL_FROM: &str = "upsum@example.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Extra time network clients get beyond the pipeline's own bound, so the
/// pipeline deadline always fires first.
pub const CLIENT_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Language the prompt, fixed sentences and subject are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ko" | "kr" | "korean" => Ok(Locale::Ko),
            "en" | "english" => Ok(Locale::En),
            other => Err(format!("unsupported language '{other}', expected 'ko' or 'en'")),
        }
    }
}

/// SMTP connection and addressing parameters.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Empty means unauthenticated submission.
    pub user: String,
    pub password: String,
    /// Empty falls back to [`DEFAULT_MAIL_FROM`].
    pub from: String,
    pub to: String,
}

impl SmtpSettings {
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }

    pub fn sender(&self) -> &str {
        if self.from.is_empty() {
            DEFAULT_MAIL_FROM
        } else {
            &self.from
        }
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password_set", &!self.password.is_empty())
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Everything one run needs, built once at startup and never mutated.
#[derive(Clone)]
pub struct PipelineConfig {
    pub log_dir: PathBuf,
    /// Overrides `log_dir` when set.
    pub log_file: Option<PathBuf>,
    pub dry_run: bool,
    pub api_key: String,
    pub model: String,
    pub smtp: SmtpSettings,
    pub timeout: Duration,
    pub locale: Locale,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("log_dir", &self.log_dir)
            .field("log_file", &self.log_file)
            .field("dry_run", &self.dry_run)
            .field("api_key_len", &self.api_key.len())
            .field("model", &self.model)
            .field("smtp", &self.smtp)
            .field("timeout", &self.timeout)
            .field("locale", &self.locale)
            .finish()
    }
}

impl PipelineConfig {
    /// Timeout for the HTTP and SMTP clients: strictly longer than [`Self::timeout`].
    pub fn client_timeout(&self) -> Duration {
        self.timeout + CLIENT_TIMEOUT_GRACE
    }

    pub fn trace_loaded(&self) {
        info!(
            log_dir = %self.log_dir.display(),
            log_file = ?self.log_file,
            dry_run = self.dry_run,
            model = %self.model,
            smtp_host = %self.smtp.host,
            smtp_port = self.smtp.port,
            authenticated = self.smtp.has_credentials(),
            timeout_secs = self.timeout.as_secs(),
            locale = ?self.locale,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}
