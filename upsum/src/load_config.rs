//! `load_config` module: builds the immutable [`PipelineConfig`] from CLI arguments and
//! environment variables (optionally seeded from a `.env` file by `main`).
//!
//! # Responsibilities
//! - Read every recognised variable exactly once, before the pipeline starts
//! - Report all missing required variables together in one [`ConfigError::Missing`]
//! - Apply defaults for optional variables and reject values that cannot be used
//! - Expand a leading `~` in log paths
//!
//! Loading is written against a lookup function so tests do not have to mutate the
//! process environment; [`load_config`] binds it to `std::env`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info};
use upsum_core::config::{
    Locale, PipelineConfig, SmtpSettings, DEFAULT_MODEL, DEFAULT_SMTP_PORT, DEFAULT_TIMEOUT,
};
use upsum_core::ConfigError;

/// Options that come from the command line rather than the environment.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub log_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub dry_run: bool,
}

/// Load from the process environment.
pub fn load_config(options: RunOptions) -> Result<PipelineConfig, ConfigError> {
    load_config_from(options, |key| std::env::var(key).ok())
}

/// Load using `lookup` for every variable. Empty values count as unset.
pub fn load_config_from<F>(options: RunOptions, lookup: F) -> Result<PipelineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let api_key = get("GEMINI_API_KEY");
    let smtp_host = get("SMTP_HOST");
    let mail_to = get("MAIL_TO");

    let mut missing = Vec::new();
    if api_key.is_none() {
        missing.push("GEMINI_API_KEY");
    }
    if smtp_host.is_none() {
        missing.push("SMTP_HOST");
    }
    if mail_to.is_none() {
        missing.push("MAIL_TO");
    }
    let (Some(api_key), Some(smtp_host), Some(mail_to)) = (api_key, smtp_host, mail_to) else {
        error!(?missing, "Required environment variables not set");
        return Err(ConfigError::Missing(missing));
    };

    let port = match get("SMTP_PORT") {
        Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
            error!(error = ?e, raw = %raw, "SMTP_PORT must be a valid port number");
            ConfigError::Invalid {
                var: "SMTP_PORT",
                reason: format!("'{raw}' is not a valid port number"),
            }
        })?,
        None => DEFAULT_SMTP_PORT,
    };

    let timeout = match get("UPSUM_TIMEOUT_SECS") {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                error!(raw = %raw, "UPSUM_TIMEOUT_SECS must be a positive integer");
                return Err(ConfigError::Invalid {
                    var: "UPSUM_TIMEOUT_SECS",
                    reason: format!("'{raw}' is not a positive number of seconds"),
                });
            }
        },
        None => DEFAULT_TIMEOUT,
    };

    let locale = match get("REPORT_LANGUAGE") {
        Some(raw) => raw
            .parse::<Locale>()
            .map_err(|reason| ConfigError::Invalid {
                var: "REPORT_LANGUAGE",
                reason,
            })?,
        None => Locale::default(),
    };

    let home = lookup("HOME");
    let config = PipelineConfig {
        log_dir: expand_home(&options.log_dir, home.as_deref()),
        log_file: options
            .log_file
            .as_deref()
            .map(|p| expand_home(p, home.as_deref())),
        dry_run: options.dry_run,
        api_key,
        model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        smtp: SmtpSettings {
            host: smtp_host,
            port,
            user: get("SMTP_USER").unwrap_or_default(),
            password: get("SMTP_PASSWORD").unwrap_or_default(),
            from: get("MAIL_FROM").unwrap_or_default(),
            to: mail_to,
        },
        timeout,
        locale,
    };

    info!("Configuration loaded from environment");
    config.trace_loaded();
    Ok(config)
}

/// Read only the API key, for commands that never touch mail or logs.
pub fn load_api_key() -> Result<String, ConfigError> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing(vec!["GEMINI_API_KEY"]))
}

/// Replace a leading `~` with `home`. Paths without one, or with no known
/// home, are returned unchanged.
pub fn expand_home(path: &Path, home: Option<&str>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) => Path::new(home).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_expands_against_home() {
        assert_eq!(
            expand_home(Path::new("~/logs"), Some("/home/pi")),
            PathBuf::from("/home/pi/logs")
        );
        assert_eq!(
            expand_home(Path::new("~"), Some("/home/pi")),
            PathBuf::from("/home/pi")
        );
        assert_eq!(
            expand_home(Path::new("/var/log/~x"), Some("/home/pi")),
            PathBuf::from("/var/log/~x")
        );
        assert_eq!(expand_home(Path::new("~/logs"), None), PathBuf::from("~/logs"));
    }
}
