#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use upsum_core::config::{Locale, PipelineConfig, SmtpSettings};

pub const OPENSSL_LOG: &str =
    "Upgrade: openssl (1.1.1w-0+deb11u1 -> 1.1.1w-0+deb11u2)\nSystem will be rebooting now";

pub fn config_for(log_dir: &Path) -> PipelineConfig {
    PipelineConfig {
        log_dir: log_dir.to_path_buf(),
        log_file: None,
        dry_run: false,
        api_key: "test-key".to_string(),
        model: "gemini-test".to_string(),
        smtp: SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: String::new(),
            to: "ops@example.com".to_string(),
        },
        timeout: Duration::from_secs(5),
        locale: Locale::En,
    }
}

/// Write `contents` to `dir/name` and pin its mtime to `secs` after the epoch.
pub fn write_log(dir: &Path, name: &str, contents: &str, secs: u64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write log");
    let file = fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .expect("reopen log");
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .expect("set mtime");
    path
}
