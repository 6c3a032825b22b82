//! Log Parser: turn package-manager log text into [`ParsedUpdateFacts`].
//!
//! Parsing is total. Unknown or malformed content is skipped, never reported,
//! because upstream log formats carry no stability guarantee. Reading the file
//! ([`read_log`]) is the only fallible step of this stage.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::PipelineError;

const REBOOT_TRIGGERS: [&str; 2] = ["reboot is required", "rebooting"];

/// One upgrade or install event. `from` is `None` only for fresh installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTransition {
    pub name: String,
    pub from: Option<String>,
    pub to: String,
}

/// Normalised facts extracted from one log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUpdateFacts {
    pub reboot_required: bool,
    /// First-occurrence order, duplicates kept.
    pub package_transitions: Vec<PackageTransition>,
    /// DietPi release announced in the log, e.g. `9.1.1`.
    pub dietpi_update: Option<String>,
}

fn transition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // kind, name (arch qualifier dropped), first version, optional second version,
        // optional apt flags such as ", automatic"
        Regex::new(
            r"\b(Upgrade|Install):[ \t]*([\w.\-]+)(?::[a-z0-9]+)?[ \t]*\([ \t]*([\w.:~+\-]+)(?:[ \t]*->[ \t]*([\w.:~+\-]+))?[ \t]*(?:,[^)\n]*)?\)",
        )
        .expect("transition pattern is valid")
    })
}

fn dietpi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"DietPi-Update\s+:\s+v([\d.]+)\s+is\s+now\s+available")
            .expect("dietpi pattern is valid")
    })
}

/// True iff either trigger phrase occurs, ignoring case.
pub fn reboot_required(raw_text: &str) -> bool {
    let lowered = raw_text.to_lowercase();
    REBOOT_TRIGGERS.iter().any(|phrase| lowered.contains(phrase))
}

/// Every well-formed upgrade/install entry, in the order it appears.
pub fn package_transitions(raw_text: &str) -> Vec<PackageTransition> {
    transition_pattern()
        .captures_iter(raw_text)
        .filter_map(|caps| {
            let kind = caps.get(1)?.as_str();
            let name = caps.get(2)?.as_str().to_string();
            let first = caps.get(3)?.as_str().to_string();
            match (caps.get(4), kind) {
                (Some(second), _) => Some(PackageTransition {
                    name,
                    from: Some(first),
                    to: second.as_str().to_string(),
                }),
                (None, "Install") => Some(PackageTransition {
                    name,
                    from: None,
                    to: first,
                }),
                (None, _) => {
                    debug!(package = %name, "Skipping upgrade entry without a version pair");
                    None
                }
            }
        })
        .collect()
}

pub fn dietpi_update(raw_text: &str) -> Option<String> {
    dietpi_pattern()
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract all facts from raw log text. Never fails.
pub fn parse(raw_text: &str) -> ParsedUpdateFacts {
    let facts = ParsedUpdateFacts {
        reboot_required: reboot_required(raw_text),
        package_transitions: package_transitions(raw_text),
        dietpi_update: dietpi_update(raw_text),
    };
    info!(
        reboot_required = facts.reboot_required,
        transitions = facts.package_transitions.len(),
        dietpi_update = ?facts.dietpi_update,
        "Parsed update log"
    );
    match serde_json::to_string_pretty(&facts) {
        Ok(json) => debug!(json = %json, "Parsed facts as JSON"),
        Err(e) => error!(error = ?e, "Failed to serialize parsed facts as JSON"),
    }
    facts
}

/// Read a log file as text. Invalid UTF-8 is replaced rather than rejected.
pub fn read_log(path: &Path) -> Result<String, PipelineError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            debug!(path = %path.display(), size = bytes.len(), "Read log file");
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Failed to read log file");
            Err(PipelineError::LogUnreadable {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_qualifier_is_not_part_of_the_name() {
        let transitions = package_transitions("Upgrade: libc6:amd64 (2.36-9 -> 2.36-9+deb12u4)");
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].name, "libc6");
        assert_eq!(transitions[0].from.as_deref(), Some("2.36-9"));
        assert_eq!(transitions[0].to, "2.36-9+deb12u4");
    }

    #[test]
    fn epoch_and_tilde_versions_are_kept_whole() {
        let transitions = package_transitions("Upgrade: vim (2:9.0.1378-2 -> 2:9.0.1378-2~bpo1)");
        assert_eq!(transitions[0].from.as_deref(), Some("2:9.0.1378-2"));
        assert_eq!(transitions[0].to, "2:9.0.1378-2~bpo1");
    }

    #[test]
    fn apt_automatic_flag_is_tolerated() {
        let transitions = package_transitions("Install: libfoo1:arm64 (1.4-2, automatic)");
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, None);
        assert_eq!(transitions[0].to, "1.4-2");
    }

    #[test]
    fn upgrade_without_pair_is_skipped() {
        assert!(package_transitions("Upgrade: curl (8.0)").is_empty());
    }

    #[test]
    fn dietpi_version_is_extracted() {
        let text = "[ INFO ] DietPi-Update : v9.1.1 is now available";
        assert_eq!(dietpi_update(text).as_deref(), Some("9.1.1"));
        assert_eq!(dietpi_update("nothing here"), None);
    }
}
