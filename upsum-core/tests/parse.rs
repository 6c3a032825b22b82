use upsum_core::parse::{parse, PackageTransition, ParsedUpdateFacts};

fn transition(name: &str, from: Option<&str>, to: &str) -> PackageTransition {
    PackageTransition {
        name: name.to_string(),
        from: from.map(str::to_string),
        to: to.to_string(),
    }
}

#[test]
fn openssl_upgrade_with_reboot_scenario() {
    let facts = parse(
        "Upgrade: openssl (1.1.1w-0+deb11u1 -> 1.1.1w-0+deb11u2)\nSystem will be rebooting now",
    );
    assert_eq!(
        facts,
        ParsedUpdateFacts {
            reboot_required: true,
            package_transitions: vec![transition(
                "openssl",
                Some("1.1.1w-0+deb11u1"),
                "1.1.1w-0+deb11u2"
            )],
            dietpi_update: None,
        }
    );
}

#[test]
fn reboot_phrases_match_in_any_case() {
    for text in [
        "A REBOOT IS REQUIRED to finish",
        "*** System restart: Reboot Is Required ***",
        "Rebooting in 5 minutes",
        "rebooting",
    ] {
        assert!(parse(text).reboot_required, "expected reboot for {text:?}");
    }
}

#[test]
fn no_trigger_phrase_means_no_reboot() {
    for text in ["", "Upgrade: vim (1 -> 2)", "reboot not needed", "the system was rebooted"] {
        assert!(!parse(text).reboot_required, "unexpected reboot for {text:?}");
    }
}

#[test]
fn transitions_keep_log_order_and_duplicates() {
    let log = "\
Start-Date: 2024-05-01  06:25:01
Upgrade: libssl1.1 (1.1.1w-0+deb11u1 -> 1.1.1w-0+deb11u2)
Install: new-package (1.0.0)
Upgrade: unattended-upgrades (2.8 -> 2.9)
Upgrade: libssl1.1 (1.1.1w-0+deb11u1 -> 1.1.1w-0+deb11u2)
End-Date: 2024-05-01  06:25:40
";
    let facts = parse(log);
    assert_eq!(
        facts.package_transitions,
        vec![
            transition("libssl1.1", Some("1.1.1w-0+deb11u1"), "1.1.1w-0+deb11u2"),
            transition("new-package", None, "1.0.0"),
            transition("unattended-upgrades", Some("2.8"), "2.9"),
            transition("libssl1.1", Some("1.1.1w-0+deb11u1"), "1.1.1w-0+deb11u2"),
        ]
    );
}

#[test]
fn simple_upgrade_and_install_lines() {
    let facts = parse("Upgrade: pkg (1.0 -> 1.1)\nInstall: pkg (2.0)");
    assert_eq!(
        facts.package_transitions,
        vec![transition("pkg", Some("1.0"), "1.1"), transition("pkg", None, "2.0")]
    );
}

#[test]
fn malformed_entries_are_skipped_without_error() {
    let log = "\
Upgrade: broken (1.0 -> )
Install: also broken ()
Upgrade: ok (1.0 -> 2.0)
Remove: gone (3.0)
";
    let facts = parse(log);
    assert_eq!(facts.package_transitions, vec![transition("ok", Some("1.0"), "2.0")]);
}

#[test]
fn empty_and_garbage_input_yield_empty_facts() {
    assert_eq!(parse(""), ParsedUpdateFacts::default());
    assert_eq!(parse("\u{0}\u{1}}{)(->"), ParsedUpdateFacts::default());
}

#[test]
fn parsing_is_deterministic() {
    let log = "Upgrade: a (1 -> 2)\nInstall: b (3)\nDietPi-Update : v9.2.0 is now available\nrebooting";
    assert_eq!(parse(log), parse(log));
    assert_eq!(parse(log).dietpi_update.as_deref(), Some("9.2.0"));
}
