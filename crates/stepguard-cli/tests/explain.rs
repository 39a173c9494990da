use assert_cmd::Command;
use predicates::prelude::*;
use stepguard_types::explain;

#[allow(deprecated)]
fn stepguard_cmd() -> Command {
    Command::cargo_bin("stepguard").unwrap()
}

#[test]
fn explains_rule_kind() {
    stepguard_cmd()
        .args(["explain", "count"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Count Rule\n==========\n"))
        .stdout(predicate::str::contains("Remediation"));
}

#[test]
fn explains_every_error_code() {
    for code in explain::all_error_codes() {
        stepguard_cmd()
            .args(["explain", code])
            .assert()
            .success()
            .stdout(predicate::str::contains("Examples"));
    }
}

#[test]
fn unknown_identifier_exits_one() {
    stepguard_cmd()
        .args(["explain", "bogus"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Unknown error code or rule kind: bogus",
        ))
        .stderr(predicate::str::contains("  - network_failure"));
}
