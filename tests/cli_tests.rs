#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_adds_vacation_and_shows_hours() {
    run_cli("add 2025-03-10 22:00 2025-03-11 07:00 40 GE agent de sécurité\ncompute\nquit\n")
        .success()
        .stdout(str_contains("Added vacation id=1"))
        .stdout(str_contains("agent de sécurité"))
        .stdout(str_contains("ht=430.00"));
}

#[test]
fn cli_reports_invalid_vacation() {
    run_cli("add 2025-03-10 22:00 2025-03-10 06:00 40 GE\nquit\n")
        .success()
        .stdout(str_contains("is not after its start"));
}

#[test]
fn cli_delete_command_removes_vacation() {
    run_cli(
        "add 2025-03-10 08:00 2025-03-10 16:00 40 GE\nadd 2025-03-11 08:00 2025-03-11 16:00 40 GE\ndelete 2\ndelete 9\nquit\n",
    )
    .success()
    .stdout(str_contains("Deleted vacation 2."))
    .stdout(str_contains("Vacation 9 not found."));
}

#[test]
fn cli_groups_consecutive_shifts() {
    run_cli(
        "add 2025-03-10 08:00 2025-03-10 16:00 40 GE\nadd 2025-03-11 08:00 2025-03-11 16:00 40 GE\ngrouped\nquit\n",
    )
    .success()
    .stdout(str_contains("du 10.03.2025 au 11.03.2025"));
}

#[test]
fn cli_updates_settings_and_pause() {
    run_cli(
        "add 2025-03-10 18:00 2025-03-11 02:00 40 GE\npause 1 60 unpaid\nsettings vat 150\nsettings markup night 50\ncompute\nquit\n",
    )
    .success()
    .stdout(str_contains("pause set."))
    .stdout(str_contains("vat_pct must be between 0 and 100"))
    .stdout(str_contains("night markup set to 50%."))
    .stdout(str_contains("hours=7.00"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "client name Garage Central\nadd 2025-03-10 08:00 2025-03-10 16:00 40 GE\nsave json {}\nadd 2025-03-12 08:00 2025-03-12 12:00 99 VS\nload json {}\nshow\nquit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Quote loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Quote loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("2025-03-10 08:00"),
        "persisted vacation should remain:\n{}",
        after_reload
    );
    assert!(
        !after_reload.contains("2025-03-12"),
        "temporary vacation should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_preview_renders_document() {
    run_cli(
        "client name Garage Central\nadd 2025-03-10 08:00 2025-03-10 16:00 40 GE\nitem add 1 50 Badge\npreview\nquit\n",
    )
    .success()
    .stdout(str_contains("Garage Central"))
    .stdout(str_contains("Total TTC"));
}

#[test]
fn cli_reports_unknown_pause_policy() {
    run_cli("settings pause evenly\nsettings pause\nquit\n")
        .success()
        .stdout(str_contains("Error: unknown pause_allocation 'evenly'"))
        .stdout(str_contains("Usage: settings pause <normal_first|proportional>"));
}
