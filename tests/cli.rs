//! CLI smoke tests for the headless subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trips() -> Command {
    Command::cargo_bin("trips").expect("binary builds")
}

#[test]
fn suggest_prints_matching_destinations() {
    trips()
        .args(["suggest", "ber"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Berlin"))
        .stdout(predicate::str::contains("loc:berlin"));
}

#[test]
fn suggest_rejects_an_empty_query() {
    trips()
        .args(["suggest", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-empty"));
}

#[test]
fn trending_lists_the_most_searched_destinations() {
    trips()
        .arg("trending")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tehran"))
        .stdout(predicate::str::contains("Berlin"))
        .stdout(predicate::str::contains("Hamburg"));
}

#[test]
fn history_starts_empty_and_records_plans() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().to_str().unwrap();

    trips()
        .args(["history", "--data-dir", data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));

    trips()
        .args([
            "plan",
            "--destination",
            "Berlin",
            "--start",
            "2026-09-01",
            "--end",
            "2026-09-08",
            "--guests",
            "2",
            "--data-dir",
            data_dir,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Berlin\""))
        .stdout(predicate::str::contains("\"guests\": 2"));

    trips()
        .args(["history", "--data-dir", data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("Berlin"));

    trips()
        .args(["history", "--clear", "--data-dir", data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("history cleared"));

    trips()
        .args(["history", "--data-dir", data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn plan_rejects_an_inverted_stay() {
    let dir = TempDir::new().unwrap();
    trips()
        .args([
            "plan",
            "--destination",
            "Berlin",
            "--start",
            "2026-09-08",
            "--end",
            "2026-09-01",
            "--data-dir",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid stay"));
}

#[test]
fn plan_falls_back_to_free_text_for_unknown_places() {
    let dir = TempDir::new().unwrap();
    trips()
        .args([
            "plan",
            "--destination",
            "Samarkand",
            "--start",
            "2026-09-01",
            "--end",
            "2026-09-03",
            "--data-dir",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("free:Samarkand"))
        .stdout(predicate::str::contains("\"type\": \"free\""));
}

#[test]
fn headless_tui_checks_the_sources() {
    trips()
        .args(["tui", "--once"])
        .env("TUI_HEADLESS", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("sources ok"));
}
