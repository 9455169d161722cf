#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(roster: &Path) -> Command {
    let mut cmd = Command::cargo_bin("toranut-cli").unwrap();
    cmd.arg("--roster").arg(roster);
    cmd
}

#[test]
fn import_generate_and_list() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let people = dir.path().join("people.csv");
    let slots = dir.path().join("slots.csv");
    fs::write(&people, "name,roles\nAvi,soldier\nDana,soldier\nEli,soldier\n").unwrap();
    fs::write(
        &slots,
        "date,type,soldiers,commanders,officers\n2025-10-06,regular,1,0,0\n",
    )
    .unwrap();

    cli(&roster)
        .args(["import-people", "--csv"])
        .arg(&people)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 person(s)"));
    cli(&roster)
        .args(["import-slots", "--csv"])
        .arg(&slots)
        .assert()
        .success();
    cli(&roster)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("created 2 assignment(s)"));
    cli(&roster)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-10-06 regular"))
        .stdout(predicate::str::contains("soldier → Avi"))
        .stdout(predicate::str::contains("soldier reserve → Dana"));
    cli(&roster)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));
}

#[test]
fn generate_without_people_is_incomplete() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["add-slot", "--date", "2025-10-06"])
        .assert()
        .success();
    cli(&roster)
        .arg("generate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("UNFILLED 2025-10-06 soldier"));
}

#[test]
fn duplicate_slot_fails() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["add-slot", "--date", "2025-10-09", "--type", "weekend"])
        .assert()
        .success();
    cli(&roster)
        .args(["add-slot", "--date", "2025-10-09", "--type", "weekend"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("slot already exists"));
}

#[test]
fn settings_are_persisted() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["settings", "--gap-weight", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gap_weight\": 7.0"));
    cli(&roster)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gap_weight\": 7.0"))
        .stdout(predicate::str::contains("\"fairness_weight\": 10.0"));
}

#[test]
fn plan_slots_and_block() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["plan-slots", "--start", "2025-10-05", "--end", "2025-10-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned 5 slot(s)"));
    cli(&roster)
        .args(["add-person", "--name", "Avi", "--roles", "soldier,officer"])
        .assert()
        .success();
    cli(&roster)
        .args(["block", "--person", "Avi", "--dates", "2025-10-06,2025-10-07"])
        .assert()
        .success();
    cli(&roster)
        .args(["block", "--person", "Nobody", "--dates", "2025-10-06"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown person: Nobody"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&roster).unwrap()).unwrap();
    let avi = &json["people"][0];
    assert_eq!(avi["is_officer"], true);
    assert_eq!(
        avi["blocked_dates"],
        serde_json::json!(["2025-10-06", "2025-10-07"])
    );
}

fn stdout_line(cmd: &mut Command) -> String {
    let out = cmd.output().unwrap();
    assert!(out.status.success());
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

#[test]
fn manual_assignments_and_clear() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["add-person", "--name", "Avi", "--roles", "soldier"])
        .assert()
        .success();
    let slot = stdout_line(cli(&roster).args([
        "add-slot",
        "--date",
        "2025-10-06",
        "--commanders",
        "0",
        "--officers",
        "0",
    ]));

    let locked = stdout_line(cli(&roster).args([
        "assign", "--slot", slot.as_str(), "--person", "Avi", "--role", "soldier", "--locked",
    ]));
    cli(&roster)
        .args(["assign", "--slot", slot.as_str(), "--person", "Avi", "--role", "soldier"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("seat already assigned"));
    let reserve = stdout_line(cli(&roster).args([
        "assign", "--slot", slot.as_str(), "--person", "Avi", "--role", "soldier", "--reserve",
    ]));

    cli(&roster)
        .args(["clear", "--slot", slot.as_str(), "--unlocked-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 assignment(s)"));
    cli(&roster)
        .args(["unassign", "--assignment", reserve.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown assignment"));
    cli(&roster)
        .args(["unassign", "--assignment", locked.as_str()])
        .assert()
        .success();
    cli(&roster)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("→").not());
}

#[test]
fn edit_people_and_slots() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");

    cli(&roster)
        .args(["add-person", "--name", "Avi", "--roles", "soldier,commander"])
        .assert()
        .success();
    cli(&roster)
        .args(["block", "--person", "Avi", "--dates", "2025-10-06,2025-10-07"])
        .assert()
        .success();
    cli(&roster)
        .args(["unblock", "--person", "Avi", "--dates", "2025-10-07,2025-10-08"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unblocked 1 date(s)"));
    cli(&roster)
        .args([
            "edit-person",
            "--name",
            "Avi",
            "--active",
            "false",
            "--add-roles",
            "officer",
            "--remove-roles",
            "commander",
        ])
        .assert()
        .success();
    cli(&roster)
        .arg("people")
        .assert()
        .success()
        .stdout(predicate::str::contains("Avi [soldier,officer] (inactive)"));

    let slot = stdout_line(cli(&roster).args([
        "add-slot",
        "--date",
        "2025-10-09",
        "--type",
        "weekend",
    ]));
    cli(&roster)
        .args(["edit-slot", "--slot", slot.as_str(), "--soldiers", "3"])
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&roster).unwrap()).unwrap();
    assert_eq!(json["slots"][0]["soldiers_needed"], 3);
    assert_eq!(json["slots"][0]["officers_needed"], 1);
    assert_eq!(json["people"][0]["blocked_dates"], serde_json::json!(["2025-10-06"]));

    cli(&roster)
        .args(["remove-slot", "--slot", slot.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed slot and 0 assignment(s)"));
    cli(&roster)
        .args(["edit-slot", "--slot", slot.as_str(), "--soldiers", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown slot"));
    cli(&roster)
        .args(["remove-person", "--name", "Avi"])
        .assert()
        .success();
    cli(&roster)
        .arg("people")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
