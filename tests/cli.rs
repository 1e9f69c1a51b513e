use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn accessaid(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("accessaid").unwrap();
    cmd.env("ACCESSAID_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ACCESSAID_REMOTE_URL");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("voice"));
}

#[test]
fn test_status_on_fresh_home() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["sync", "status", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pending\": 0"));
    assert!(home.path().join("accessaid.db").exists());
}

#[test]
fn test_queue_survives_between_runs() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["sync", "add", "complete", "r-42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued Complete Reminder operation"));

    accessaid(&home)
        .args(["sync", "add", "create", "Take pills", "--at", "2026-01-05 09:00", "--user", "u1"])
        .assert()
        .success();

    accessaid(&home)
        .args(["sync", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reminderId\": \"r-42\""))
        .stdout(predicate::str::contains("\"title\": \"Take pills\""));
}

#[test]
fn test_create_without_user_fails_with_config_exit_code() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["sync", "add", "create", "Walk", "--at", "today"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("User id required"));
}

#[test]
fn test_run_against_unreachable_backend_keeps_operation() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["sync", "add", "delete", "r-1"])
        .assert()
        .success();

    accessaid(&home)
        .args(["sync", "run", "--url", "http://127.0.0.1:9", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"failed\": 1"))
        .stdout(predicate::str::contains("\"remaining\": 1"));

    accessaid(&home)
        .args(["sync", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"attempts\": 1"));
}

#[test]
fn test_retry_unknown_id_is_not_found() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["sync", "retry", "missing-id"])
        .assert()
        .code(3);
}

#[test]
fn test_config_file_sets_default_output() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "general:\n  default_output: json\n",
    )
    .unwrap();

    accessaid(&home)
        .args(["sync", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stuck\": 0"));
}

#[test]
fn test_invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.yaml"), "sync:\n  max_attempts: 0\n").unwrap();

    accessaid(&home)
        .args(["sync", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_voice_process_with_captions() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["voice", "process", "--captions", "help", "me"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dispatched: emergency"));

    accessaid(&home)
        .args(["voice", "process", "--captions", "open", "camera"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No command matched"))
        .stdout(predicate::str::contains("Command not recognized"));
}

#[test]
fn test_voice_commands_json() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["voice", "commands", "--category", "reminder", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("set a reminder"))
        .stdout(predicate::str::contains("go home").not());
}

#[test]
fn test_reminder_preview() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["reminder", "preview", "Stretch", "--at", "2026-01-05 09:00", "-f", "weekly", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-01-05 09:00"))
        .stdout(predicate::str::contains("2026-01-12 09:00"));
}

#[test]
fn test_reminder_preview_rejects_huge_count() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["reminder", "preview", "Stretch", "--at", "2026-01-05 09:00", "-f", "daily", "-n", "100000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("100000000"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    accessaid(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("accessaid"));
}
