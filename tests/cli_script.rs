use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("budget_tracker_cli").unwrap();
    cmd.env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(home.path())
        .args(["--email", "ana@example.com", "--password", "secret1"]);
    cmd
}

#[test]
fn register_add_and_list() {
    let home = TempDir::new().unwrap();

    cli(&home)
        .args(["register", "--name", "Ana"])
        .assert()
        .success()
        .stdout(contains("Ana (ana@example.com)"));

    cli(&home)
        .args(["add-category", "Food", "--budget", "300"])
        .assert()
        .success()
        .stdout(contains("Food ($300.00)"));

    cli(&home)
        .args(["add", "12.50", "--category", "food", "--description", "Lunch"])
        .assert()
        .success()
        .stdout(contains("$12.50 in Food"));

    cli(&home)
        .arg("expenses")
        .assert()
        .success()
        .stdout(contains("Lunch"));

    cli(&home)
        .arg("categories")
        .assert()
        .success()
        .stdout(contains("$287.50 left"));

    assert!(home.path().join("data.json").exists());
    assert!(home.path().join("accounts.json").exists());
}

#[test]
fn unknown_category_fails() {
    let home = TempDir::new().unwrap();
    cli(&home).args(["register", "--name", "Ana"]).assert().success();

    cli(&home)
        .args(["add", "5", "--category", "Travel"])
        .assert()
        .failure()
        .stderr(contains("Unknown category `Travel`"));
}

#[test]
fn commands_need_credentials() {
    let home = TempDir::new().unwrap();
    Command::cargo_bin("budget_tracker_cli")
        .unwrap()
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(home.path())
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(contains("--email and --password are required"));
}

#[test]
fn info_prints_build_metadata() {
    Command::cargo_bin("budget_tracker_cli")
        .unwrap()
        .arg("info")
        .assert()
        .success()
        .stdout(contains("commit:"));
}
