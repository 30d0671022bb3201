//! CLI integration tests
//!
//! These run the built `roomwatch` binary against a temporary config file
//! with a fixed seed, so no user configuration is read.

use std::path::Path;
use std::process::{Command, Output};

const SEEDED_CONFIG: &str = r#"
[monitor]
tick_interval = 1
default_room = "sala-101"
seed = 11
"#;

fn roomwatch(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_roomwatch"))
        .arg("--config")
        .arg(config)
        .arg("--no-color")
        .arg("--quiet")
        .args(args)
        .output()
        .expect("Failed to run roomwatch binary")
}

fn seeded_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SEEDED_CONFIG).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_roomwatch"))
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["run", "status", "history", "rooms", "config"] {
        assert!(text.contains(command), "help should list {command}");
    }
}

#[test]
fn test_status_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(&config, &["status", "--room", "sala-102", "--format", "json"]);
    assert!(output.status.success(), "{:?}", output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["room"]["id"], "sala-102");
    assert_eq!(json["rooms"].as_array().unwrap().len(), 3);
    assert_eq!(json["metrics"].as_array().unwrap().len(), 5);
    assert!(json["last_refresh"].is_string());
}

#[test]
fn test_status_text() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(&config, &["status"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Sala 101\n"));
    assert!(text.contains("Temperatura"));
    assert!(text.contains("Norma: poniżej 1000 ppm"));
    assert!(text.contains("Ostrzeżenia:"));
}

#[test]
fn test_history_csv_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(
        &config,
        &["history", "--quantity", "co2", "--limit", "5", "--format", "csv"],
    );
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "timestamp,co2");
}

#[test]
fn test_history_full_week() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(&config, &["history", "-Q", "temp", "--format", "json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["points"].as_array().unwrap().len(), 169);
}

#[test]
fn test_unknown_room_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(&config, &["status", "--room", "aula"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("default_room"));
}

#[test]
fn test_rooms_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(&config, &["rooms", "--format", "csv"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("id,name,sensors\n"));
    assert!(text.contains("sala-103,Sala 103,"));
}

#[test]
fn test_config_init_and_validate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub").join("config.toml");

    let output = roomwatch(&path, &["config", "init"]);
    assert!(output.status.success());
    assert!(path.exists());

    let output = roomwatch(&path, &["config", "init"]);
    assert!(!output.status.success(), "init without --force must not overwrite");

    let output = roomwatch(&path, &["config", "init", "--force"]);
    assert!(output.status.success());

    let output = roomwatch(&path, &["config", "validate"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuration OK"));
}

#[test]
fn test_config_validate_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[monitor]\ntick_interval = 0\ndefault_room = \"aula\"\n",
    )
    .unwrap();

    let output = roomwatch(&path, &["config", "validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("monitor.tick_interval"));
    assert!(stderr.contains("monitor.default_room"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = roomwatch(&dir.path().join("absent.toml"), &["status"]);
    assert!(!output.status.success());
}

#[test]
fn test_run_stops_after_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(&dir);

    let output = roomwatch(&config, &["run", "--ticks", "2", "--format", "json"]);
    assert!(output.status.success(), "{:?}", output);

    let text = stdout(&output);
    let snapshots: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.iter().all(|s| s["room"]["id"] == "sala-101"));
}
