//! End-to-end tests for config bootstrap, key migration, and overrides.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SEED: &str = "cli-test-seed";

/// Get a Command for the ask binary using a config at `path`.
fn ask(path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ask").unwrap();
    cmd.env("ASKTA_SECRET_SEED", SEED)
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(path)
        .write_stdin("");
    cmd
}

fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("askta").join("config.yaml")
}

/// Write a config with a plaintext key
fn write_config(path: &Path, api_key: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!(
            "base_url: \"https://api.openai.com/v1/\"\n\
             api_key: \"{}\"  # key\n\
             model_name: \"\"\n\
             provider: \"openai-compatible\"\n",
            api_key
        ),
    )
    .unwrap();
}

#[test]
fn test_first_run_bootstraps_and_stops() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);

    ask(&path)
        .arg("hello")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Created default config"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("api_key: \"your-api-key\""));
}

#[test]
fn test_first_run_does_not_need_key_material() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);

    ask(&path)
        .env_remove("ASKTA_SECRET_SEED")
        .env_remove("HOME")
        .env_remove("USER")
        .env_remove("USERNAME")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Created default config"));
    assert!(path.exists());
}

#[test]
fn test_unedited_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);

    ask(&path).assert().code(2);
    ask(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("placeholder"))
        .stderr(predicate::str::contains("decrypt").not());
}

#[test]
fn test_key_is_encrypted_and_stays_stable() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);
    write_config(&path, "sk-abc");

    ask(&path)
        .arg("hello")
        .assert()
        .success()
        .stdout(predicate::str::contains("model: gpt-4o-mini"))
        .stdout(predicate::str::contains("query: hello"))
        .stdout(predicate::str::contains("sk-abc").not());

    let first = fs::read_to_string(&path).unwrap();
    assert!(first.contains("api_key: \"encry_"));
    assert!(!first.contains("sk-abc"));
    assert!(first.contains("# key"));

    ask(&path).arg("again").assert().success();
    let second = fs::read_to_string(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_foreign_ciphertext_reports_decrypt_error() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);
    write_config(&path, "sk-abc");
    ask(&path).assert().success();

    ask(&path)
        .env("ASKTA_SECRET_SEED", "another-machine")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to decrypt api_key"))
        .stderr(predicate::str::contains("plaintext API key"));
}

#[test]
fn test_flag_overrides_in_json_output() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);
    write_config(&path, "sk-abc");

    let output = ask(&path)
        .args(["--json", "-m", "gpt-5", "--private-mode", "--temp", "0.3"])
        .arg("list files")
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["mode"], "conversation");
    assert_eq!(plan["model"], "gpt-5");
    assert_eq!(plan["private_mode"], true);
    assert_eq!(plan["query"], "list files");
    assert_eq!(plan["api_key_configured"], true);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("sk-abc"));
}

#[test]
fn test_piped_input_becomes_content() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);
    write_config(&path, "sk-abc");

    let output = ask(&path)
        .args(["--json", "summarize"])
        .write_stdin("error: disk full")
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["query"], "summarize\n\nContent:\nerror: disk full");
}

#[test]
fn test_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = config_path(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "api_key: [oops\n").unwrap();

    ask(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}
