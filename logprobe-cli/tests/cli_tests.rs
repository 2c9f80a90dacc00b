//! Integration tests for the `logprobe` binary.
//!
//! Runs the real executable against temporary log and state directories
//! and checks the plugin line and exit code.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn logprobe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logprobe"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("should run logprobe")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("valid UTF-8")
}

fn append(path: &Path, line: &str) {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("should open log file");
    writeln!(file, "{line}").expect("should append");
}

struct Dirs {
    _root: TempDir,
    log: String,
    state: String,
}

fn dirs() -> Dirs {
    let root = TempDir::new().expect("should create temp dir");
    let log = root.path().join("app.log");
    let state = root.path().join("state");
    Dirs {
        log: log.display().to_string(),
        state: state.display().to_string(),
        _root: root,
    }
}

#[test]
fn test_warning_then_ok_on_second_run() {
    let d = dirs();
    append(Path::new(&d.log), "Dec  5 12:34:56 hostname test: ERROR");

    let first = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "ERROR"]);
    assert_eq!(first.status.code(), Some(1));
    assert_eq!(
        stdout(&first).trim(),
        format!(
            "WARNING: Found 1 lines (limit=1/0): Dec  5 12:34:56 hostname test: ERROR at {}",
            d.log
        )
    );

    let second = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "ERROR"]);
    assert_eq!(second.status.code(), Some(0));
    assert_eq!(stdout(&second).trim(), "OK - No matches found.");
}

#[test]
fn test_critical_exit_code() {
    let d = dirs();
    append(Path::new(&d.log), "Dec  5 12:34:56 hostname test: FATAL disk");

    let output = logprobe(&["-l", &d.log, "-S", &d.state, "--critical-pattern", "FATAL"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).starts_with("CRITICAL: Critical Found 1 lines: "));
}

#[test]
fn test_json_output() {
    let d = dirs();
    append(Path::new(&d.log), "Dec  5 12:34:56 hostname test: ERROR");

    let output = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "ERROR", "--output", "json"]);
    let parsed: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("should be JSON");
    assert_eq!(parsed["state"].as_str(), Some("WARNING"));
    assert!(parsed["message"].as_str().unwrap_or_default().contains("ERROR"));
}

#[test]
fn test_invalid_pattern_is_unknown() {
    let d = dirs();
    append(Path::new(&d.log), "x");

    let output = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "(unclosed"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN: "));
}

#[test]
fn test_missing_logfile_argument_is_unknown() {
    let output = logprobe(&[]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).starts_with("UNKNOWN: "));
}

#[test]
fn test_config_file_supplies_patterns() {
    let d = dirs();
    append(Path::new(&d.log), "Dec  5 12:34:56 hostname test: OOPS");
    let config_path = Path::new(&d.state).with_extension("toml");
    fs::write(
        &config_path,
        format!(
            "[check]\npatterns = [\"OOPS\"]\nstate_dir = {:?}\n",
            d.state
        ),
    )
    .expect("should write config");

    let output = logprobe(&["-l", &d.log, "--config", config_path.to_str().unwrap_or_default()]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_config_file_is_unknown() {
    let d = dirs();
    let output = logprobe(&["-l", &d.log, "--config", "/nonexistent/logprobe.toml"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).contains("/nonexistent/logprobe.toml"));
}

#[test]
fn test_reset_rescans_from_the_start() {
    let d = dirs();
    append(Path::new(&d.log), "Dec  5 12:34:56 hostname test: ERROR");

    let first = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "ERROR"]);
    assert_eq!(first.status.code(), Some(1));

    let reset = logprobe(&["-l", &d.log, "-S", &d.state, "--reset"]);
    assert_eq!(reset.status.code(), Some(0));
    assert_eq!(stdout(&reset).trim(), "OK - Removed 1 offset records.");

    let again = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "ERROR"]);
    assert_eq!(again.status.code(), Some(1));
}

#[test]
fn test_logs_stay_off_stdout() {
    let d = dirs();
    append(Path::new(&d.log), "Dec  5 12:34:56 hostname test: ERROR");

    let output = logprobe(&["-l", &d.log, "-S", &d.state, "-p", "ERROR", "--log-level", "debug"]);
    assert_eq!(stdout(&output).lines().count(), 1);
}
