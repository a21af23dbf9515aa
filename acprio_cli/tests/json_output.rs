use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[controller]
tick_ms = 1

[simulation]
initial_soc = 12.0
minimum_soc_limit = 10.0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_lines(bytes: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .collect()
}

/// Validate the summary object for a successful replay.
#[rstest]
fn json_replay_summary_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = dir.path().join("trace.csv");
    fs::write(&trace, "pv_power_w,soc\n400,12\n400,12\n").unwrap();

    let out = Command::cargo_bin("acprio")
        .unwrap()
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .output()
        .unwrap();
    assert!(out.status.success());

    let lines = json_lines(&out.stdout);
    assert_eq!(lines.len(), 1, "stdout must hold exactly the summary");
    let v = &lines[0];
    assert_eq!(v["status"], "stopped");
    assert_eq!(v["reason"], "EndOfData");
    assert_eq!(v["ticks"], 1);
    assert_eq!(v["writes"], 1);
    assert_eq!(v["final_setpoint_w"], 320.0);
    assert_eq!(v["ac_load_priority"], true);
    assert!(v["overruns"].is_u64());
}

/// Validate the error object and the JSON log lines on a fatal bus failure.
#[rstest]
fn json_error_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("acprio")
        .unwrap()
        .env("ACPRIO_TEST_SIM_FAIL_AFTER", "0")
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));

    let lines = json_lines(&out.stderr);
    let err = lines
        .iter()
        .find(|v| v.get("exit_code").is_some())
        .expect("error object on stderr");
    assert_eq!(err["reason"], "SampleRead");
    assert_eq!(err["exit_code"], 3);
    assert!(err["message"].as_str().unwrap().contains("What happened"));

    // Everything else on stderr is structured logging.
    assert!(
        lines
            .iter()
            .filter(|v| v.get("exit_code").is_none())
            .all(|v| v.get("level").is_some())
    );
}
