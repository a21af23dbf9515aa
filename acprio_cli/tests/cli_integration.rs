use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config; fast ticks so bounded runs finish quickly.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[controller]
max_discharge_power_w = 3000.0
soc_distance = 5.0
soc_distance_full = 10.0
pv_window = 15
tick_ms = 1

[simulation]
initial_soc = 30.0
minimum_soc_limit = 10.0
initial_setting_w = 3000.0
capacity_wh = 10000.0
load_w = 400.0
pv_peak_w = 2500.0
pv_period_ticks = 100
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_trace(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("trace.csv");
    fs::write(&path, body).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["run", "--max-ticks", "3"], 0, "after 3 ticks", "stdout")]
#[case(&["run", "--max-ticks", "2", "--tick-ms", "2"], 0, "MaxTicks", "stdout")]
#[case(&["replay"], 2, "--trace", "stderr")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("acprio").unwrap();
    // Always include a config to avoid relying on the default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn replay_drives_setpoint_until_trace_ends() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_trace(
        &dir,
        "pv_power_w,soc\n400,12\n400,12\n400,12\n0,9\n",
    );

    Command::cargo_bin("acprio")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("EndOfData"))
        .stdout(predicate::str::contains("after 3 ticks: 2 writes"))
        .stdout(predicate::str::contains("setpoint 0 W"))
        .stdout(predicate::str::contains("ac-load priority on"));
}

#[test]
fn replay_minimum_soc_flag_overrides_config() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    // With a 2 % minimum, SOC 25 is in the full band: 1.5 x 400 W.
    let trace = write_trace(&dir, "pv_power_w,soc\n400,25\n400,25\n");

    Command::cargo_bin("acprio")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .arg("--minimum-soc")
        .arg("2")
        .assert()
        .success()
        .stdout(predicate::str::contains("setpoint 3000 W"))
        .stdout(predicate::str::contains("ac-load priority off"));
}

#[test]
fn replay_reports_bad_trace_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_trace(&dir, "pv,soc\n400,12\n");

    Command::cargo_bin("acprio")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid headers"));
}

#[test]
fn bus_failure_exits_with_sample_read_code() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    Command::cargo_bin("acprio")
        .unwrap()
        .env("ACPRIO_TEST_SIM_FAIL_AFTER", "1")
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Could not read"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[controller]\npv_window = 0\n").unwrap();

    Command::cargo_bin("acprio")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pv_window"));
}

#[test]
fn missing_config_file_uses_defaults() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("acprio")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}
