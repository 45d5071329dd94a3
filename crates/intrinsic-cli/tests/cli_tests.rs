//! End-to-end tests of the `intrinsic` binary.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/acme.json")
}

fn intrinsic() -> Command {
    let mut cmd = Command::cargo_bin("intrinsic").unwrap();
    cmd.env_remove("INTRINSIC_INPUT").env_remove("RUST_LOG");
    cmd
}

fn minimal_number(args: &[&str]) -> f64 {
    let output = intrinsic().args(args).output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8(output.stdout)
        .unwrap()
        .trim()
        .trim_end_matches('%')
        .parse()
        .unwrap()
}

#[test]
fn test_value_minimal_prints_positive_number() {
    let input = fixture();
    let value = minimal_number(&["value", "-i", input.to_str().unwrap(), "-f", "minimal"]);
    assert!(value > 0.0);
}

#[test]
fn test_value_json_has_bridge_keys() {
    intrinsic()
        .args(["value", "--format", "json", "--input"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Intrinsic Value\""))
        .stdout(predicate::str::contains("\"Enterprise Value\""))
        .stdout(predicate::str::contains("\"Symbol\": \"ACME\""));
}

#[test]
fn test_input_from_environment() {
    intrinsic()
        .env("INTRINSIC_INPUT", fixture())
        .args(["value", "-f", "minimal"])
        .assert()
        .success();
}

#[test]
fn test_wacc_override_changes_value() {
    let input = fixture();
    let input = input.to_str().unwrap();
    let low = minimal_number(&["value", "-i", input, "--wacc", "7", "-f", "minimal"]);
    let high = minimal_number(&["value", "-i", input, "--wacc", "12", "-f", "minimal"]);
    assert!(low > high);
}

#[test]
fn test_growth_reports_blended_forecast() {
    intrinsic()
        .args(["growth", "-f", "json", "-i"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Method\": \"blended\""))
        .stdout(predicate::str::contains("Holt Alpha"));

    let input = fixture();
    let rate = minimal_number(&["growth", "-i", input.to_str().unwrap(), "-f", "minimal"]);
    assert!((rate - 8.0).abs() < 1.0);
}

#[test]
fn test_growth_override_flag() {
    let input = fixture();
    let rate = minimal_number(&[
        "growth",
        "-i",
        input.to_str().unwrap(),
        "--growth",
        "3.5",
        "-f",
        "minimal",
    ]);
    assert!((rate - 3.5).abs() < 1e-9);
}

#[test]
fn test_wacc_breakdown() {
    intrinsic()
        .args(["wacc", "-f", "json", "-i"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Synthetic Rating"))
        .stdout(predicate::str::contains("Cost of Equity"));
}

#[test]
fn test_dcf_table_and_json() {
    intrinsic()
        .args(["dcf", "-i"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("DCF Projection: ACME"))
        .stdout(predicate::str::contains("UFCF"));

    intrinsic()
        .args(["dcf", "-f", "json", "--horizon", "3", "-i"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bridge\""))
        .stdout(predicate::str::contains("\"terminal\""));
}

#[test]
fn test_sgr_exclusions() {
    intrinsic()
        .args(["sgr", "-f", "json", "--exclude", "revenue-cagr", "-i"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"excluded\""))
        .stdout(predicate::str::contains("revenue_cagr"));

    intrinsic()
        .args(["sgr", "--exclude", "astrology", "-i"])
        .arg(fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown SGR method: astrology"));
}

#[test]
fn test_sensitivity_csv_grid() {
    let output = intrinsic()
        .args(["sensitivity", "-f", "csv", "--wacc-steps", "1", "--multiple-steps", "1", "-i"])
        .arg(fixture())
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("wacc_pct,exit_multiple,value_per_share"));
    assert_eq!(lines.count(), 9);
}

#[test]
fn test_config_list_and_show() {
    intrinsic()
        .args(["config", "list", "-f", "minimal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AGGRESSIVE"))
        .stdout(predicate::str::contains("CONSERVATIVE"))
        .stdout(predicate::str::contains("DEFAULT"));

    intrinsic()
        .args(["config", "show", "AGGRESSIVE", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"horizon_years\": 7"));

    intrinsic()
        .args(["config", "show", "MISSING"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_then_use() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assumptions.toml");

    intrinsic()
        .args(["config", "init", "--preset", "CONSERVATIVE"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    intrinsic()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    // a second init refuses to overwrite
    intrinsic()
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    intrinsic()
        .args(["value", "-f", "minimal", "-i"])
        .arg(fixture())
        .arg("--config")
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_missing_input_file() {
    intrinsic()
        .args(["value", "-i", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read company snapshot"));
}

#[test]
fn test_invalid_horizon() {
    intrinsic()
        .args(["dcf", "--horizon", "11", "-i"])
        .arg(fixture())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid horizon: 11"));
}

#[test]
fn test_invalid_exit_multiple() {
    intrinsic()
        .args(["value", "--exit-multiple", "-3", "-i"])
        .arg(fixture())
        .assert()
        .failure();
}
