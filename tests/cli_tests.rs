//! Binary-level tests: exit codes and tagged stdout.

use std::process::{Command, Output};

use readyprobe_testkit::{MockSite, unused_port};

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_readyprobe")
}

async fn run_bin(args: Vec<String>, target_host: Option<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        let mut cmd = Command::new(bin_path());
        cmd.args(&args).env_remove("RUST_LOG");
        match target_host {
            Some(host) => cmd.env("TARGET_HOST", host),
            None => cmd.env_remove("TARGET_HOST"),
        };
        cmd.output().expect("failed to run readyprobe")
    })
    .await
    .unwrap()
}

fn run_args(success_port: u16, error_port: u16, extra: &[&str]) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--success-port".to_string(),
        success_port.to_string(),
        "--error-port".to_string(),
        error_port.to_string(),
        "--retry-delay".to_string(),
        "50ms".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_exits_zero_when_all_checks_pass() {
    let site = MockSite::new().start().await;

    let output = run_bin(
        run_args(site.success_port(), site.error_port(), &[]),
        Some(site.host()),
    )
    .await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "unexpected failure: {stdout}");
    assert!(stdout.contains("[INFO] Service at"));
    assert!(stdout.contains("[TEST] Checking success server at"));
    assert!(stdout.contains("[OK] Success server returned 200 and expected content"));
    assert!(stdout.contains("[OK] Error server returned expected status 500"));
    assert!(stdout.contains("[RESULT] All tests passed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_exits_one_when_a_check_fails() {
    let site = MockSite::new().with_error(200, "fine").start().await;

    let output = run_bin(
        run_args(site.success_port(), site.error_port(), &[]),
        Some(site.host()),
    )
    .await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[ERROR] Expected status 500 but got 200"));
    assert!(stdout.contains("[RESULT] Some tests failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_exits_one_when_service_never_comes_up() {
    let output = run_bin(
        run_args(unused_port(), unused_port(), &["--max-attempts", "2"]),
        Some("127.0.0.1".to_string()),
    )
    .await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[INFO] Attempt 1/2 failed"));
    assert!(stdout.contains("[INFO] Attempt 2/2 failed"));
    assert!(stdout.contains("[FATAL] Service at"));
    assert!(!stdout.contains("[TEST]"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn host_flag_overrides_target_host() {
    let site = MockSite::new().start().await;
    let mut args = run_args(site.success_port(), site.error_port(), &[]);
    args.extend(["--host".to_string(), site.host()]);

    let output = run_bin(args, Some("does-not-resolve.invalid".to_string())).await;

    assert!(output.status.success());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_writes_json_report() {
    let site = MockSite::new().start().await;
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.json");

    let output = run_bin(
        run_args(
            site.success_port(),
            site.error_port(),
            &["--report", report_path.to_str().unwrap()],
        ),
        Some(site.host()),
    )
    .await;
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["outcome"], "pass");
    assert_eq!(report["results"].as_array().unwrap().len(), 2);
    assert_eq!(report["readiness"]["attempts"], 1);
}

#[test]
fn list_shows_checks_in_order() {
    let output = Command::new(bin_path()).arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let success = stdout.find("success").unwrap();
    let error = stdout.find("error ").unwrap();
    assert!(success < error);
}

#[test]
fn init_then_validate_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readyprobe.yaml");
    let path_str = path.to_str().unwrap();

    let init = Command::new(bin_path())
        .args(["init", "--output", path_str])
        .output()
        .unwrap();
    assert!(init.status.success());

    let again = Command::new(bin_path())
        .args(["init", "--output", path_str])
        .output()
        .unwrap();
    assert!(!again.status.success(), "init must not overwrite without --force");

    let validate = Command::new(bin_path())
        .args(["validate", "--config", path_str])
        .env_remove("TARGET_HOST")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&validate.stdout);
    assert!(validate.status.success());
    assert!(stdout.contains("Success endpoint: http://nginx:8080/"));
    assert!(stdout.contains("Error endpoint:   http://nginx:8081/"));
}

#[test]
fn unknown_check_is_rejected() {
    let output = Command::new(bin_path())
        .args(["run", "--checks", "latency"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown check: latency"));
}

#[test]
fn validate_rejects_mistyped_check_option() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readyprobe.yaml");
    std::fs::write(&path, "checks:\n  success:\n    expected_status: two-hundred\n").unwrap();

    let output = Command::new(bin_path())
        .args(["validate", "--config", path.to_str().unwrap()])
        .env_remove("TARGET_HOST")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Configuration is valid!"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected_status"));
}

#[test]
fn validate_ignores_blank_target_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readyprobe.yaml");
    std::fs::write(&path, "target:\n  host: web\n").unwrap();

    let output = Command::new(bin_path())
        .args(["validate", "--config", path.to_str().unwrap()])
        .env("TARGET_HOST", "  ")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Success endpoint: http://web:8080/"));
    assert!(!stdout.contains("host taken from"));
}
