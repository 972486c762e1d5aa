mod common;

use std::process::{Command, Output};

use common::{closed_host, kcl_page, LoopbackController};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fanuc-webctl"))
        .args(args)
        .env_remove("FANUC_WEBCTL_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("run fanuc-webctl")
}

#[test]
fn get_prints_raw_value() {
    let controller = LoopbackController::start(&[(
        "_reqvar=$MCR.$GENOVERRIDE",
        200,
        r#"{"$MCR.$GENOVERRIDE": "100"}"#,
    )]);
    let output = run_cli(&["--no-upload", "get", &controller.host, "$MCR.$GENOVERRIDE"]);
    assert!(
        output.status.success(),
        "expected get success, stderr was:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "100\n");
}

#[test]
fn read_prints_and_reports_boolean_ports() {
    let controller = LoopbackController::start(&[
        ("_reqvar=DOUT[1]", 200, r#"{"DOUT[1]": "ON"}"#),
        ("_reqvar=DOUT[2]", 200, r#"{"DOUT[2]": "OFF"}"#),
    ]);
    let printed = run_cli(&["--no-upload", "read", &controller.host, "DOUT", "1"]);
    assert!(printed.status.success());
    assert_eq!(String::from_utf8_lossy(&printed.stdout), "1\n");

    let on = run_cli(&["--no-upload", "read", &controller.host, "dout", "1", "--status"]);
    assert_eq!(on.status.code(), Some(1));
    assert!(on.stdout.is_empty());

    let off = run_cli(&["--no-upload", "read", &controller.host, "DOUT", "2", "--status"]);
    assert_eq!(off.status.code(), Some(0));
}

#[test]
fn read_status_on_integer_port_is_a_usage_error() {
    let controller = LoopbackController::start(&[("_reqvar=GPIN[1]", 200, r#"{"GPIN[1]": "7"}"#)]);
    let output = run_cli(&["--no-upload", "read", &controller.host, "GPIN", "1", "--status"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_port_type_fails_before_any_request() {
    let controller = LoopbackController::start(&[]);
    let output = run_cli(&["--no-upload", "read", &controller.host, "BOGUS", "1"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown port type"));
    assert!(controller.seen().is_empty());
}

#[test]
fn write_check_reports_confirmation() {
    let controller = LoopbackController::start(&[(
        "/KCL/set port DOUT[3]=1",
        200,
        &kcl_page("\r\nValue was: 0    Value is: 1\r\n"),
    )]);
    let output = run_cli(&[
        "--no-upload",
        "write",
        &controller.host,
        "DOUT",
        "3",
        "1",
        "--check",
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "true\n");
}

#[test]
fn reset_without_verify_needs_no_helpers() {
    let controller = LoopbackController::start(&[("/KCLDO/reset", 204, "")]);
    let output = run_cli(&["reset", &controller.host]);
    assert!(
        output.status.success(),
        "expected reset success, stderr was:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let targets: Vec<_> = controller.seen().into_iter().map(|req| req.target).collect();
    assert_eq!(targets, vec!["/KCLDO/reset"]);
}

#[test]
fn reset_verify_exits_one_while_faulted() {
    let controller = LoopbackController::start(&[
        ("/KCLDO/reset", 204, ""),
        ("_reqvar=SOPOUT[3]", 200, r#"{"SOPOUT[3]": "ON"}"#),
    ]);
    let output = run_cli(&["--no-upload", "reset", &controller.host, "--verify"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unreachable_controller_exits_with_connectivity_code() {
    let host = closed_host();
    let output = run_cli(&["--no-upload", "--timeout-ms", "500", "get", &host, "$FNO"]);
    assert_eq!(output.status.code(), Some(3));
}
