//! CLI tests for kubetop (subscriber)
use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn test_help_mentions_short_and_long_flags() {
    let output = Command::cargo_bin("kubetop")
        .unwrap()
        .arg("--help")
        .output()
        .expect("run kubetop --help");
    assert!(output.status.success());
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        text.contains("--topic") && text.contains("-T") && text.contains("--record") && text.contains("-r"),
        "help text missing expected flags (--topic/-T, --record/-r)\n{text}"
    );
}

#[test]
fn test_unreachable_agent_is_an_error() {
    // Port 9 (discard) on loopback is essentially never a websocket server.
    let out = Command::cargo_bin("kubetop")
        .unwrap()
        .args(["-n", "1", "ws://127.0.0.1:9"])
        .output()
        .expect("run kubetop");
    assert!(!out.status.success(), "connect failure should exit non-zero");
    let text = String::from_utf8_lossy(&out.stderr);
    assert!(text.contains("subscribing to /k8s_pod_metrics"), "{text}");
}

#[test]
fn test_bad_count_is_an_error() {
    let out = Command::cargo_bin("kubetop")
        .unwrap()
        .args(["--count", "zero"])
        .output()
        .expect("run kubetop");
    assert!(!out.status.success());
}
