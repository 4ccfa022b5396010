//! Live harness: the proxy in front of the real Docker daemon.
//!
//! ```text
//! cargo test -p dent-proxy --test live_proxy -- --ignored
//! ```

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

const DAEMON: &str = "/var/run/docker.sock";

#[test]
#[ignore = "needs a Docker daemon"]
fn check_against_real_daemon() {
    let output = Command::new(env!("CARGO_BIN_EXE_dent-proxy"))
        .args(["--check", "--target", DAEMON])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "OK");
}

#[test]
#[ignore = "needs a Docker daemon"]
fn docker_cli_works_through_proxy() {
    let dir = std::env::temp_dir().join(format!("dpl-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let listen: PathBuf = dir.join("docker.sock");

    let mut proxy = Command::new(env!("CARGO_BIN_EXE_dent-proxy"))
        .args(["--listen", listen.to_str().unwrap(), "--target", DAEMON])
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    for _ in 0..100 {
        if listen.exists() {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let host = format!("unix://{}", listen.display());
    let output = Command::new("docker")
        .args(["-H", &host, "version", "--format", "{{.Server.Version}}"])
        .output()
        .unwrap();

    proxy.kill().ok();
    proxy.wait().ok();
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(!String::from_utf8_lossy(&output.stdout).trim().is_empty());
}
