//! Real OS signal delivery. Kept in its own test binary since it sends
//! SIGTERM to the test process.

#![cfg(unix)]

use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;

use nodekit::lifecycle::{on_shutdown, signals, SignalKind};

fn send_sigterm() {
    let status = Command::new("kill")
        .arg("-TERM")
        .arg(std::process::id().to_string())
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn sigterm_reaches_latest_callback() {
    let (tx, rx) = mpsc::channel();

    let first = tx.clone();
    on_shutdown(move || {
        let _ = first.send("first");
    });
    assert!(signals::global().is_registered(SignalKind::Interrupt));
    assert!(signals::global().is_registered(SignalKind::Terminate));

    send_sigterm();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "first");

    on_shutdown(move || {
        let _ = tx.send("second");
    });

    send_sigterm();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "second");
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
