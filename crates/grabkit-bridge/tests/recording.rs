//! End-to-end recording tests against the synthetic backend.
//!
//! All recordings target animated GIF so no external encoder process
//! is needed.

use std::fs;
use std::thread;
use std::time::Duration;

use grabkit_bridge::{BridgeError, CaptureBridge, RecordingConfig, SessionState};
use grabkit_capture::{CaptureError, FailureMode, Region, SyntheticBackend};

fn synthetic_bridge() -> CaptureBridge {
    CaptureBridge::new(Box::new(SyntheticBackend::new(160, 120)))
}

#[test]
fn record_and_stop_produces_playable_gif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.gif");
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(&path, 20))
        .unwrap();
    assert!(session.is_recording());
    assert_eq!(session.state(), SessionState::Active);

    thread::sleep(Duration::from_millis(200));
    session.stop().unwrap();

    assert_eq!(session.state(), SessionState::Finalized);
    assert!(!session.is_recording());

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
    assert_eq!(*bytes.last().unwrap(), 0x3B);
}

#[test]
fn abort_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.gif");
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(&path, 20))
        .unwrap();
    thread::sleep(Duration::from_millis(100));
    session.abort().unwrap();

    assert_eq!(session.state(), SessionState::Aborted);
    assert!(!path.exists());
}

#[test]
fn stop_twice_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(dir.path().join("clip.gif"), 20))
        .unwrap();
    session.stop().unwrap();

    let err = session.stop().unwrap_err();
    assert!(matches!(
        err,
        BridgeError::InvalidState {
            operation: "stop",
            state: "finalized",
        }
    ));
}

#[test]
fn abort_after_stop_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(dir.path().join("clip.gif"), 20))
        .unwrap();
    session.stop().unwrap();

    let err = session.abort().unwrap_err();
    assert!(matches!(err, BridgeError::InvalidState { state: "finalized", .. }));
}

#[test]
fn stop_after_abort_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(dir.path().join("clip.gif"), 20))
        .unwrap();
    session.abort().unwrap();

    let err = session.stop().unwrap_err();
    assert!(matches!(err, BridgeError::InvalidState { state: "aborted", .. }));
}

#[test]
fn region_recording_uses_clamped_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region.gif");
    let bridge = synthetic_bridge();

    let config = RecordingConfig::fullscreen(&path, 20)
        .with_region(Region::new(120.0, 80.0, 100.0, 100.0));
    let session = bridge.start_recording(&config).unwrap();
    session.stop().unwrap();

    // Region clamps to 40x40 against the 160x120 display.
    let bytes = fs::read(&path).unwrap();
    let width = u16::from_le_bytes([bytes[6], bytes[7]]);
    let height = u16::from_le_bytes([bytes[8], bytes[9]]);
    assert_eq!((width, height), (40, 40));
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("clip.gif");
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(&path, 20))
        .unwrap();
    session.stop().unwrap();
    assert!(path.exists());
}

#[test]
fn unavailable_backend_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = CaptureBridge::new(Box::new(SyntheticBackend::unavailable()));

    let err = bridge
        .start_recording(&RecordingConfig::fullscreen(dir.path().join("clip.gif"), 20))
        .unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Capture(CaptureError::NotAvailable)
    ));
}

#[test]
fn failing_backend_fails_start_and_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.gif");
    let bridge = CaptureBridge::new(Box::new(SyntheticBackend::failing(
        FailureMode::PermissionDenied,
    )));

    let err = bridge
        .start_recording(&RecordingConfig::fullscreen(&path, 20))
        .unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Capture(CaptureError::PermissionDenied)
    ));
    // The first capture runs before start returns, so the sink is
    // discarded and the partial file removed.
    assert!(!path.exists());
}

#[test]
fn invalid_config_is_rejected_before_any_io() {
    let bridge = synthetic_bridge();
    let err = bridge
        .start_recording(&RecordingConfig::fullscreen("/tmp/grabkit-zero-fps.gif", 0))
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidConfig(_)));
}

#[test]
fn region_outside_display_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let bridge = synthetic_bridge();

    let config = RecordingConfig::fullscreen(dir.path().join("clip.gif"), 20)
        .with_region(Region::new(1000.0, 1000.0, 50.0, 50.0));
    let err = bridge.start_recording(&config).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Capture(CaptureError::InvalidRegion(_))
    ));
}

#[test]
fn concurrent_sessions_record_independently() {
    let dir = tempfile::tempdir().unwrap();
    let path_a = dir.path().join("a.gif");
    let path_b = dir.path().join("b.gif");
    let bridge = synthetic_bridge();

    let a = bridge
        .start_recording(&RecordingConfig::fullscreen(&path_a, 20))
        .unwrap();
    let b = bridge
        .start_recording(&RecordingConfig::fullscreen(&path_b, 20))
        .unwrap();

    thread::sleep(Duration::from_millis(100));
    a.stop().unwrap();
    b.abort().unwrap();

    assert!(path_a.exists());
    assert!(!path_b.exists());
}

#[test]
fn worker_failure_fails_session_and_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.gif");
    // Two captures succeed (the start handshake plus one frame), then
    // every capture fails, killing the worker mid-recording.
    let bridge = CaptureBridge::new(Box::new(SyntheticBackend::failing_after(2)));

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(&path, 50))
        .unwrap();

    // Wait out a few frame intervals so the worker has hit the failure.
    thread::sleep(Duration::from_millis(300));
    assert!(!session.is_recording());

    let err = session.stop().unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Capture(CaptureError::CaptureFailed(_))
    ));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(!path.exists());

    // The error surfaces once; afterwards the terminal state rejects
    // further transitions.
    let err = session.stop().unwrap_err();
    assert!(matches!(err, BridgeError::InvalidState { state: "failed", .. }));
}

#[test]
fn dropping_an_active_session_discards_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.gif");
    let bridge = synthetic_bridge();

    let session = bridge
        .start_recording(&RecordingConfig::fullscreen(&path, 20))
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    drop(session);

    assert!(!path.exists());
}
