//! Integration tests for the session lifecycle over the in-memory transport.
//!
//! # Purpose
//!
//! These tests exercise `DeviceSession` through its *public* API the same way
//! a host application would, with the `MemoryTransport` standing in for the
//! UDP socket pair. They verify:
//!
//! - The bootstrap announcement sequence and its exact wire addresses.
//! - That `set_prefix` re-announces and that the very next command uses the
//!   new prefix.
//! - Focus loss on a foreign announcement, with no automatic reacquisition.
//! - Close semantics: idempotent, and commands after close go nowhere.
//! - The fire-and-forget send policy: failures never surface to callers,
//!   only to the diagnostics counters.
//!
//! # The bootstrap conversation
//!
//! ```text
//! Application                          Device
//! ───────────                          ──────
//! /sys/info                            (dump properties to current dest)
//! /sys/port    <listen port>           (send events to this port)
//! /sys/prefix  "/app"                  (address events under /app)
//! /sys/host    "127.0.0.1"             (send events to this host)
//!                                      /sys/size 16 8   → session state
//!                                      /app/grid/key …  → handlers
//! ```
//!
//! # Synchronising with the routing task
//!
//! Injected messages travel through a channel to the routing task, so state
//! changes are not visible the instant `inject` returns. Each test that needs
//! to observe routed effects injects a `/sys/id` marker afterwards and waits
//! for it to land: the router handles messages strictly in arrival order, so
//! once the marker is visible every earlier injection has been fully routed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use monome_client::{DeviceSession, MemoryTransport, PressHandler, SessionConfig};
use monome_core::{DeviceEndpoint, OscArg, OscMessage};

// ── Shared helpers ────────────────────────────────────────────────────────────

fn endpoint() -> DeviceEndpoint {
    DeviceEndpoint {
        name: "m128-302".to_string(),
        host: "127.0.0.1".to_string(),
        port: 13188,
    }
}

fn config_with_prefix(prefix: &str) -> SessionConfig {
    SessionConfig {
        prefix: prefix.to_string(),
        ..SessionConfig::default()
    }
}

/// Injects a `/sys/id` marker and waits until the router has applied it,
/// proving that every earlier injection has been fully routed.
async fn drain_router(session: &DeviceSession, transport: &MemoryTransport, marker: &str) {
    let msg = OscMessage::with_args("/sys/id", vec![OscArg::Str(marker.to_string())]).unwrap();
    transport.inject(msg).await;
    for _ in 0..200 {
        if session.id().await == marker {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("router did not process the {marker} marker in time");
}

/// Records every press callback for later inspection.
#[derive(Default)]
struct RecordingPress {
    presses: Mutex<Vec<(i32, i32, i32)>>,
}

impl RecordingPress {
    fn presses(&self) -> Vec<(i32, i32, i32)> {
        self.presses.lock().unwrap().clone()
    }
}

impl PressHandler for RecordingPress {
    fn on_press(&self, x: i32, y: i32, state: i32) {
        self.presses.lock().unwrap().push((x, y, state));
    }
}

// ── Bootstrap ─────────────────────────────────────────────────────────────────

/// Connecting must announce in a fixed order: a property request first, then
/// the three destination announcements that point the device at us.
#[tokio::test]
async fn test_bootstrap_sends_info_then_port_prefix_host() {
    // Arrange / Act
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), config_with_prefix("/app"), &transport)
        .await
        .expect("connect");

    // Assert: four sends, in announcement order, with the configured values.
    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0].address(), "/sys/info");
    assert!(sent[0].args().is_empty());
    assert_eq!(sent[1].address(), "/sys/port");
    assert_eq!(sent[1].args(), &[OscArg::Int(8000)]);
    assert_eq!(sent[2].address(), "/sys/prefix");
    assert_eq!(sent[2].args(), &[OscArg::Str("/app".to_string())]);
    assert_eq!(sent[3].address(), "/sys/host");
    assert_eq!(sent[3].args(), &[OscArg::Str("127.0.0.1".to_string())]);

    // The announcements double as a provisional focus claim.
    assert!(session.focused().await);

    session.close().await;
}

/// End-to-end inbound path: a size report lands in session state and a
/// prefixed key event reaches a registered handler.
#[tokio::test]
async fn test_size_report_then_key_event_reaches_handler() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), config_with_prefix("/app"), &transport)
        .await
        .expect("connect");
    let handler = Arc::new(RecordingPress::default());
    session.subscribe_to_press(handler.clone());

    // Act: the device reports its size, then the user presses a key.
    transport
        .inject(
            OscMessage::with_args("/sys/size", vec![OscArg::Int(16), OscArg::Int(8)]).unwrap(),
        )
        .await;
    transport
        .inject(
            OscMessage::with_args(
                "/app/grid/key",
                vec![OscArg::Int(3), OscArg::Int(4), OscArg::Int(1)],
            )
            .unwrap(),
        )
        .await;
    drain_router(&session, &transport, "marker-size-key").await;

    // Assert
    assert_eq!(session.size().await, (16, 8));
    assert_eq!(handler.presses(), vec![(3, 4, 1)]);

    session.close().await;
}

// ── Prefix changes ────────────────────────────────────────────────────────────

/// `set_prefix` must re-run the announcement sequence and the next command
/// must already use the new prefix.
#[tokio::test]
async fn test_set_prefix_reannounces_and_applies_to_next_command() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), SessionConfig::default(), &transport)
        .await
        .expect("connect");
    let before = transport.sent().len();

    // Act
    session.set_prefix("/app").await.expect("set_prefix");
    session.grid().set(1, 2, 1).await;

    // Assert: three announcements then the command, addressed under /app.
    let sent = transport.sent();
    let new = &sent[before..];
    assert_eq!(new.len(), 4);
    assert_eq!(new[0].address(), "/sys/port");
    assert_eq!(new[1].address(), "/sys/prefix");
    assert_eq!(new[1].args(), &[OscArg::Str("/app".to_string())]);
    assert_eq!(new[2].address(), "/sys/host");
    assert_eq!(new[3].address(), "/app/grid/led/set");
    assert_eq!(
        new[3].args(),
        &[OscArg::Int(1), OscArg::Int(2), OscArg::Int(1)]
    );
    assert_eq!(session.prefix().await, "/app");

    session.close().await;
}

/// An invalid prefix is rejected without touching the wire.
#[tokio::test]
async fn test_set_prefix_rejects_invalid_prefix() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), SessionConfig::default(), &transport)
        .await
        .expect("connect");
    let before = transport.sent().len();

    // Act
    let result = session.set_prefix("no-leading-slash").await;

    // Assert
    assert!(result.is_err());
    assert_eq!(transport.sent().len(), before);
    assert_eq!(session.prefix().await, "/monome");

    session.close().await;
}

// ── Focus ─────────────────────────────────────────────────────────────────────

/// A port announcement naming some other application's port means the device
/// now talks to someone else: focus drops, and the session must NOT try to
/// win the device back on its own.
#[tokio::test]
async fn test_focus_lost_on_foreign_port_report_without_reacquisition() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), SessionConfig::default(), &transport)
        .await
        .expect("connect");
    assert!(session.focused().await);
    let sent_before = transport.sent().len();

    // Act: the device reports it now sends events to port 9000.
    transport
        .inject(OscMessage::with_args("/sys/port", vec![OscArg::Int(9000)]).unwrap())
        .await;
    drain_router(&session, &transport, "marker-foreign-port").await;

    // Assert: focus is gone and nothing was sent in response.
    assert!(!session.focused().await);
    assert_eq!(transport.sent().len(), sent_before);

    // An explicit reacquisition is the caller's call.
    session.acquire_focus().await;
    assert!(session.focused().await);

    session.close().await;
}

// ── Close ─────────────────────────────────────────────────────────────────────

/// Close must be idempotent, and every command issued afterwards must be
/// dropped without reaching the transport.
#[tokio::test]
async fn test_close_is_idempotent_and_gates_commands() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), SessionConfig::default(), &transport)
        .await
        .expect("connect");
    let grid = session.grid();
    let before = transport.sent().len();

    // Act
    session.close().await;
    session.close().await;

    grid.all(1).await;
    session.ring().set(0, 0, 15).await;
    session.tilt().set(0, true).await;
    session.acquire_focus().await;

    // Assert
    assert!(session.is_closed());
    assert_eq!(transport.sent().len(), before);
    assert_eq!(session.diagnostics().commands_sent, before as u64);
}

// ── Send failures ─────────────────────────────────────────────────────────────

/// Send failures are swallowed: the command methods still return normally
/// and only the diagnostics counters show what happened.
#[tokio::test]
async fn test_send_failures_surface_only_in_diagnostics() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), SessionConfig::default(), &transport)
        .await
        .expect("connect");
    let bootstrap_sends = transport.sent().len() as u64;

    // Act
    transport.fail_sends(true);
    session.grid().all(1).await;
    session.tilt().set(0, true).await;
    transport.fail_sends(false);
    session.grid().all(0).await;

    // Assert
    let stats = session.diagnostics();
    assert_eq!(stats.send_failures, 2);
    assert_eq!(stats.commands_sent, bootstrap_sends + 1);
    assert_eq!(transport.sent().len() as u64, bootstrap_sends + 1);

    session.close().await;
}

// ── System requests ───────────────────────────────────────────────────────────

/// Rotation and property requests go out under `/sys`, never under the
/// session prefix.
#[tokio::test]
async fn test_rotation_and_info_requests_use_sys_addresses() {
    // Arrange
    let transport = MemoryTransport::new();
    let session = DeviceSession::connect(endpoint(), config_with_prefix("/app"), &transport)
        .await
        .expect("connect");
    let before = transport.sent().len();

    // Act
    session.set_rotation(90).await;
    session.request_info().await;

    // Assert
    let sent = transport.sent();
    assert_eq!(sent[before].address(), "/sys/rotation");
    assert_eq!(sent[before].args(), &[OscArg::Int(90)]);
    assert_eq!(sent[before + 1].address(), "/sys/info");

    session.close().await;
}
