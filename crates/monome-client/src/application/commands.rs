//! Outbound command namespaces: grid LEDs, arc rings, tilt sensors.
//!
//! Every command builds a message whose address is the session's *current*
//! prefix plus a fixed suffix, with arguments in wire order, and hands it to
//! the transport. The prefix is read at call time, never cached, so a prefix
//! change takes effect on the very next command.
//!
//! Sends are fire-and-forget: the protocol has no acknowledgments, so a
//! failed send is logged, counted in the session diagnostics, and otherwise
//! swallowed. No command ever returns an error to the caller. After the
//! owning session closes, the sender slot is empty and commands become
//! silent no-ops.

use std::sync::{Arc, Mutex};

use monome_core::{protocol::addresses, DeviceState, OscArg, OscMessage};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::application::diagnostics::SessionDiagnostics;
use crate::infrastructure::transport::MessageSender;

// ── Shared sink ───────────────────────────────────────────────────────────────

/// Common plumbing behind the three namespaces: live prefix lookup, the
/// outbound sender slot, and the swallow-and-count failure policy.
///
/// The sender lives in an `Option` shared with the owning session; closing
/// the session takes it out, which both releases the transport handle and
/// turns every later command into a no-op. The lock is never held across an
/// await: the sender handle is cloned out before sending.
#[derive(Clone)]
pub(crate) struct CommandSink {
    state: Arc<RwLock<DeviceState>>,
    sender: Arc<Mutex<Option<Arc<dyn MessageSender>>>>,
    diagnostics: Arc<SessionDiagnostics>,
}

impl CommandSink {
    pub(crate) fn new(
        state: Arc<RwLock<DeviceState>>,
        sender: Arc<dyn MessageSender>,
        diagnostics: Arc<SessionDiagnostics>,
    ) -> Self {
        Self {
            state,
            sender: Arc::new(Mutex::new(Some(sender))),
            diagnostics,
        }
    }

    /// Sends `current prefix + suffix` with `args`.
    pub(crate) async fn fire(&self, suffix: &str, args: Vec<OscArg>) {
        let address = self.state.read().await.prefix().join(suffix);
        self.fire_at(address, args).await;
    }

    /// Sends an unprefixed address (the `/sys/*` family).
    pub(crate) async fn fire_sys(&self, address: &str, args: Vec<OscArg>) {
        self.fire_at(address.to_string(), args).await;
    }

    /// Takes the sender out of the slot, releasing the transport handle.
    /// Returns `false` if it was already gone.
    pub(crate) fn disarm(&self) -> bool {
        self.sender.lock().unwrap().take().is_some()
    }

    pub(crate) fn is_disarmed(&self) -> bool {
        self.sender.lock().unwrap().is_none()
    }

    async fn fire_at(&self, address: String, args: Vec<OscArg>) {
        let sender = match self.sender.lock().unwrap().clone() {
            Some(sender) => sender,
            None => {
                debug!(%address, "command dropped, session closed");
                return;
            }
        };

        // The prefix invariant guarantees a leading slash, so construction
        // cannot fail for the fixed suffixes.
        let message = match OscMessage::with_args(address, args) {
            Ok(message) => message,
            Err(e) => {
                warn!("dropping unbuildable command: {e}");
                self.diagnostics.record_send_failure();
                return;
            }
        };

        match sender.send(&message).await {
            Ok(()) => self.diagnostics.record_command_sent(),
            Err(e) => {
                warn!(address = %message.address(), "send failed, dropping command: {e}");
                self.diagnostics.record_send_failure();
            }
        }
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// LED commands for grid devices.
///
/// Coordinates and levels are passed through untouched; the device is the
/// authority on its own ranges.
#[derive(Clone)]
pub struct GridCommands {
    sink: CommandSink,
}

impl GridCommands {
    pub(crate) fn new(sink: CommandSink) -> Self {
        Self { sink }
    }

    /// Sets a single LED. `state` is 1 for on, 0 for off.
    pub async fn set(&self, x: i32, y: i32, state: i32) {
        self.sink
            .fire(
                addresses::GRID_LED_SET,
                vec![OscArg::Int(x), OscArg::Int(y), OscArg::Int(state)],
            )
            .await;
    }

    /// Sets every LED on the grid at once.
    pub async fn all(&self, state: i32) {
        self.sink
            .fire(addresses::GRID_LED_ALL, vec![OscArg::Int(state)])
            .await;
    }

    /// Updates an 8x8 quad from row bitmasks. The offsets select which quad;
    /// each mask covers one row, least significant bit leftmost.
    pub async fn map(&self, x_offset: i32, y_offset: i32, masks: &[u8]) {
        let mut args = vec![OscArg::Int(x_offset), OscArg::Int(y_offset)];
        args.extend(masks.iter().map(|&mask| OscArg::Byte(mask)));
        self.sink.fire(addresses::GRID_LED_MAP, args).await;
    }

    /// Updates one row from byte masks starting at `x_offset`.
    pub async fn row(&self, x_offset: i32, y: i32, masks: &[u8]) {
        let mut args = vec![OscArg::Int(x_offset), OscArg::Int(y)];
        args.extend(masks.iter().map(|&mask| OscArg::Byte(mask)));
        self.sink.fire(addresses::GRID_LED_ROW, args).await;
    }

    /// Updates one column from byte masks starting at `y_offset`.
    pub async fn col(&self, x: i32, y_offset: i32, masks: &[u8]) {
        let mut args = vec![OscArg::Int(x), OscArg::Int(y_offset)];
        args.extend(masks.iter().map(|&mask| OscArg::Byte(mask)));
        self.sink.fire(addresses::GRID_LED_COL, args).await;
    }

    /// Sets the global LED brightness level.
    pub async fn intensity(&self, level: i32) {
        self.sink
            .fire(addresses::GRID_LED_INTENSITY, vec![OscArg::Int(level)])
            .await;
    }
}

// ── Ring ──────────────────────────────────────────────────────────────────────

/// LED commands for arc encoder rings. Each ring has 64 LEDs with levels
/// 0 to 15.
#[derive(Clone)]
pub struct RingCommands {
    sink: CommandSink,
}

impl RingCommands {
    pub(crate) fn new(sink: CommandSink) -> Self {
        Self { sink }
    }

    /// Sets a single ring LED.
    pub async fn set(&self, encoder: i32, led: i32, level: i32) {
        self.sink
            .fire(
                addresses::RING_SET,
                vec![OscArg::Int(encoder), OscArg::Int(led), OscArg::Int(level)],
            )
            .await;
    }

    /// Sets all 64 LEDs on one ring to the same level.
    pub async fn all(&self, encoder: i32, level: i32) {
        self.sink
            .fire(
                addresses::RING_ALL,
                vec![OscArg::Int(encoder), OscArg::Int(level)],
            )
            .await;
    }

    /// Sets all 64 LEDs on one ring individually, LED 0 first.
    pub async fn map(&self, encoder: i32, levels: &[u8; 64]) {
        let mut args = vec![OscArg::Int(encoder)];
        args.extend(levels.iter().map(|&level| OscArg::Byte(level)));
        self.sink.fire(addresses::RING_MAP, args).await;
    }

    /// Sets a contiguous arc of LEDs from `x1` to `x2` to `level`.
    pub async fn range(&self, encoder: i32, x1: i32, x2: i32, level: i32) {
        self.sink
            .fire(
                addresses::RING_RANGE,
                vec![
                    OscArg::Int(encoder),
                    OscArg::Int(x1),
                    OscArg::Int(x2),
                    OscArg::Int(level),
                ],
            )
            .await;
    }
}

// ── Tilt ──────────────────────────────────────────────────────────────────────

/// Tilt sensor control.
#[derive(Clone)]
pub struct TiltCommands {
    sink: CommandSink,
}

impl TiltCommands {
    pub(crate) fn new(sink: CommandSink) -> Self {
        Self { sink }
    }

    /// Arms or disarms a tilt sensor. Armed sensors stream samples to the
    /// tilt listeners.
    pub async fn set(&self, sensor: i32, active: bool) {
        self.sink
            .fire(
                addresses::TILT_SET,
                vec![OscArg::Int(sensor), OscArg::Int(i32::from(active))],
            )
            .await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
