//! Inbound message routing.
//!
//! The router is the sole consumer of the transport's inbound channel and
//! the sole writer of the session's [`DeviceState`]. It runs as one task per
//! session and processes messages strictly in arrival order: listener
//! callbacks run to completion before the next message is touched, so a slow
//! handler delays subsequent delivery for its session and nothing else.
//!
//! Classification rules:
//!
//! - `/sys/*` reports update the device state and feed the focus comparison.
//! - Event addresses match by suffix and fan out to the listener registry.
//! - Unknown addresses are expected traffic and are ignored.
//! - Malformed messages (recognized address, wrong arguments) are dropped;
//!   one bad datagram never stops delivery.

use std::sync::Arc;

use monome_core::{classify, DeviceEvent, DeviceState, Inbound, OscMessage};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, trace};

use crate::application::diagnostics::SessionDiagnostics;
use crate::application::listeners::ListenerRegistry;

pub(crate) struct MessageRouter {
    state: Arc<RwLock<DeviceState>>,
    registry: Arc<ListenerRegistry>,
    diagnostics: Arc<SessionDiagnostics>,
}

impl MessageRouter {
    pub(crate) fn new(
        state: Arc<RwLock<DeviceState>>,
        registry: Arc<ListenerRegistry>,
        diagnostics: Arc<SessionDiagnostics>,
    ) -> Self {
        Self {
            state,
            registry,
            diagnostics,
        }
    }

    /// Consumes inbound messages until the channel closes or the owning
    /// session aborts the task.
    pub(crate) async fn run(self, mut events: mpsc::Receiver<OscMessage>) {
        while let Some(message) = events.recv().await {
            self.route(&message).await;
        }
        debug!("inbound channel closed, router stopping");
    }

    /// Classifies and dispatches one message.
    pub(crate) async fn route(&self, message: &OscMessage) {
        match classify(message) {
            Ok(Inbound::System(report)) => {
                trace!(address = %message.address(), "system report");
                self.state.write().await.apply_report(report);
            }
            Ok(Inbound::Event(event)) => {
                let outcome = match event {
                    DeviceEvent::Press { x, y, state } => {
                        self.registry.dispatch_press(x, y, state)
                    }
                    DeviceEvent::Tilt { sensor, x, y, z } => {
                        self.registry.dispatch_tilt(sensor, x, y, z)
                    }
                    DeviceEvent::EncoderDelta { encoder, delta } => {
                        self.registry.dispatch_encoder_delta(encoder, delta)
                    }
                    DeviceEvent::EncoderPress { encoder, state } => {
                        self.registry.dispatch_encoder_press(encoder, state)
                    }
                };
                self.diagnostics.record_event_dispatched();
                self.diagnostics.record_handler_panics(outcome.panicked as u64);
            }
            Ok(Inbound::Unknown) => {
                trace!(address = %message.address(), "ignoring unknown address");
                self.diagnostics.record_unknown_address();
            }
            Err(e) => {
                debug!("dropping malformed message: {e}");
                self.diagnostics.record_malformed_dropped();
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
