//! Typed listener subscription and event fan-out.
//!
//! Applications subscribe concrete handler objects per event capability:
//! grid presses, tilt samples, and encoder activity. Each subscription
//! returns a copyable [`Subscription`] handle; [`ListenerRegistry::unsubscribe`]
//! is idempotent and safe to call from inside a running handler.
//!
//! # Dispatch semantics
//!
//! Fan-out is synchronous and in registration order. Each dispatch operates
//! on a snapshot of the subscriber set taken at entry, so a handler that
//! subscribes or unsubscribes during dispatch affects the *next* dispatch,
//! never the one in flight. A panicking handler is caught and logged; the
//! remaining handlers in the same dispatch still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

// ── Handler capabilities ──────────────────────────────────────────────────────

/// Receives grid button events. `state` is 1 for press, 0 for release.
pub trait PressHandler: Send + Sync {
    fn on_press(&self, x: i32, y: i32, state: i32);
}

/// Receives accelerometer samples from an armed tilt sensor.
pub trait TiltHandler: Send + Sync {
    fn on_tilt(&self, sensor: i32, x: i32, y: i32, z: i32);
}

/// Receives arc encoder activity: rotation deltas and push-button events.
pub trait EncoderHandler: Send + Sync {
    fn on_delta(&self, encoder: i32, delta: i32);

    /// Encoder push button. `state` is 1 for press, 0 for release.
    fn on_key(&self, encoder: i32, state: i32);
}

// ── Subscription handles ──────────────────────────────────────────────────────

/// The capability a [`Subscription`] was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Press,
    Tilt,
    Encoder,
}

/// Handle returned by the subscribe methods; pass it back to
/// [`ListenerRegistry::unsubscribe`] to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    kind: ListenerKind,
}

impl Subscription {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

/// What happened during one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Handlers run, including any that panicked.
    pub invoked: usize,
    /// Handlers that panicked and were isolated.
    pub panicked: usize,
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Per-capability subscriber sets with ordered, isolated fan-out.
///
/// Locks are held only while copying or mutating a subscriber set, never
/// while a handler runs, so handlers may call back into the registry.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    press: Mutex<Vec<(u64, Arc<dyn PressHandler>)>>,
    tilt: Mutex<Vec<(u64, Arc<dyn TiltHandler>)>>,
    encoder: Mutex<Vec<(u64, Arc<dyn EncoderHandler>)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a grid press handler.
    pub fn subscribe_to_press(&self, handler: Arc<dyn PressHandler>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.press.lock().unwrap().push((id, handler));
        Subscription {
            id,
            kind: ListenerKind::Press,
        }
    }

    /// Registers a tilt handler.
    pub fn subscribe_to_tilt(&self, handler: Arc<dyn TiltHandler>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tilt.lock().unwrap().push((id, handler));
        Subscription {
            id,
            kind: ListenerKind::Tilt,
        }
    }

    /// Registers an encoder handler for both delta and key events.
    pub fn subscribe_to_encoder(&self, handler: Arc<dyn EncoderHandler>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.encoder.lock().unwrap().push((id, handler));
        Subscription {
            id,
            kind: ListenerKind::Encoder,
        }
    }

    /// Removes the handler behind `subscription`.
    ///
    /// Returns `true` if a handler was removed, `false` if it was already
    /// gone. Removal during a dispatch leaves the in-flight fan-out
    /// untouched and takes effect from the next dispatch.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        match subscription.kind {
            ListenerKind::Press => Self::remove(&self.press, subscription.id),
            ListenerKind::Tilt => Self::remove(&self.tilt, subscription.id),
            ListenerKind::Encoder => Self::remove(&self.encoder, subscription.id),
        }
    }

    /// Drops every subscriber. Used when the owning session closes.
    pub fn clear(&self) {
        self.press.lock().unwrap().clear();
        self.tilt.lock().unwrap().clear();
        self.encoder.lock().unwrap().clear();
    }

    /// Number of handlers currently registered under `kind`.
    pub fn subscriber_count(&self, kind: ListenerKind) -> usize {
        match kind {
            ListenerKind::Press => self.press.lock().unwrap().len(),
            ListenerKind::Tilt => self.tilt.lock().unwrap().len(),
            ListenerKind::Encoder => self.encoder.lock().unwrap().len(),
        }
    }

    // ── Fan-out ───────────────────────────────────────────────────────────────

    /// Delivers a grid press to every press subscriber.
    pub fn dispatch_press(&self, x: i32, y: i32, state: i32) -> DispatchOutcome {
        let handlers = self.press.lock().unwrap().clone();
        let mut outcome = DispatchOutcome::default();
        for (_, handler) in handlers {
            outcome.invoked += 1;
            if catch_unwind(AssertUnwindSafe(|| handler.on_press(x, y, state))).is_err() {
                outcome.panicked += 1;
                error!("press listener panicked; continuing fan-out");
            }
        }
        outcome
    }

    /// Delivers a tilt sample to every tilt subscriber.
    pub fn dispatch_tilt(&self, sensor: i32, x: i32, y: i32, z: i32) -> DispatchOutcome {
        let handlers = self.tilt.lock().unwrap().clone();
        let mut outcome = DispatchOutcome::default();
        for (_, handler) in handlers {
            outcome.invoked += 1;
            if catch_unwind(AssertUnwindSafe(|| handler.on_tilt(sensor, x, y, z))).is_err() {
                outcome.panicked += 1;
                error!("tilt listener panicked; continuing fan-out");
            }
        }
        outcome
    }

    /// Delivers an encoder rotation to every encoder subscriber.
    pub fn dispatch_encoder_delta(&self, encoder: i32, delta: i32) -> DispatchOutcome {
        let handlers = self.encoder.lock().unwrap().clone();
        let mut outcome = DispatchOutcome::default();
        for (_, handler) in handlers {
            outcome.invoked += 1;
            if catch_unwind(AssertUnwindSafe(|| handler.on_delta(encoder, delta))).is_err() {
                outcome.panicked += 1;
                error!("encoder listener panicked; continuing fan-out");
            }
        }
        outcome
    }

    /// Delivers an encoder press to every encoder subscriber.
    pub fn dispatch_encoder_press(&self, encoder: i32, state: i32) -> DispatchOutcome {
        let handlers = self.encoder.lock().unwrap().clone();
        let mut outcome = DispatchOutcome::default();
        for (_, handler) in handlers {
            outcome.invoked += 1;
            if catch_unwind(AssertUnwindSafe(|| handler.on_key(encoder, state))).is_err() {
                outcome.panicked += 1;
                error!("encoder listener panicked; continuing fan-out");
            }
        }
        outcome
    }

    fn remove<H: ?Sized>(set: &Mutex<Vec<(u64, Arc<H>)>>, id: u64) -> bool {
        let mut guard = set.lock().unwrap();
        let before = guard.len();
        guard.retain(|(entry_id, _)| *entry_id != id);
        guard.len() != before
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
