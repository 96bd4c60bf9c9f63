//! Session diagnostics counters.
//!
//! The session never raises runtime protocol or network errors to the caller:
//! send failures are swallowed, malformed inbound messages are dropped, and
//! unknown addresses are ignored. These counters are the observability valve
//! for all of that absorbed failure. They are cheap atomics, updated from the
//! delivery task and from command calls, and read from anywhere via
//! [`SessionDiagnostics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one device session.
///
/// All counters only ever increase. Reads use relaxed ordering; the counts
/// are advisory and never synchronize other state.
#[derive(Debug, Default)]
pub struct SessionDiagnostics {
    commands_sent: AtomicU64,
    send_failures: AtomicU64,
    malformed_dropped: AtomicU64,
    unknown_addresses: AtomicU64,
    events_dispatched: AtomicU64,
    handler_panics: AtomicU64,
}

impl SessionDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbound message was handed to the transport successfully.
    pub fn record_command_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// An outbound send failed and was swallowed.
    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound message matched a known address but carried bad arguments.
    pub fn record_malformed_dropped(&self) {
        self.malformed_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound message matched no known address.
    pub fn record_unknown_address(&self) {
        self.unknown_addresses.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound device event was fanned out to listeners.
    pub fn record_event_dispatched(&self) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// A listener panicked during fan-out and was isolated.
    pub fn record_handler_panics(&self, count: u64) {
        if count > 0 {
            self.handler_panics.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Consistent-enough point-in-time copy of all counters.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            malformed_dropped: self.malformed_dropped.load(Ordering::Relaxed),
            unknown_addresses: self.unknown_addresses.load(Ordering::Relaxed),
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data copy of the counters, safe to hold across await points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticsSnapshot {
    pub commands_sent: u64,
    pub send_failures: u64,
    pub malformed_dropped: u64,
    pub unknown_addresses: u64,
    pub events_dispatched: u64,
    pub handler_panics: u64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
