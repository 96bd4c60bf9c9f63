//! monome-client library entry point.
//!
//! Re-exports the public API so that integration tests in `tests/` and the
//! demo binary in `main.rs` share the same module tree.
//!
//! # What does monome-client do? (for beginners)
//!
//! A monome grid is a box of backlit buttons; an arc is a set of encoder
//! rings. Neither has any behaviour of its own: an application on the host
//! decides what a button press means and which LEDs light up. Device and
//! application talk OSC over UDP, usually through the serialosc daemon,
//! which gives every connected device its own UDP port.
//!
//! This crate is the application's side of that conversation:
//!
//! 1. [`DeviceSession::connect`] binds a listen socket, dials the device's
//!    port, announces where replies should go (`/sys/port`, `/sys/prefix`,
//!    `/sys/host`), and asks for a property dump (`/sys/info`).
//! 2. The caller registers handlers for key presses, tilt samples, and
//!    encoder activity; a background task routes every inbound message to
//!    session state or to the matching handlers.
//! 3. LED commands go out through the [`GridCommands`] / [`RingCommands`] /
//!    [`TiltCommands`] namespaces, addressed under the session's prefix.
//! 4. Because serialosc points a device at exactly one destination at a
//!    time, the session tracks whether it still holds the device's *focus*;
//!    another application announcing itself steals the device away and
//!    [`DeviceSession::focused`] turns false.
//!
//! Everything is fire-and-forget UDP: sends are not acknowledged, failures
//! are logged and counted but never surfaced after bootstrap.

/// Application layer: session lifecycle, commands, routing, listeners.
pub mod application;

/// Infrastructure layer: transports, device resolution, configuration.
pub mod infrastructure;

// Re-export the most-used types at the crate root so callers can write
// `monome_client::DeviceSession` instead of the full module path.
pub use application::commands::{GridCommands, RingCommands, TiltCommands};
pub use application::diagnostics::{DiagnosticsSnapshot, SessionDiagnostics};
pub use application::listeners::{
    EncoderHandler, ListenerKind, ListenerRegistry, PressHandler, Subscription, TiltHandler,
};
pub use application::session::{ConnectionError, DeviceSession, SessionConfig};
pub use infrastructure::config::{load_config, AppConfig, ConfigError};
pub use infrastructure::discovery::{DeviceResolver, StaticResolver};
pub use infrastructure::transport::{
    MemoryTransport, MessageSender, Transport, TransportError, TransportLink, UdpTransport,
};
