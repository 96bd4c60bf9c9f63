//! # monome-core
//!
//! Shared library for monome-osc containing the OSC wire codec, the protocol
//! address tables, and the device-session domain model (device state and
//! focus negotiation).
//!
//! This crate is used by the client library and by anything that needs to
//! speak the serialosc dialect directly. It has zero dependencies on sockets,
//! timers, or any async runtime.
//!
//! # Protocol overview (for beginners)
//!
//! monome grid and arc controllers are driven through **serialosc**, a daemon
//! that exposes each attached device as an OSC endpoint: you send it small
//! addressed messages like `/monome/grid/led/set 3 4 1` over UDP and it sends
//! key presses, tilt samples, and encoder turns back the same way.
//!
//! This crate defines:
//!
//! - **`protocol`** – How bytes travel over the wire. [`OscMessage`] is an
//!   address string plus an ordered list of typed arguments; the codec turns
//!   it into OSC 1.0 binary framing and back. `protocol::inbound` then lifts
//!   a decoded message into a typed system report or device event.
//!
//! - **`domain`** – Pure session state with no I/O. [`DeviceState`] is the
//!   mutable record of one device connection; [`FocusState`] tracks whether
//!   this client still owns the device's event stream, which matters because
//!   serialosc devices are single-owner: whichever client most recently
//!   announced its port/prefix/host receives the events.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `monome_core::OscMessage` instead of `monome_core::protocol::message::OscMessage`.
pub use domain::device::{DeviceEndpoint, DeviceState, InvalidPrefix, Prefix, DEFAULT_PREFIX};
pub use domain::focus::{FocusState, HostCheck};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::inbound::{classify, DeviceEvent, Inbound, MalformedMessage, SystemReport};
pub use protocol::message::{OscArg, OscMessage};
