//! Application layer for the session engine.
//!
//! # What lives here?
//!
//! - **`session`** – The [`session::DeviceSession`] lifecycle: bootstrap
//!   (dial, announce, claim focus), the namespace accessors callers hold,
//!   and teardown. This is the crate's front door.
//!
//! - **`commands`** – Outbound command construction and the fire-and-forget
//!   send policy. Grid, ring, and tilt namespaces share one sink that reads
//!   the live prefix at call time.
//!
//! - **`router`** – The inbound pump: classifies each received message and
//!   either applies it to session state (system reports), fans it out to
//!   listeners (device events), or drops it with a diagnostic counter.
//!
//! - **`listeners`** – Handler traits for device events and the registry that
//!   stores subscriptions and performs panic-isolated fan-out.
//!
//! - **`diagnostics`** – Counters for everything the engine swallows instead
//!   of surfacing: failed sends, malformed datagrams, unknown addresses,
//!   panicking handlers.

pub mod commands;
pub mod diagnostics;
pub mod listeners;
pub mod router;
pub mod session;
