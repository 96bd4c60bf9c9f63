//! Infrastructure layer for the session engine.
//!
//! Contains everything that touches the outside world: the UDP socket pair,
//! the in-memory transport double, device name resolution, and TOML
//! configuration for the demo binary.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `monome_core`, but MUST NOT be imported by the domain layer.
//!
//! # Sub-modules
//!
//! - **`transport`** – The [`transport::Transport`] and
//!   [`transport::MessageSender`] seams plus their implementations: `udp`
//!   (real sockets) and `memory` (in-process, for tests and examples).
//!
//! - **`discovery`** – The [`discovery::DeviceResolver`] seam for mapping
//!   device names to endpoints, and a table-backed resolver.
//!
//! - **`config`** – TOML configuration schema with serde defaults, used by
//!   the demo binary.

pub mod config;
pub mod discovery;
pub mod transport;
