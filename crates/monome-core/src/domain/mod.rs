//! Domain model for one device session.
//!
//! Pure state with no I/O: everything here can be driven directly in unit
//! tests. The client crate wraps these types in a lock and feeds them from
//! its delivery task.
//!
//! # Why "focus" exists (for beginners)
//!
//! A serialosc device sends its events to exactly one destination: whichever
//! host/port/prefix was announced to it most recently. Two clients can both
//! believe they own a device; the device resolves the contention by echoing
//! the winner's settings as `/sys/*` reports. Comparing those echoes against
//! our own configuration is the only way to notice we lost — the protocol has
//! no acknowledgments, no leases, and no notifications beyond the echo.

pub mod device;
pub mod focus;

pub use device::{DeviceEndpoint, DeviceState, InvalidPrefix, Prefix, DEFAULT_PREFIX};
pub use focus::{FocusState, HostCheck};
