//! Wire-exact address constants for the serialosc dialect.
//!
//! The `/sys/*` family is fixed and unprefixed. Command suffixes are appended
//! to the session's configured prefix when a command is encoded. Event
//! suffixes are matched against the *end* of an inbound address, because the
//! device prepends whatever prefix it currently holds and the router must
//! keep working across prefix changes.

// ── System addresses (unprefixed, exact match) ────────────────────────────────

/// Outbound: ask the device to report its size and id. No arguments.
pub const SYS_INFO: &str = "/sys/info";
/// Outbound: announce the port the device should send events to (int32).
/// Inbound: the device echoes the port it is currently sending to.
pub const SYS_PORT: &str = "/sys/port";
/// Outbound: announce the address prefix for event messages (string).
/// Inbound: the device echoes the prefix it currently applies.
pub const SYS_PREFIX: &str = "/sys/prefix";
/// Outbound: announce the host the device should send events to (string).
/// Inbound: the device echoes the host it is currently sending to.
pub const SYS_HOST: &str = "/sys/host";
/// Outbound: set grid rotation in degrees (int32).
pub const SYS_ROTATION: &str = "/sys/rotation";
/// Inbound only: grid dimensions, two int32 args (x, y).
pub const SYS_SIZE: &str = "/sys/size";
/// Inbound only: device identity string.
pub const SYS_ID: &str = "/sys/id";

// ── Command suffixes (prefixed with the session prefix) ───────────────────────

pub const GRID_LED_SET: &str = "/grid/led/set";
pub const GRID_LED_ALL: &str = "/grid/led/all";
pub const GRID_LED_MAP: &str = "/grid/led/map";
pub const GRID_LED_ROW: &str = "/grid/led/row";
pub const GRID_LED_COL: &str = "/grid/led/col";
pub const GRID_LED_INTENSITY: &str = "/grid/led/intensity";
pub const RING_SET: &str = "/ring/set";
pub const RING_ALL: &str = "/ring/all";
pub const RING_MAP: &str = "/ring/map";
pub const RING_RANGE: &str = "/ring/range";
pub const TILT_SET: &str = "/tilt/set";

// ── Event suffixes (suffix match against inbound addresses) ───────────────────

/// Grid button press/release: int32 x, y, state.
pub const EV_GRID_KEY: &str = "/grid/key";
/// Tilt sample: int32 sensor, x, y, z.
pub const EV_TILT: &str = "/tilt";
/// Arc encoder rotation: int32 encoder, delta.
pub const EV_ENC_DELTA: &str = "/enc/delta";
/// Arc encoder push: int32 encoder, state.
pub const EV_ENC_KEY: &str = "/enc/key";
