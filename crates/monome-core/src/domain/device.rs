//! Device endpoint, address prefix, and per-session device state.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::domain::focus::{FocusState, HostCheck};
use crate::protocol::inbound::SystemReport;

/// Prefix every session starts with unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "/monome";

/// A prefix that is empty or does not begin with `/`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("device prefix must be non-empty and begin with '/', got {given:?}")]
pub struct InvalidPrefix {
    pub given: String,
}

/// The address-namespace segment this session claims on the device.
///
/// Always non-empty and `/`-led; the validating constructor is the only way
/// to build one. Event addresses arrive as `prefix + suffix` and command
/// addresses are built the same way via [`Prefix::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(prefix: impl Into<String>) -> Result<Self, InvalidPrefix> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') {
            return Err(InvalidPrefix { given: prefix });
        }
        Ok(Self(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds a full command address from this prefix and a `/`-led suffix.
    pub fn join(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved device location, as handed over by a discovery collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    /// Device name as announced, e.g. `m128-302`.
    pub name: String,
    /// Hostname or IP the device listens on.
    pub host: String,
    /// UDP port the device listens on.
    pub port: u16,
}

impl fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// The mutable record of one device session.
///
/// Created at bootstrap with the caller's configuration and an unknown size;
/// from then on the delivery task feeds it system reports via
/// [`DeviceState::apply_report`]. Snapshots are cheap clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    id: String,
    host: String,
    prefix: Prefix,
    inbound_port: u16,
    outbound_port: u16,
    size_x: i32,
    size_y: i32,
    focus: FocusState,
}

impl DeviceState {
    /// State for a freshly bootstrapped session: identity and size unknown,
    /// focus not yet claimed.
    pub fn new(
        prefix: Prefix,
        host: String,
        inbound_port: u16,
        outbound_port: u16,
        host_check: HostCheck,
    ) -> Self {
        Self {
            id: String::new(),
            host,
            prefix,
            inbound_port,
            outbound_port,
            size_x: 0,
            size_y: 0,
            focus: FocusState::new(host_check),
        }
    }

    /// Device identity from `/sys/id`; empty until the first report.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The host we announce as our event destination.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// The port we receive events on. Fixed for the session's lifetime.
    pub fn inbound_port(&self) -> u16 {
        self.inbound_port
    }

    /// The device-side port commands are sent to.
    pub fn outbound_port(&self) -> u16 {
        self.outbound_port
    }

    /// Grid width; 0 until a size report arrives.
    pub fn size_x(&self) -> i32 {
        self.size_x
    }

    /// Grid height; 0 until a size report arrives.
    pub fn size_y(&self) -> i32 {
        self.size_y
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    pub fn focused(&self) -> bool {
        self.focus.focused()
    }

    /// Applies one system report: size and id update the record, port,
    /// prefix, and host echoes feed the focus comparison against the
    /// configured values (they never overwrite them).
    pub fn apply_report(&mut self, report: SystemReport) {
        match report {
            SystemReport::Size { x, y } => self.record_size(x, y),
            SystemReport::Id(id) => self.id = id,
            SystemReport::Port(port) => self.focus.observe_port(port, self.inbound_port),
            SystemReport::Prefix(prefix) => {
                self.focus.observe_prefix(&prefix, self.prefix.as_str())
            }
            SystemReport::Host(hostname) => self.focus.observe_host(&hostname, &self.host),
        }
    }

    /// Marks all focus sub-flags matched after announcements go out.
    pub fn claim_focus(&mut self) {
        self.focus.claim();
    }

    /// Drops focus, e.g. on close.
    pub fn clear_focus(&mut self) {
        self.focus.clear();
    }

    /// Replaces the configured prefix. Subsequent commands and focus
    /// comparisons use the new value.
    pub fn set_prefix(&mut self, prefix: Prefix) {
        self.prefix = prefix;
    }

    fn record_size(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            debug!("ignoring size report with negative dimensions {}x{}", x, y);
            return;
        }
        self.size_x = x;
        self.size_y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_state() -> DeviceState {
        DeviceState::new(
            Prefix::new("/app").unwrap(),
            "127.0.0.1".to_string(),
            8000,
            17_214,
            HostCheck::Disabled,
        )
    }

    #[test]
    fn test_prefix_requires_leading_slash() {
        assert!(Prefix::new("/monome").is_ok());
        assert_eq!(
            Prefix::new("monome").unwrap_err(),
            InvalidPrefix {
                given: "monome".to_string()
            }
        );
        assert!(Prefix::new("").is_err());
    }

    #[test]
    fn test_prefix_join_builds_command_address() {
        let prefix = Prefix::new("/app").unwrap();

        assert_eq!(prefix.join("/grid/led/set"), "/app/grid/led/set");
    }

    #[test]
    fn test_endpoint_display() {
        let endpoint = DeviceEndpoint {
            name: "m128-302".to_string(),
            host: "127.0.0.1".to_string(),
            port: 17_214,
        };

        assert_eq!(endpoint.to_string(), "m128-302 (127.0.0.1:17214)");
    }

    #[test]
    fn test_new_state_has_unknown_identity_and_size() {
        let state = make_state();

        assert_eq!(state.id(), "");
        assert_eq!(state.size_x(), 0);
        assert_eq!(state.size_y(), 0);
        assert!(!state.focused());
        assert_eq!(state.inbound_port(), 8000);
        assert_eq!(state.outbound_port(), 17_214);
    }

    #[test]
    fn test_size_report_updates_both_dimensions() {
        let mut state = make_state();

        state.apply_report(SystemReport::Size { x: 16, y: 8 });

        assert_eq!(state.size_x(), 16);
        assert_eq!(state.size_y(), 8);
    }

    #[test]
    fn test_negative_size_report_is_ignored() {
        let mut state = make_state();
        state.apply_report(SystemReport::Size { x: 16, y: 8 });

        state.apply_report(SystemReport::Size { x: -1, y: 8 });

        assert_eq!(state.size_x(), 16);
        assert_eq!(state.size_y(), 8);
    }

    #[test]
    fn test_id_report_updates_identity() {
        let mut state = make_state();

        state.apply_report(SystemReport::Id("m0001754".to_string()));

        assert_eq!(state.id(), "m0001754");
    }

    #[test]
    fn test_port_echo_feeds_focus_not_configuration() {
        let mut state = make_state();
        state.claim_focus();

        state.apply_report(SystemReport::Port(9999));

        // The configured port is untouched; only the comparison flag moved.
        assert_eq!(state.inbound_port(), 8000);
        assert!(!state.focus().port_matches());
        assert!(!state.focused());
    }

    #[test]
    fn test_prefix_echo_compares_against_configured_prefix() {
        let mut state = make_state();
        state.claim_focus();

        state.apply_report(SystemReport::Prefix("/app".to_string()));
        assert!(state.focused());

        state.apply_report(SystemReport::Prefix("/intruder".to_string()));
        assert!(!state.focused());
        assert_eq!(state.prefix().as_str(), "/app");
    }

    #[test]
    fn test_set_prefix_changes_future_comparisons() {
        let mut state = make_state();
        state.set_prefix(Prefix::new("/new").unwrap());
        state.claim_focus();

        state.apply_report(SystemReport::Prefix("/new".to_string()));

        assert!(state.focused());
        assert_eq!(state.prefix().join("/grid/led/set"), "/new/grid/led/set");
    }

    #[test]
    fn test_host_echo_respects_disabled_policy() {
        let mut state = make_state();
        state.claim_focus();

        state.apply_report(SystemReport::Host("elsewhere.local".to_string()));

        assert!(state.focused());
    }

    #[test]
    fn test_clear_focus_drops_aggregate() {
        let mut state = make_state();
        state.claim_focus();

        state.clear_focus();

        assert!(!state.focused());
    }
}
