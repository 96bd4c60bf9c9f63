//! Focus negotiation: tracking whether this client still owns the device.
//!
//! Focus is not a single flag. The device echoes port, prefix, and host
//! configuration independently and asynchronously, so each comparison is
//! tracked as its own sub-flag and the aggregate is the conjunction. A claim
//! is provisional: after announcing our settings we assume all three match
//! until an echo says otherwise. There is no automatic re-acquisition — once
//! a competing client wins, we stay un-focused until the owner explicitly
//! re-announces.

use tracing::debug;

/// Policy for the host sub-comparison.
///
/// Device-reported host strings are unreliable in practice (a device may echo
/// a hostname where we configured a dotted quad), so the comparison defaults
/// to off and the sub-flag keeps whatever value the last claim gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostCheck {
    /// Compare reported host strings exactly.
    Enabled,
    /// Ignore host reports; the sub-flag is untouched by them.
    #[default]
    Disabled,
}

/// The three independent focus sub-flags for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusState {
    port_matches: bool,
    host_matches: bool,
    prefix_matches: bool,
    host_check: HostCheck,
}

impl FocusState {
    /// A fresh, un-focused state. Nothing matches until [`claim`] runs.
    ///
    /// [`claim`]: FocusState::claim
    pub fn new(host_check: HostCheck) -> Self {
        Self {
            port_matches: false,
            host_matches: false,
            prefix_matches: false,
            host_check,
        }
    }

    /// Provisionally marks every sub-flag matched.
    ///
    /// Called right after the port/prefix/host announcements go out; a later
    /// echo that disagrees flips the corresponding flag back.
    pub fn claim(&mut self) {
        self.port_matches = true;
        self.host_matches = true;
        self.prefix_matches = true;
    }

    /// Drops all sub-flags, e.g. when the session closes.
    pub fn clear(&mut self) {
        self.port_matches = false;
        self.host_matches = false;
        self.prefix_matches = false;
    }

    /// Feeds a port echo. Ports travel as int32 on the wire but are
    /// configured as u16, so the configured side is widened for comparison.
    pub fn observe_port(&mut self, reported: i32, configured: u16) {
        let matches = reported == i32::from(configured);
        if self.port_matches && !matches {
            debug!(
                "device reports port {} but ours is {}, another client took over",
                reported, configured
            );
        }
        self.port_matches = matches;
    }

    /// Feeds a prefix echo.
    pub fn observe_prefix(&mut self, reported: &str, configured: &str) {
        let matches = reported == configured;
        if self.prefix_matches && !matches {
            debug!(
                "device reports prefix {} but ours is {}, another client took over",
                reported, configured
            );
        }
        self.prefix_matches = matches;
    }

    /// Feeds a host echo, subject to the [`HostCheck`] policy.
    pub fn observe_host(&mut self, reported: &str, configured: &str) {
        match self.host_check {
            HostCheck::Disabled => {}
            HostCheck::Enabled => {
                let matches = reported == configured;
                if self.host_matches && !matches {
                    debug!(
                        "device reports host {} but ours is {}, another client took over",
                        reported, configured
                    );
                }
                self.host_matches = matches;
            }
        }
    }

    /// The aggregate: focused only while every sub-comparison holds.
    pub fn focused(&self) -> bool {
        self.port_matches && self.host_matches && self.prefix_matches
    }

    pub fn port_matches(&self) -> bool {
        self.port_matches
    }

    pub fn host_matches(&self) -> bool {
        self.host_matches
    }

    pub fn prefix_matches(&self) -> bool {
        self.prefix_matches
    }

    pub fn host_check(&self) -> HostCheck {
        self.host_check
    }
}
