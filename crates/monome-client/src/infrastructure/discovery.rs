//! Device resolution.
//!
//! Sessions are dialed against a [`DeviceEndpoint`], but callers usually know
//! a device by name (`m128-302`). The [`DeviceResolver`] trait turns names
//! into endpoints. It is a seam: the crate consumes resolvers, it does not
//! prescribe where the endpoints come from. A host application might back it
//! with a zeroconf browser, a daemon query, or a hardcoded table.
//!
//! [`StaticResolver`] is the table-backed implementation used by the demo
//! binary, fed from the configuration file.

use async_trait::async_trait;
use monome_core::DeviceEndpoint;
use tracing::debug;

/// Maps device names to the endpoints they listen on.
#[async_trait]
pub trait DeviceResolver: Send + Sync {
    /// Returns the endpoint for `name`, or `None` when the name is unknown.
    async fn resolve(&self, name: &str) -> Option<DeviceEndpoint>;
}

/// A resolver over a fixed endpoint table.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    endpoints: Vec<DeviceEndpoint>,
}

impl StaticResolver {
    pub fn new(endpoints: Vec<DeviceEndpoint>) -> Self {
        Self { endpoints }
    }

    /// Adds an endpoint to the table. A later entry with the same name wins.
    pub fn add(&mut self, endpoint: DeviceEndpoint) {
        self.endpoints.push(endpoint);
    }

    /// Names of every known device, in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.name.as_str()).collect()
    }
}

#[async_trait]
impl DeviceResolver for StaticResolver {
    async fn resolve(&self, name: &str) -> Option<DeviceEndpoint> {
        let found = self.endpoints.iter().rev().find(|e| e.name == name);
        if found.is_none() {
            debug!("no endpoint on record for device {name}");
        }
        found.cloned()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
