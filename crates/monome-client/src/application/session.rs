//! Device session lifecycle.
//!
//! A [`DeviceSession`] owns everything belonging to one device connection:
//! the transport link, the device state record, the listener registry, the
//! routing task, and the diagnostics counters. It is the unit of lifecycle:
//! bootstrap, active, closed.
//!
//! # Bootstrap order (for beginners)
//!
//! The order matters because the device starts answering as soon as the
//! first message reaches it:
//!
//! 1. Open the transport. The inbound receiver is bound and feeding the
//!    channel before `open` returns, so nothing the device sends back is
//!    dropped.
//! 2. Spawn the router task as the channel's sole consumer.
//! 3. Send `/sys/info` so the device reports its size and id.
//! 4. Acquire focus: announce our port, prefix, and host, then
//!    provisionally claim all three focus flags.
//!
//! Only transport setup can fail. Every later interaction is
//! fire-and-forget, so the returned session never raises again; watch
//! [`DeviceSession::focused`] and [`DeviceSession::diagnostics`] instead.

use std::sync::Arc;

use monome_core::{
    protocol::addresses, DeviceEndpoint, DeviceState, HostCheck, InvalidPrefix, OscArg, Prefix,
    DEFAULT_PREFIX,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::application::commands::{CommandSink, GridCommands, RingCommands, TiltCommands};
use crate::application::diagnostics::{DiagnosticsSnapshot, SessionDiagnostics};
use crate::application::listeners::{
    EncoderHandler, ListenerRegistry, PressHandler, Subscription, TiltHandler,
};
use crate::application::router::MessageRouter;
use crate::infrastructure::transport::{Transport, TransportError};

/// Session settings with the reference defaults: receive on port 8000,
/// claim the `/monome` prefix.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Local port for inbound device events. 0 lets the OS pick; the
    /// resolved port is what gets announced to the device.
    pub listen_port: u16,
    /// Address prefix to claim on the device. Must start with `/`.
    pub prefix: String,
    /// Host announced to the device as the event destination.
    pub host: String,
    /// Whether host echoes participate in the focus comparison.
    pub host_check: HostCheck,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            listen_port: 8000,
            prefix: DEFAULT_PREFIX.to_string(),
            host: "127.0.0.1".to_string(),
            host_check: HostCheck::Disabled,
        }
    }
}

/// Errors surfaced to the caller. Bootstrap failures are fatal to the
/// session being built; after a successful connect the only error left is
/// calling a configuring method on a closed session.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The transport could not be set up (bind or connect failure).
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// The configured prefix is not a valid address prefix.
    #[error(transparent)]
    Prefix(#[from] InvalidPrefix),

    /// The session has been closed.
    #[error("session is closed")]
    Closed,
}

/// One live connection to a grid, arc, or tilt device.
pub struct DeviceSession {
    endpoint: DeviceEndpoint,
    state: Arc<RwLock<DeviceState>>,
    registry: Arc<ListenerRegistry>,
    diagnostics: Arc<SessionDiagnostics>,
    sink: CommandSink,
    router_task: JoinHandle<()>,
    receiver_task: Option<JoinHandle<()>>,
}

impl DeviceSession {
    /// Bootstraps a session against `endpoint` over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Prefix`] for an invalid configured prefix
    /// and [`ConnectionError::Transport`] when the inbound receiver cannot
    /// bind or the outbound sender cannot be constructed. A failed bootstrap
    /// leaves nothing running and nothing bound.
    pub async fn connect(
        endpoint: DeviceEndpoint,
        config: SessionConfig,
        transport: &dyn Transport,
    ) -> Result<Self, ConnectionError> {
        let prefix = Prefix::new(config.prefix.as_str())?;

        let link = transport.open(&endpoint, config.listen_port).await?;

        let state = Arc::new(RwLock::new(DeviceState::new(
            prefix,
            config.host.clone(),
            link.local_port,
            endpoint.port,
            config.host_check,
        )));
        let registry = Arc::new(ListenerRegistry::new());
        let diagnostics = Arc::new(SessionDiagnostics::new());

        let router = MessageRouter::new(
            Arc::clone(&state),
            Arc::clone(&registry),
            Arc::clone(&diagnostics),
        );
        let router_task = tokio::spawn(router.run(link.events));

        let sink = CommandSink::new(Arc::clone(&state), link.sender, Arc::clone(&diagnostics));

        let session = Self {
            endpoint,
            state,
            registry,
            diagnostics,
            sink,
            router_task,
            receiver_task: link.receiver_task,
        };

        info!(
            device = %session.endpoint,
            listen_port = link.local_port,
            "device session bootstrapped"
        );

        session.request_info().await;
        session.acquire_focus().await;

        Ok(session)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Shuts the session down.
    ///
    /// Safe to call more than once; the second call is a no-op. The routing
    /// and receive tasks are aborted, so queued inbound messages are
    /// discarded (a listener callback already executing finishes), the
    /// outbound handle is released, listeners are cleared, and focus is
    /// dropped. Commands issued after close are silently dropped.
    pub async fn close(&self) {
        if !self.sink.disarm() {
            debug!(device = %self.endpoint, "close called on an already closed session");
            return;
        }
        self.router_task.abort();
        if let Some(task) = &self.receiver_task {
            task.abort();
        }
        self.registry.clear();
        self.state.write().await.clear_focus();
        info!(device = %self.endpoint, "device session closed");
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.sink.is_disarmed()
    }

    // ── Focus and configuration ───────────────────────────────────────────────

    /// Announces our inbound port, prefix, and host, in that order, then
    /// provisionally claims focus.
    ///
    /// The device echoes whichever client's announcement it last accepted;
    /// the focus flags drop as mismatching echoes arrive. There is no
    /// automatic re-acquisition: call this again to contend for the device
    /// after losing it.
    pub async fn acquire_focus(&self) {
        if self.is_closed() {
            return;
        }
        let (port, prefix, host) = {
            let state = self.state.read().await;
            (
                i32::from(state.inbound_port()),
                state.prefix().as_str().to_string(),
                state.host().to_string(),
            )
        };
        self.sink
            .fire_sys(addresses::SYS_PORT, vec![OscArg::Int(port)])
            .await;
        self.sink
            .fire_sys(addresses::SYS_PREFIX, vec![OscArg::Str(prefix)])
            .await;
        self.sink
            .fire_sys(addresses::SYS_HOST, vec![OscArg::Str(host)])
            .await;
        self.state.write().await.claim_focus();
    }

    /// Replaces the session prefix and re-runs focus acquisition. Commands
    /// issued after this call use the new prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Prefix`] if `prefix` does not start with
    /// `/`, or [`ConnectionError::Closed`] on a closed session.
    pub async fn set_prefix(&self, prefix: &str) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        let prefix = Prefix::new(prefix)?;
        self.state.write().await.set_prefix(prefix);
        self.acquire_focus().await;
        Ok(())
    }

    /// Asks the device to report its size and id again.
    pub async fn request_info(&self) {
        self.sink.fire_sys(addresses::SYS_INFO, vec![]).await;
    }

    /// Sets the grid rotation in degrees. The device accepts 0, 90, 180,
    /// and 270. Fire-and-forget like every command.
    pub async fn set_rotation(&self, degrees: i32) {
        self.sink
            .fire_sys(addresses::SYS_ROTATION, vec![OscArg::Int(degrees)])
            .await;
    }

    // ── Command namespaces ────────────────────────────────────────────────────

    /// Grid LED commands bound to this session.
    pub fn grid(&self) -> GridCommands {
        GridCommands::new(self.sink.clone())
    }

    /// Arc ring LED commands bound to this session.
    pub fn ring(&self) -> RingCommands {
        RingCommands::new(self.sink.clone())
    }

    /// Tilt sensor commands bound to this session.
    pub fn tilt(&self) -> TiltCommands {
        TiltCommands::new(self.sink.clone())
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    /// Registers a grid press handler.
    pub fn subscribe_to_press(&self, handler: Arc<dyn PressHandler>) -> Subscription {
        self.registry.subscribe_to_press(handler)
    }

    /// Registers a tilt handler.
    pub fn subscribe_to_tilt(&self, handler: Arc<dyn TiltHandler>) -> Subscription {
        self.registry.subscribe_to_tilt(handler)
    }

    /// Registers an encoder handler for delta and key events.
    pub fn subscribe_to_encoder(&self, handler: Arc<dyn EncoderHandler>) -> Subscription {
        self.registry.subscribe_to_encoder(handler)
    }

    /// Removes a previously registered handler. Idempotent; safe to call
    /// from inside a handler.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.registry.unsubscribe(subscription)
    }

    // ── State reads ───────────────────────────────────────────────────────────

    /// The endpoint this session was connected to.
    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    /// Point-in-time copy of the full device state record.
    pub async fn snapshot(&self) -> DeviceState {
        self.state.read().await.clone()
    }

    /// Whether this session currently holds focus.
    pub async fn focused(&self) -> bool {
        self.state.read().await.focused()
    }

    /// Grid dimensions as (x, y); (0, 0) until the device reports them.
    pub async fn size(&self) -> (i32, i32) {
        let state = self.state.read().await;
        (state.size_x(), state.size_y())
    }

    /// Device identity; empty until the device reports it.
    pub async fn id(&self) -> String {
        self.state.read().await.id().to_string()
    }

    /// The currently configured prefix.
    pub async fn prefix(&self) -> String {
        self.state.read().await.prefix().as_str().to_string()
    }

    /// Counters for swallowed failures and routed traffic.
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }
}

impl Drop for DeviceSession {
    /// Backstop for sessions dropped without an explicit close: stops both
    /// tasks so the inbound socket and channel are released.
    fn drop(&mut self) {
        self.router_task.abort();
        if let Some(task) = &self.receiver_task {
            task.abort();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default_matches_reference_values() {
        // Arrange / Act
        let config = SessionConfig::default();

        // Assert
        assert_eq!(config.listen_port, 8000);
        assert_eq!(config.prefix, "/monome");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.host_check, HostCheck::Disabled);
    }

    #[test]
    fn test_connection_error_wraps_invalid_prefix() {
        // Arrange
        let err = Prefix::new("monome").unwrap_err();

        // Act
        let conn_err = ConnectionError::from(err);

        // Assert
        assert!(matches!(conn_err, ConnectionError::Prefix(_)));
    }
}
