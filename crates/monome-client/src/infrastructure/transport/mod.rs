//! Transport abstraction for device sessions.
//!
//! The protocol engine never touches sockets directly. It requires exactly
//! two capabilities from a transport:
//!
//! 1. Send an addressed message to the device (fire-and-forget).
//! 2. Deliver inbound messages asynchronously, one at a time, in arrival
//!    order, on a channel the session's router consumes.
//!
//! [`Transport::open`] provides both at once as a [`TransportLink`]: the
//! inbound side is live before the link is returned, so no message the
//! device sends in response to bootstrap traffic can be lost. The UDP
//! implementation in [`udp`] is the production transport; [`memory`] is an
//! in-process double for tests and examples.

use std::sync::Arc;

use async_trait::async_trait;
use monome_core::{DeviceEndpoint, OscMessage, ProtocolError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub mod memory;
pub mod udp;

pub use memory::MemoryTransport;
pub use udp::UdpTransport;

/// Errors from transport setup and sends.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The inbound socket could not be bound.
    #[error("failed to bind inbound socket on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The outbound socket could not be created or connected.
    #[error("failed to open outbound socket to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// An outbound message could not be serialized.
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] ProtocolError),

    /// The network send itself failed.
    #[error("send failed: {0}")]
    Send(#[from] std::io::Error),
}

/// Fire-and-forget outbound message channel to one device.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Hands one message to the transport.
    ///
    /// Returning `Ok` means the message left this process; the protocol has
    /// no acknowledgments, so nothing further is ever known about it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message cannot be encoded or the
    /// send fails locally.
    async fn send(&self, message: &OscMessage) -> Result<(), TransportError>;
}

/// A live, bidirectional link to one device.
pub struct TransportLink {
    /// Outbound channel to the device.
    pub sender: Arc<dyn MessageSender>,
    /// Inbound messages in arrival order. The session's router is the sole
    /// consumer.
    pub events: mpsc::Receiver<OscMessage>,
    /// The receive-loop task, when the transport runs one. Aborted on close.
    pub receiver_task: Option<JoinHandle<()>>,
    /// The locally bound inbound port. When the session is configured with
    /// port 0 this is the ephemeral port the OS picked, and it is the value
    /// announced to the device.
    pub local_port: u16,
}

/// Opens links to devices.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Binds the inbound side on `listen_port`, attaches the outbound side
    /// to `endpoint`, and returns the live link.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Bind`] or [`TransportError::Connect`] when
    /// either side cannot be set up. Both are fatal to the session being
    /// bootstrapped.
    async fn open(
        &self,
        endpoint: &DeviceEndpoint,
        listen_port: u16,
    ) -> Result<TransportLink, TransportError>;
}
