//! UDP transport: the production socket pair.
//!
//! serialosc speaks over two one-way UDP flows per device: the device sends
//! events to the port the client announced, and the client sends commands
//! to the device's own port. This module maps that onto one bound inbound
//! socket with a dedicated receive loop and one connected outbound socket.
//!
//! Datagrams that do not decode are dropped with a debug log. The protocol
//! treats stray traffic as normal background noise, so a bad datagram is
//! not a session-level event.

use std::sync::Arc;

use async_trait::async_trait;
use monome_core::{decode_message, encode_message, DeviceEndpoint, OscMessage};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::{MessageSender, Transport, TransportError, TransportLink};

/// Largest datagram the receive loop accepts. The biggest message in the
/// dialect, a 64-level ring map, is under 300 bytes.
const RECV_BUFFER_SIZE: usize = 2048;

/// Capacity of the channel between the receive loop and the router.
const INBOUND_CHANNEL_CAPACITY: usize = 128;

/// Opens a UDP socket pair per session.
#[derive(Debug, Default)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn open(
        &self,
        endpoint: &DeviceEndpoint,
        listen_port: u16,
    ) -> Result<TransportLink, TransportError> {
        let inbound = UdpSocket::bind(("0.0.0.0", listen_port))
            .await
            .map_err(|source| TransportError::Bind {
                port: listen_port,
                source,
            })?;
        let local_port = inbound
            .local_addr()
            .map_err(|source| TransportError::Bind {
                port: listen_port,
                source,
            })?
            .port();

        let outbound =
            UdpSocket::bind(("0.0.0.0", 0))
                .await
                .map_err(|source| TransportError::Connect {
                    host: endpoint.host.clone(),
                    port: endpoint.port,
                    source,
                })?;
        outbound
            .connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|source| TransportError::Connect {
                host: endpoint.host.clone(),
                port: endpoint.port,
                source,
            })?;

        // The receive loop starts only after both sockets are up, so a
        // failed open leaves no task behind.
        let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let receiver_task = tokio::spawn(receive_loop(inbound, tx));

        debug!(device = %endpoint, local_port, "udp transport open");

        Ok(TransportLink {
            sender: Arc::new(UdpSender { socket: outbound }),
            events: rx,
            receiver_task: Some(receiver_task),
            local_port,
        })
    }
}

/// Reads datagrams and forwards decoded messages in arrival order.
///
/// Ends when the consumer side of the channel is dropped or the socket
/// errors; the owning session aborts the task on close.
async fn receive_loop(socket: UdpSocket, tx: mpsc::Sender<OscMessage>) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, from)) => match decode_message(&buf[..len]) {
                Ok((message, _)) => {
                    trace!(address = %message.address(), %from, "inbound message");
                    if tx.send(message).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(%from, "dropping undecodable datagram: {e}");
                }
            },
            Err(e) => {
                debug!("inbound socket error: {e}");
                break;
            }
        }
    }
}

/// Sends encoded messages on the connected outbound socket.
struct UdpSender {
    socket: UdpSocket,
}

#[async_trait]
impl MessageSender for UdpSender {
    async fn send(&self, message: &OscMessage) -> Result<(), TransportError> {
        let bytes = encode_message(message)?;
        self.socket.send(&bytes).await?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback_endpoint(port: u16) -> DeviceEndpoint {
        DeviceEndpoint {
            name: "test-device".to_string(),
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    #[tokio::test]
    async fn test_open_with_port_zero_resolves_ephemeral_port() {
        // Arrange
        let transport = UdpTransport::new();

        // Act
        let link = transport
            .open(&loopback_endpoint(14000), 0)
            .await
            .expect("open");

        // Assert
        assert_ne!(link.local_port, 0);
    }

    #[tokio::test]
    async fn test_open_fails_when_port_is_taken() {
        // Arrange – occupy a port first
        let holder = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let taken = holder.local_addr().unwrap().port();
        let transport = UdpTransport::new();

        // Act
        let result = transport.open(&loopback_endpoint(14000), taken).await;

        // Assert
        match result {
            Err(TransportError::Bind { port, .. }) => assert_eq!(port, taken),
            Err(other) => panic!("expected Bind error, got {other}"),
            Ok(_) => panic!("expected Bind error, got an open link"),
        }
    }
}
