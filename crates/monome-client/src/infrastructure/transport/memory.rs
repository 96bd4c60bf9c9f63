//! In-process transport for tests and examples.
//!
//! # Why a memory transport?
//!
//! The UDP transport needs real sockets, real ports, and a real device (or
//! a second socket pretending to be one). The `MemoryTransport` replaces
//! both directions with in-memory plumbing:
//!
//! - Everything the session sends is recorded and readable via
//!   [`MemoryTransport::sent`].
//! - A test plays the device by calling [`MemoryTransport::inject`], which
//!   delivers a message to the session's router as if it had arrived off
//!   the wire.
//! - [`MemoryTransport::fail_sends`] switches the sender into a failing
//!   mode to exercise the swallow-and-count policy.
//!
//! Messages injected before the link is opened queue up and are delivered
//! once the router attaches. Each `MemoryTransport` supports a single
//! `open`; opening twice panics, since the inbound channel has one end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use monome_core::{DeviceEndpoint, OscMessage};
use tokio::sync::mpsc;

use super::{MessageSender, Transport, TransportError, TransportLink};

/// Port reported when a memory link is opened with listen port 0.
const FAKE_EPHEMERAL_PORT: u16 = 49152;

/// Capacity of the injected-message channel.
const INBOUND_CHANNEL_CAPACITY: usize = 128;

pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<OscMessage>>>,
    failing: Arc<AtomicBool>,
    inbound_tx: mpsc::Sender<OscMessage>,
    inbound_rx: Mutex<Option<mpsc::Receiver<OscMessage>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
        }
    }

    /// Everything sent through the link so far, in send order.
    pub fn sent(&self) -> Vec<OscMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Plays the device: queues `message` for the session's router.
    ///
    /// Delivery stops silently once the router is gone (session closed).
    pub async fn inject(&self, message: OscMessage) {
        let _ = self.inbound_tx.send(message).await;
    }

    /// When `true`, subsequent sends fail, exercising the swallow path.
    pub fn fail_sends(&self, fail: bool) {
        self.failing.store(fail, Ordering::Relaxed);
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn open(
        &self,
        _endpoint: &DeviceEndpoint,
        listen_port: u16,
    ) -> Result<TransportLink, TransportError> {
        let events = self
            .inbound_rx
            .lock()
            .unwrap()
            .take()
            .expect("memory transport opened twice");
        let local_port = if listen_port == 0 {
            FAKE_EPHEMERAL_PORT
        } else {
            listen_port
        };
        Ok(TransportLink {
            sender: Arc::new(MemorySender {
                sent: Arc::clone(&self.sent),
                failing: Arc::clone(&self.failing),
            }),
            events,
            receiver_task: None,
            local_port,
        })
    }
}

/// Records outbound messages, or fails them when the transport is set to.
struct MemorySender {
    sent: Arc<Mutex<Vec<OscMessage>>>,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl MessageSender for MemorySender {
    async fn send(&self, message: &OscMessage) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(TransportError::Send(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "memory transport set to fail sends",
            )));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use monome_core::OscArg;

    fn endpoint() -> DeviceEndpoint {
        DeviceEndpoint {
            name: "mem-device".to_string(),
            host: "127.0.0.1".to_string(),
            port: 14000,
        }
    }

    #[tokio::test]
    async fn test_sent_messages_are_recorded_in_order() {
        // Arrange
        let transport = MemoryTransport::new();
        let link = transport.open(&endpoint(), 8000).await.unwrap();
        let first = OscMessage::new("/sys/info").unwrap();
        let second =
            OscMessage::with_args("/sys/port", vec![OscArg::Int(8000)]).unwrap();

        // Act
        link.sender.send(&first).await.unwrap();
        link.sender.send(&second).await.unwrap();

        // Assert
        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].address(), "/sys/info");
        assert_eq!(sent[1].address(), "/sys/port");
    }

    #[tokio::test]
    async fn test_injected_message_arrives_on_the_link() {
        // Arrange
        let transport = MemoryTransport::new();
        let injected =
            OscMessage::with_args("/sys/size", vec![OscArg::Int(16), OscArg::Int(8)]).unwrap();
        transport.inject(injected.clone()).await;

        // Act – open after injecting; the queued message must survive
        let mut link = transport.open(&endpoint(), 8000).await.unwrap();
        let received = link.events.recv().await;

        // Assert
        assert_eq!(received, Some(injected));
    }

    #[tokio::test]
    async fn test_fail_sends_switches_the_sender_into_failing_mode() {
        // Arrange
        let transport = MemoryTransport::new();
        let link = transport.open(&endpoint(), 8000).await.unwrap();
        let msg = OscMessage::new("/sys/info").unwrap();

        // Act
        transport.fail_sends(true);
        let failed = link.sender.send(&msg).await;
        transport.fail_sends(false);
        let ok = link.sender.send(&msg).await;

        // Assert
        assert!(failed.is_err());
        assert!(ok.is_ok());
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_open_with_port_zero_reports_fake_ephemeral_port() {
        // Arrange
        let transport = MemoryTransport::new();

        // Act
        let link = transport.open(&endpoint(), 0).await.unwrap();

        // Assert
        assert_eq!(link.local_port, FAKE_EPHEMERAL_PORT);
    }
}
