// Transport boundary
// The core hands frames to a Transport and never retries; delivery may be
// duplicated or reordered.

use crate::protocol::messages::TransportFrame;
use crate::protocol::wire::{pack_frame, unpack_frame};
use crate::utils::error::{ChannelError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand one frame to the network.
    async fn deliver(&self, frame: TransportFrame) -> Result<()>;
}

/// In-process transport: frames are packed to MessagePack and unpacked on
/// the other end.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    delivered: Arc<AtomicUsize>,
}

#[derive(Debug)]
pub struct LoopbackReceiver {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// Create a connected transport/receiver pair.
pub fn loopback() -> (LoopbackTransport, LoopbackReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        LoopbackTransport {
            tx,
            delivered: Arc::new(AtomicUsize::new(0)),
        },
        LoopbackReceiver { rx },
    )
}

impl LoopbackTransport {
    /// Number of frames that crossed this transport.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn deliver(&self, frame: TransportFrame) -> Result<()> {
        let packed = pack_frame(&frame)?;
        let size = packed.len();

        self.tx
            .send(packed)
            .map_err(|_| ChannelError::TransportError("Loopback receiver dropped".to_string()))?;
        self.delivered.fetch_add(1, Ordering::SeqCst);

        tracing::trace!(target: "transport", message_id = %frame.message_id, size, "Frame delivered");
        Ok(())
    }
}

impl LoopbackReceiver {
    /// Wait for the next frame. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Result<TransportFrame>> {
        self.rx.recv().await.map(|bytes| unpack_frame(&bytes))
    }

    /// Next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Result<TransportFrame>> {
        self.rx.try_recv().ok().map(|bytes| unpack_frame(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::Envelope;
    use crate::protocol::messages::MessageKind;

    fn frame() -> TransportFrame {
        TransportFrame {
            message_id: crate::utils::uuid::generate_v4(),
            sender_id: "alice".to_string(),
            timestamp_millis: 1,
            kind: MessageKind::Text,
            envelope: Envelope::from_parts(vec![7u8; 12], vec![9u8; 20]),
        }
    }

    #[tokio::test]
    async fn test_loopback_crosses_serialization() {
        let (transport, mut receiver) = loopback();
        let sent = frame();

        transport.deliver(sent.clone()).await.unwrap();

        assert_eq!(transport.delivered(), 1);
        assert_eq!(receiver.recv().await.unwrap().unwrap(), sent);
        assert!(receiver.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_transport_error() {
        let (transport, receiver) = loopback();
        drop(receiver);

        assert!(matches!(
            transport.deliver(frame()).await,
            Err(ChannelError::TransportError(_))
        ));
        assert_eq!(transport.delivered(), 0);
    }
}
