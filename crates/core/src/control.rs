//! In-process control channel feeding the bridge task.
//!
//! Adapters never touch the transport directly: they queue typed requests
//! through a [`BridgeHandle`] and the single bridge task applies them in
//! order, which keeps one writer on the wire.

use minilink_protocol::{ArmMode, CommunicationId, Rgb};
use tokio::sync::mpsc;

/// Typed request flowing from hub adapters into the bridge task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    /// Power for a switch, television, or strip slot.
    SetPower { id: CommunicationId, on: bool },
    SetAlarmMode { id: CommunicationId, mode: ArmMode },
    SetStripColor { id: CommunicationId, color: Rgb },
    SetStripEffect { id: CommunicationId, effect: u8 },
    PointLauncherBase { id: CommunicationId, angle: u16 },
    PointLauncherElevation { id: CommunicationId, angle: u16 },
    FireMissiles { id: CommunicationId, count: u8 },
    SetMuted { id: CommunicationId, muted: bool },
    SetVolume { id: CommunicationId, volume: u8 },
    VolumeUp { id: CommunicationId },
    VolumeDown { id: CommunicationId },
    /// Hub light state change, resolved to a board slot by entity id.
    LightPower { entity_id: String, on: bool },
    LightBrightness { entity_id: String, brightness: u8 },
    LightTemperature { entity_id: String, kelvin: u16 },
    LightColor { entity_id: String, color: Rgb },
    /// Re-announce the handshake on the next poll.
    Resync,
}

/// Cheap-clone sender half handed to adapters.
#[derive(Clone)]
pub struct BridgeHandle {
    sender: mpsc::UnboundedSender<ControlRequest>,
}

impl BridgeHandle {
    /// Create a handle and the receiving side owned by the bridge task.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ControlRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Queue a request for the bridge task.
    ///
    /// Dropped with a warning when the task is gone; senders have no way to
    /// act on that and the daemon is shutting down anyway.
    pub fn send(&self, request: ControlRequest) {
        if self.sender.send(request).is_err() {
            tracing::warn!("bridge task is gone, dropping control request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deliver_requests_in_order() {
        let (handle, mut receiver) = BridgeHandle::channel();
        handle.send(ControlRequest::Resync);
        handle.send(ControlRequest::SetPower {
            id: CommunicationId::new(7),
            on: true,
        });

        assert_eq!(receiver.try_recv(), Ok(ControlRequest::Resync));
        assert_eq!(
            receiver.try_recv(),
            Ok(ControlRequest::SetPower {
                id: CommunicationId::new(7),
                on: true,
            })
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn should_absorb_send_after_receiver_dropped() {
        let (handle, receiver) = BridgeHandle::channel();
        drop(receiver);
        handle.send(ControlRequest::Resync);
    }

    #[test]
    fn should_clone_handle_for_many_senders() {
        let (handle, mut receiver) = BridgeHandle::channel();
        let other = handle.clone();
        other.send(ControlRequest::VolumeUp {
            id: CommunicationId::new(6),
        });
        assert!(receiver.try_recv().is_ok());
    }
}
