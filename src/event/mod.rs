//! Account lifecycle events and the sinks that receive them.
//!
//! `DiscardEventMachine` is the default; `BroadcastEventMachine` fans events
//! out to any number of subscribers over a tokio broadcast channel. Slow
//! subscribers lose the oldest events rather than blocking the account.

use crate::core::trinary::{Hash, Trytes};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SentTransfer { tail: Hash, value: u64 },
    TransferConfirmed { tail: Hash },
    ReceivingDeposit { bundle: Hash, value: u64 },
    ReceivedDeposit { bundle: Hash, value: u64 },
    ReceivedMessage { bundle: Hash, message: Trytes },
    Error { message: String },
    Shutdown,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::SentTransfer { .. } => "sent_transfer",
            Event::TransferConfirmed { .. } => "transfer_confirmed",
            Event::ReceivingDeposit { .. } => "receiving_deposit",
            Event::ReceivedDeposit { .. } => "received_deposit",
            Event::ReceivedMessage { .. } => "received_message",
            Event::Error { .. } => "error",
            Event::Shutdown => "shutdown",
        }
    }
}

pub trait EventMachine: Send + Sync {
    fn emit(&self, event: Event);

    /// `None` when the machine does not deliver events.
    fn subscribe(&self) -> Option<broadcast::Receiver<Event>>;
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardEventMachine;

impl EventMachine for DiscardEventMachine {
    fn emit(&self, _event: Event) {}
    fn subscribe(&self) -> Option<broadcast::Receiver<Event>> { None }
}

#[derive(Debug, Clone)]
pub struct BroadcastEventMachine {
    sender: broadcast::Sender<Event>,
}

impl Default for BroadcastEventMachine {
    fn default() -> Self { Self::new(64) }
}

impl BroadcastEventMachine {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscriber_count(&self) -> usize { self.sender.receiver_count() }
}

impl EventMachine for BroadcastEventMachine {
    fn emit(&self, event: Event) {
        tracing::trace!("emit {}", event.name());
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<Event>> { Some(self.sender.subscribe()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_has_no_subscribers() {
        let machine = DiscardEventMachine;
        machine.emit(Event::Shutdown);
        assert!(machine.subscribe().is_none());
    }

    #[test]
    fn test_broadcast_delivers_to_all() {
        let machine = BroadcastEventMachine::default();
        let mut a = machine.subscribe().expect("subscribe");
        let mut b = machine.subscribe().expect("subscribe");
        assert_eq!(machine.subscriber_count(), 2);

        machine.emit(Event::TransferConfirmed { tail: "TAIL".into() });
        assert_eq!(a.try_recv().unwrap(), Event::TransferConfirmed { tail: "TAIL".into() });
        assert_eq!(b.try_recv().unwrap().name(), "transfer_confirmed");
    }

    #[test]
    fn test_emit_without_subscribers() {
        BroadcastEventMachine::new(1).emit(Event::Error { message: "boom".into() });
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(Event::ReceivedDeposit { bundle: "B".into(), value: 5 }).unwrap();
        assert_eq!(json["event"], "received_deposit");
        assert_eq!(json["value"], 5);
    }
}
