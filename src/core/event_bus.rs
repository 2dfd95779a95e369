use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::debug::{CallStackFrame, WatchExpression};
use crate::core::variable_scope::ScopeMap;

/// Why the debugger suspended the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    Breakpoint,
    Step,
    UserRequested,
    Initial,
}

impl PauseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseReason::Breakpoint => "breakpoint",
            PauseReason::Step => "step",
            PauseReason::UserRequested => "user_requested",
            PauseReason::Initial => "initial",
        }
    }
}

/// Debugger notification pushed to every subscriber.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebugEvent {
    /// Execution stopped on a breakpoint before the node ran
    BreakpointHit { node_id: String },

    /// Execution stopped after a node because of the step mode
    StepCompleted { node_id: String },

    /// Full variable scope at the moment of suspension
    VariablesUpdated { variables: ScopeMap },

    /// Innermost frame last
    CallStackUpdated { frames: Vec<CallStackFrame> },

    /// Watch list in display order with fresh values
    WatchesUpdated { watches: Vec<WatchExpression> },

    Suspended,

    Resumed,

    BreakpointAdded { node_id: String },

    BreakpointRemoved { node_id: String },

    BreakpointToggled { node_id: String, enabled: bool },

    SnapshotCreated { snapshot_id: String },

    SnapshotRestored { snapshot_id: String },

    DebugModeChanged { enabled: bool },
}

/// Event sender
pub type EventSender = mpsc::UnboundedSender<DebugEvent>;

/// Event receiver
pub type EventReceiver = mpsc::UnboundedReceiver<DebugEvent>;

/// Create an event channel
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Fan-out of [`DebugEvent`]s to any number of observers.
///
/// Publishing never blocks; subscribers whose receiver was dropped are pruned
/// on the next publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<EventSender>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = create_event_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn publish(&self, event: DebugEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel() {
        let (sender, mut receiver) = create_event_channel();

        sender
            .send(DebugEvent::BreakpointHit {
                node_id: "node1".to_string(),
            })
            .unwrap();

        let event = receiver.recv().await.unwrap();
        match event {
            DebugEvent::BreakpointHit { node_id } => {
                assert_eq!(node_id, "node1");
            }
            _ => panic!("Unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_bus_fans_out_to_all_subscribers() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(DebugEvent::Suspended);

        assert!(matches!(a.recv().await, Some(DebugEvent::Suspended)));
        assert!(matches!(b.recv().await, Some(DebugEvent::Suspended)));
    }

    #[test]
    fn test_bus_prunes_closed_subscribers() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        let _live = bus.subscribe();
        drop(rx);

        bus.publish(DebugEvent::Resumed);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let value = serde_json::to_value(DebugEvent::BreakpointAdded {
            node_id: "A".into(),
        })
        .unwrap();
        assert_eq!(value["type"], "breakpoint_added");
        assert_eq!(value["node_id"], "A");

        let value = serde_json::to_value(DebugEvent::Suspended).unwrap();
        assert_eq!(value["type"], "suspended");
    }

    #[test]
    fn test_pause_reason_as_str() {
        assert_eq!(PauseReason::Breakpoint.as_str(), "breakpoint");
        assert_eq!(PauseReason::UserRequested.as_str(), "user_requested");
    }
}
