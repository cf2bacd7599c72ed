//! Events delivered to the main loop and the queue that carries them.
//!
//! Background activities never touch booth state. They post opaque
//! [`BoothEvent`]s into a bounded queue which the main loop drains once per
//! tick.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

/// Default queue depth. A guest hammering the button should not build a backlog.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Input the booth reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothEvent {
    /// Stop the main loop
    Quit,
    /// Local start request (keyboard)
    Start,
    /// The external hardware button was pressed
    ButtonPressed,
}

impl BoothEvent {
    /// True for events that request a new session.
    pub fn is_start_request(self) -> bool {
        matches!(self, BoothEvent::Start | BoothEvent::ButtonPressed)
    }
}

/// Producer half, handed to a background activity.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: SyncSender<BoothEvent>,
}

impl EventSender {
    /// Post an event without blocking.
    ///
    /// Returns `false` if the queue is full (event dropped) or the main loop
    /// has gone away.
    pub fn post(&self, event: BoothEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("Event queue full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer half, owned by the main loop.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<BoothEvent>,
}

impl EventReceiver {
    /// Take every event currently queued, without blocking.
    pub fn drain(&self) -> Vec<BoothEvent> {
        self.rx.try_iter().collect()
    }
}

/// Create a bounded event queue.
pub fn event_queue(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}
