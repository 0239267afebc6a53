//! Event channel built on crossbeam-channel.
//!
//! The engine only ever holds an [`EventSender`]; whoever renders progress
//! (CLI progress bar, JSON logger, tests) owns the [`EventReceiver`].

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Cloneable handle the engine emits events through
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Wrap a raw crossbeam sender
    pub fn new(sender: Sender<Event>) -> Self {
        Self { inner: sender }
    }

    /// Emit an event.
    ///
    /// A dropped receiver is not an error: progress reporting is optional and
    /// a scan never fails because nobody is listening.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving end, owned by the presentation layer
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event; `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Next event if one is queued
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; events are small, so this is the usual choice
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Bounded channel, for a consumer that needs backpressure
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// A sender whose receiver is already gone, for runs without a UI
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

/// Limits progress events to roughly 50 per phase, and at most one per
/// 1000 items.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval: usize,
    last_emitted: usize,
}

impl ProgressThrottle {
    pub fn new(total: usize) -> Self {
        Self {
            interval: (total / 50).clamp(1, 1000),
            last_emitted: 0,
        }
    }

    /// `true` when `completed` is far enough past the last emitted value
    pub fn should_emit(&mut self, completed: usize) -> bool {
        if completed >= self.last_emitted + self.interval {
            self.last_emitted = completed;
            return true;
        }
        false
    }
}
