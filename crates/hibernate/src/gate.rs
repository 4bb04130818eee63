use std::fmt;
use std::path::PathBuf;

/// Lifecycle events a session can broadcast to external listeners.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    /// Traversal is about to start.
    Begin,
    /// Traversal finished (normally or not).
    End,
    /// The driver moved up out of a directory, fired once per directory
    /// left even when an entry skips several levels at once.
    Ascend,
    /// The driver moved down into a directory.
    Descend,
    /// The wake condition matched.
    Wake,
    /// The sleep condition matched.
    Sleep,
}

impl EventKind {
    const COUNT: usize = 6;

    const fn index(self) -> usize {
        match self {
            Self::Begin => 0,
            Self::End => 1,
            Self::Ascend => 2,
            Self::Descend => 3,
            Self::Wake => 4,
            Self::Sleep => 5,
        }
    }
}

/// Payload delivered to event subscribers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
    /// Traversal starts at `root`.
    Begin {
        /// The traversal root.
        root: PathBuf,
    },
    /// Traversal is over.
    End,
    /// The driver left `path`.
    Ascend {
        /// Directory being left.
        path: PathBuf,
    },
    /// The driver entered `path`.
    Descend {
        /// Directory being entered.
        path: PathBuf,
    },
    /// The session woke at `at`.
    Wake {
        /// Node path that matched the wake condition.
        at: PathBuf,
    },
    /// The session went to sleep at `at`.
    Sleep {
        /// Node path that matched the sleep condition.
        at: PathBuf,
    },
}

/// Subscriber callback invoked when an unmuted gate dispatches.
pub type Handler = Box<dyn FnMut(&Notification) + Send>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Dispatcher {
    Noop,
    Single,
    Broadcast,
}

/// Mute/unmute control over one event kind's notification dispatch.
///
/// The dispatcher is recomputed only when the subscriber list changes;
/// muting never alters it, so unmuting restores exactly the pre-mute
/// behaviour.
pub struct Gate {
    subscribers: Vec<Handler>,
    dispatcher: Dispatcher,
    muted: bool,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            dispatcher: Dispatcher::Noop,
            muted: false,
        }
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("subscribers", &self.subscribers.len())
            .field("dispatcher", &self.dispatcher)
            .field("muted", &self.muted)
            .finish()
    }
}

impl Gate {
    /// Subscribes a handler and recomputes the dispatcher.
    pub fn on(&mut self, handler: Handler) {
        self.subscribers.push(handler);
        self.dispatcher = match self.subscribers.len() {
            0 => Dispatcher::Noop,
            1 => Dispatcher::Single,
            _ => Dispatcher::Broadcast,
        };
    }

    /// Mutes dispatch. Idempotent.
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Restores the last-computed dispatcher.
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Returns whether the gate is muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Invokes the current dispatcher unless muted.
    pub fn dispatch(&mut self, notification: &Notification) {
        if self.muted {
            return;
        }
        match self.dispatcher {
            Dispatcher::Noop => {}
            Dispatcher::Single => {
                if let Some(handler) = self.subscribers.first_mut() {
                    handler(notification);
                }
            }
            Dispatcher::Broadcast => {
                for handler in &mut self.subscribers {
                    handler(notification);
                }
            }
        }
    }
}

/// Per-session registry of one [`Gate`] per [`EventKind`].
///
/// Built fresh for every session; never shared process-wide.
#[derive(Debug, Default)]
pub struct NotificationHub {
    gates: [Gate; EventKind::COUNT],
}

impl NotificationHub {
    /// Creates a hub with every gate unmuted and unsubscribed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to `kind`.
    pub fn on(&mut self, kind: EventKind, handler: Handler) {
        self.gates[kind.index()].on(handler);
    }

    /// Mutes one event kind.
    pub fn mute(&mut self, kind: EventKind) {
        self.gates[kind.index()].mute();
    }

    /// Unmutes one event kind.
    pub fn unmute(&mut self, kind: EventKind) {
        self.gates[kind.index()].unmute();
    }

    /// Mutes every gate (used while fast-forwarding to a recorded position).
    pub fn mute_all(&mut self) {
        for gate in &mut self.gates {
            gate.mute();
        }
    }

    /// Unmutes every gate.
    pub fn unmute_all(&mut self) {
        for gate in &mut self.gates {
            gate.unmute();
        }
    }

    /// Returns whether `kind` is muted.
    #[must_use]
    pub fn is_muted(&self, kind: EventKind) -> bool {
        self.gates[kind.index()].is_muted()
    }

    /// Dispatches `notification` through the gate for `kind`.
    pub fn dispatch(&mut self, kind: EventKind, notification: &Notification) {
        self.gates[kind.index()].dispatch(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn counting_handler(count: &Arc<Mutex<Vec<u32>>>, id: u32) -> Handler {
        let count = Arc::clone(count);
        Box::new(move |_notification| count.lock().unwrap().push(id))
    }

    #[test]
    fn unsubscribed_gate_dispatch_is_noop() {
        let mut gate = Gate::default();
        gate.dispatch(&Notification::End);
    }

    #[test]
    fn single_subscriber_receives_notifications() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut gate = Gate::default();
        gate.on(counting_handler(&seen, 1));
        gate.dispatch(&Notification::End);
        assert_eq!(seen.lock().unwrap().as_slice(), &[1]);
    }

    #[test]
    fn two_subscribers_broadcast_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut gate = Gate::default();
        gate.on(counting_handler(&seen, 1));
        gate.on(counting_handler(&seen, 2));
        gate.dispatch(&Notification::End);
        assert_eq!(seen.lock().unwrap().as_slice(), &[1, 2]);
    }

    #[test]
    fn mute_is_idempotent_and_unmute_restores_dispatcher() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut gate = Gate::default();
        gate.on(counting_handler(&seen, 1));
        gate.on(counting_handler(&seen, 2));

        gate.mute();
        gate.mute();
        gate.dispatch(&Notification::End);
        assert!(seen.lock().unwrap().is_empty());

        gate.unmute();
        gate.dispatch(&Notification::End);
        assert_eq!(seen.lock().unwrap().as_slice(), &[1, 2]);
    }

    #[test]
    fn hub_mute_all_silences_every_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hub = NotificationHub::new();
        hub.on(EventKind::Begin, counting_handler(&seen, 1));
        hub.on(EventKind::Wake, counting_handler(&seen, 2));

        hub.mute_all();
        hub.dispatch(
            EventKind::Begin,
            &Notification::Begin {
                root: "/tree".into(),
            },
        );
        hub.dispatch(EventKind::Wake, &Notification::Wake { at: "/tree/x".into() });
        assert!(seen.lock().unwrap().is_empty());

        hub.unmute_all();
        hub.dispatch(EventKind::Wake, &Notification::Wake { at: "/tree/x".into() });
        assert_eq!(seen.lock().unwrap().as_slice(), &[2]);
    }
}
