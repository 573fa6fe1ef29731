//! Message-passing boundary between the host and the watcher.
//!
//! The host's listeners push `WatcherEvent`s into an unbounded channel; a
//! single loop drains it and runs the handlers one at a time, so the pending
//! table needs no locking.

use tokio::sync::mpsc;

use super::events::{EventKind, Subscription, WatcherEvent, SUBSCRIPTIONS};
use super::tabs::TabRegistry;
use super::RequestWatcher;
use crate::rules::RuleUpdate;

/// Cloneable handle for pushing events into a running watcher.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<WatcherEvent>,
}

impl EventSender {
    /// Queue an event. Returns false once the watcher loop has stopped.
    pub fn send(&self, event: WatcherEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn update_rules(&self, update: RuleUpdate) -> bool {
        self.send(WatcherEvent::UpdateRules(update))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Host-side listener registry.
///
/// `add_listener` attaches a listener for `subscription.kind` that forwards
/// each notification through `sender`; `remove_listener` detaches it and
/// drops the sender.
pub trait NetworkEvents {
    fn add_listener(&mut self, subscription: &Subscription, sender: EventSender);
    fn remove_listener(&mut self, kind: EventKind);
}

/// Tracks whether the watcher's listeners are attached to a host.
///
/// `register` and `unregister` are no-ops when already in the requested state.
#[derive(Debug)]
pub struct Registration {
    sender: EventSender,
    registered: bool,
}

impl Registration {
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            registered: false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Attach one listener per subscription.
    pub fn register<H: NetworkEvents + ?Sized>(&mut self, host: &mut H) {
        if self.registered {
            return;
        }
        for subscription in &SUBSCRIPTIONS {
            host.add_listener(subscription, self.sender.clone());
        }
        self.registered = true;
        tracing::debug!("watcher listeners registered");
    }

    /// Detach exactly the listeners `register` attached.
    pub fn unregister<H: NetworkEvents + ?Sized>(&mut self, host: &mut H) {
        if !self.registered {
            return;
        }
        for subscription in &SUBSCRIPTIONS {
            host.remove_listener(subscription.kind);
        }
        self.registered = false;
        tracing::debug!("watcher listeners unregistered");
    }
}

/// Owns a watcher and the receiving end of its event channel.
pub struct WatcherService<T: TabRegistry> {
    watcher: RequestWatcher<T>,
    rx: mpsc::UnboundedReceiver<WatcherEvent>,
}

impl<T: TabRegistry> WatcherService<T> {
    /// Wrap `watcher`; the returned sender is the first handle into its channel.
    pub fn new(watcher: RequestWatcher<T>) -> (Self, EventSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { watcher, rx }, EventSender { tx })
    }

    /// Process events until every sender is dropped, then wait for
    /// outstanding tab lookups. Returns the watcher for inspection or reuse.
    pub async fn run(mut self) -> RequestWatcher<T> {
        let mut handled = 0u64;
        while let Some(event) = self.rx.recv().await {
            self.watcher.handle(event);
            handled += 1;
        }
        self.watcher.flush().await;
        tracing::info!(
            events = handled,
            pending = self.watcher.pending_len(),
            "watcher event loop finished"
        );
        self.watcher
    }
}
