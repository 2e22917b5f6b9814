//! Publish/subscribe registry for engine events.

use std::fmt;

use sum_ten_core::{Event, EventKind};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Selects which events a subscriber receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event.
    All,
    /// Only events of the listed kinds.
    Only(Vec<EventKind>),
}

impl EventFilter {
    /// Reports whether events of `kind` pass the filter.
    #[must_use]
    pub fn matches(&self, kind: EventKind) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(kinds) => kinds.contains(&kind),
        }
    }
}

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Box<dyn FnMut(&Event)>,
}

/// Delivers events to subscribers in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events passing `filter`.
    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        self.subscribers.len() != before
    }

    /// Delivers `event` to every matching subscriber.
    pub fn publish(&mut self, event: &Event) {
        let kind = event.kind();
        for subscriber in &mut self.subscribers {
            if subscriber.filter.matches(kind) {
                (subscriber.handler)(event);
            }
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("next_id", &self.next_id)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
