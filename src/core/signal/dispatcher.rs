//=========================================================================
// Signal Dispatcher
//=========================================================================
//
// Typed multi-subscriber dispatcher plus the type-erased view the
// registry stores it behind.
//
// Emission works on a snapshot of the subscriber list, so handlers may
// subscribe, unsubscribe or clear while an event is being delivered.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

//=== Event ===============================================================

/// Marker trait for types that can be emitted through a [`Signal`].
///
/// Automatically implemented for all `'static` types.
pub trait Event: 'static {}

// Blanket implementation
impl<T: 'static> Event for T {}

//=== SubscriptionId ======================================================

/// Token returned by [`Signal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

//=== Signal ==============================================================

type Handler<E> = Rc<dyn Fn(&E)>;

struct Subscribers<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

/// Shared handle to the dispatcher for event type `E`.
pub struct Signal<E: Event> {
    subscribers: Rc<RefCell<Subscribers<E>>>,
}

impl<E: Event> Signal<E> {
    pub(super) fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> SubscriptionId {
        let mut subscribers = self.subscribers.borrow_mut();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.handlers.push((id, Rc::new(handler)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.handlers.len();
        subscribers.handlers.retain(|(sub, _)| *sub != id);
        subscribers.handlers.len() != before
    }

    /// Delivers `event` to every current subscriber in subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Handler<E>> = self
            .subscribers
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }

    pub fn clear(&self) {
        self.subscribers.borrow_mut().handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if both handles point at the same dispatcher.
    pub fn same_dispatcher(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.subscribers, &other.subscribers)
    }
}

impl<E: Event> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<E: Event> std::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("event", &std::any::type_name::<E>())
            .field("subscribers", &self.len())
            .finish()
    }
}

//=== AnyDispatcher =======================================================

/// Type-erased view of a [`Signal`] for storage in a registry.
pub(super) trait AnyDispatcher {
    /// Drops every subscriber, keeping the dispatcher itself.
    fn clear_subscribers(&self);

    fn subscriber_count(&self) -> usize;

    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> AnyDispatcher for Signal<E> {
    fn clear_subscribers(&self) {
        self.clear();
    }

    fn subscriber_count(&self) -> usize {
        self.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
