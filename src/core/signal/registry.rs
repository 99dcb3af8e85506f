//=========================================================================
// Signal Registry
//=========================================================================
//
// One lazily created dispatcher per event type.
//
// Architecture:
//   get_or_create<E>() → HashMap<TypeId, Box<dyn AnyDispatcher>>
//                              ↓ downcast
//                          Signal<E> handle (shared)
//   clear() → drop every subscriber list, keep the dispatchers
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::dispatcher::{AnyDispatcher, Event, Signal};

//=== SignalRegistry ======================================================

/// Type-keyed collection of [`Signal`] dispatchers.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct SignalRegistry {
    label: &'static str,
    dispatchers: Rc<RefCell<HashMap<TypeId, Box<dyn AnyDispatcher>>>>,
}

impl SignalRegistry {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            dispatchers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Returns the dispatcher for `E`, creating it on first access.
    pub fn get_or_create<E: Event>(&self) -> Signal<E> {
        let mut dispatchers = self.dispatchers.borrow_mut();
        let entry = dispatchers.entry(TypeId::of::<E>()).or_insert_with(|| {
            debug!(
                "Creating {} dispatcher for {}",
                self.label,
                std::any::type_name::<E>()
            );
            Box::new(Signal::<E>::new())
        });

        match entry.as_any().downcast_ref::<Signal<E>>() {
            Some(signal) => signal.clone(),
            None => {
                // TypeId keys make this unreachable.
                error!("Type mismatch in {} signal registry", self.label);
                Signal::new()
            }
        }
    }

    /// Convenience: emit through the dispatcher for `E`.
    pub fn emit<E: Event>(&self, event: &E) {
        let signal = self.get_or_create::<E>();
        signal.emit(event);
    }

    /// Drops every subscriber of every dispatcher in this registry.
    pub fn clear(&self) {
        let dispatchers = self.dispatchers.borrow();
        for dispatcher in dispatchers.values() {
            dispatcher.clear_subscribers();
        }
        debug!("Cleared {} signal registry ({} dispatchers)", self.label, dispatchers.len());
    }

    pub fn dispatcher_count(&self) -> usize {
        self.dispatchers.borrow().len()
    }

    /// Total subscribers across all dispatchers.
    pub fn subscriber_count(&self) -> usize {
        self.dispatchers
            .borrow()
            .values()
            .map(|d| d.subscriber_count())
            .sum()
    }
}

impl std::fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistry")
            .field("label", &self.label)
            .field("dispatchers", &self.dispatcher_count())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
