/*

    Minimal synchronous event: subscribers register a callback and get
    back a handle; dropping the handle unsubscribes. The box pipeline
    is single threaded by contract, so this is plain Rc/RefCell with
    no locking.

    Callbacks must not connect or disconnect subscribers of the same
    event from inside the callback (the registry is borrowed during
    emit).

    @date: 20 Nov, 2025
    @author: bartu
*/

use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct Registry<T: ?Sized> {
    next_id: u64,
    subscribers: Vec<(u64, Box<dyn FnMut(&T)>)>,
}

/// An event channel carrying values of type &T to its subscribers.
pub struct Event<T: ?Sized> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: ?Sized> Default for Event<T> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }
}

impl<T: ?Sized> Event<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. It stays subscribed for as long as the
    /// returned connection is alive.
    #[must_use = "dropping the connection immediately unsubscribes the callback"]
    pub fn connect(&self, callback: impl FnMut(&T) + 'static) -> Connection<T> {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, Box::new(callback)));

        Connection {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Invoke every live subscriber with the given value, in
    /// subscription order.
    pub fn emit(&self, value: &T) {
        for (_, callback) in self.registry.borrow_mut().subscribers.iter_mut() {
            callback(value);
        }
    }

    pub fn connection_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }
}

/// Subscription handle. Dropping it removes the callback from the
/// event; outliving the event is fine (the drop becomes a no-op).
pub struct Connection<T: ?Sized> {
    id: u64,
    registry: Weak<RefCell<Registry<T>>>,
}

impl<T: ?Sized> Drop for Connection<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .subscribers
                .retain(|(id, _)| *id != self.id);
        }
    }
}
