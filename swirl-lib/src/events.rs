use std::fmt;
use std::rc::Rc;

/// Identifies one subscription on an [`Emitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Handler<T> = Rc<dyn Fn(&T)>;

/// Point-to-point publish/subscribe for a single event.
///
/// `emit` snapshots the listener list before dispatching, so handlers may
/// subscribe or unsubscribe while being called.
pub struct Emitter<T: ?Sized> {
    next_id: u64,
    listeners: Vec<(ListenerId, Handler<T>)>,
}

impl<T: ?Sized> Default for Emitter<T> {
    fn default() -> Self {
        Emitter {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: ?Sized> Emitter<T> {
    pub fn add_listener(&mut self, handler: impl Fn(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Rc::new(handler)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Clones the current handlers out so the owner can release its borrow
    /// before dispatching.
    pub fn snapshot(&self) -> Vec<Handler<T>> {
        self.listeners
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect()
    }

    pub fn emit(&self, payload: &T) {
        dispatch(&self.snapshot(), payload);
    }
}

pub fn dispatch<T: ?Sized>(handlers: &[Handler<T>], payload: &T) {
    for handler in handlers {
        handler(payload);
    }
}
