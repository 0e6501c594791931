//! Event Emitter
//!
//! Named-event listener lists owned by every component instance.

use std::collections::HashMap;
use std::fmt;

use crate::OptionValue;

/// Listener handle returned by `on`/`once`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Handler = Box<dyn FnMut(&OptionValue)>;

struct Listener {
    id: ListenerId,
    once: bool,
    handler: Handler,
}

/// Event emitter
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<String, Vec<Listener>>,
    next_id: u32,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener for `event`
    pub fn on(&mut self, event: &str, handler: impl FnMut(&OptionValue) + 'static) -> ListenerId {
        self.add(event, false, Box::new(handler))
    }

    /// Add a listener removed after its first call
    pub fn once(&mut self, event: &str, handler: impl FnMut(&OptionValue) + 'static) -> ListenerId {
        self.add(event, true, Box::new(handler))
    }

    fn add(&mut self, event: &str, once: bool, handler: Handler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(Listener { id, once, handler });
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn off(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(event);
        }
        removed
    }

    /// Call every listener of `event` in registration order.
    /// Returns the number of listeners invoked.
    pub fn emit(&mut self, event: &str, payload: &OptionValue) -> usize {
        let Some(list) = self.listeners.get_mut(event) else {
            return 0;
        };
        for listener in list.iter_mut() {
            (listener.handler)(payload);
        }
        let called = list.len();
        list.retain(|l| !l.once);
        if list.is_empty() {
            self.listeners.remove(event);
        }
        called
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("EventEmitter").field("listeners", &counts).finish()
    }
}
