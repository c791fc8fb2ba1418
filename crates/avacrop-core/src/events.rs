//! Typed publish/subscribe for viewport notifications.

use std::fmt;

/// Notifications a viewport emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    /// An image was set.
    Load,
    /// The session was reset.
    Clear,
    /// Rendering settled: no render for the settle delay.
    Change,
}

impl ViewportEvent {
    pub const ALL: [ViewportEvent; 3] = [
        ViewportEvent::Load,
        ViewportEvent::Clear,
        ViewportEvent::Change,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewportEvent::Load => "load",
            ViewportEvent::Clear => "clear",
            ViewportEvent::Change => "change",
        }
    }

    /// Parse the lowercase event name used by JS hosts.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ev| ev.as_str() == name)
    }

    fn slot(self) -> usize {
        match self {
            ViewportEvent::Load => 0,
            ViewportEvent::Clear => 1,
            ViewportEvent::Change => 2,
        }
    }
}

impl fmt::Display for ViewportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscriber. `C` is the emitter, passed read-only.
pub type Handler<C> = Box<dyn FnMut(&C)>;

/// One handler list per event kind.
pub struct EventTable<C> {
    lists: [Vec<Handler<C>>; 3],
}

impl<C> Default for EventTable<C> {
    fn default() -> Self {
        Self {
            lists: [Vec::new(), Vec::new(), Vec::new()],
        }
    }
}

impl<C> EventTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event: ViewportEvent, handler: Handler<C>) {
        self.lists[event.slot()].push(handler);
    }

    pub fn count(&self, event: ViewportEvent) -> usize {
        self.lists[event.slot()].len()
    }

    /// Move the handlers out so they can run while the emitter is borrowed.
    pub fn take(&mut self, event: ViewportEvent) -> Vec<Handler<C>> {
        std::mem::take(&mut self.lists[event.slot()])
    }

    /// Put handlers back after [`take`](Self::take), ahead of any added meanwhile.
    pub fn restore(&mut self, event: ViewportEvent, mut handlers: Vec<Handler<C>>) {
        let list = &mut self.lists[event.slot()];
        handlers.append(list);
        *list = handlers;
    }
}

impl<C> fmt::Debug for EventTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTable")
            .field("load", &self.count(ViewportEvent::Load))
            .field("clear", &self.count(ViewportEvent::Clear))
            .field("change", &self.count(ViewportEvent::Change))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fire<C>(table: &mut EventTable<C>, event: ViewportEvent, emitter: &C) {
        let mut handlers = table.take(event);
        for handler in handlers.iter_mut() {
            handler(emitter);
        }
        table.restore(event, handlers);
    }

    #[test]
    fn test_names_round_trip() {
        for ev in ViewportEvent::ALL {
            assert_eq!(ViewportEvent::from_name(ev.as_str()), Some(ev));
        }
        assert_eq!(ViewportEvent::from_name("resize"), None);
        assert_eq!(ViewportEvent::Change.to_string(), "change");
    }

    #[test]
    fn test_emit_only_matching_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut table: EventTable<u32> = EventTable::new();

        let log = Rc::clone(&seen);
        table.subscribe(ViewportEvent::Load, Box::new(move |v| log.borrow_mut().push(*v)));

        fire(&mut table, ViewportEvent::Load, &7);
        fire(&mut table, ViewportEvent::Change, &8);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut table: EventTable<()> = EventTable::new();
        for i in 0..3 {
            let log = Rc::clone(&seen);
            table.subscribe(ViewportEvent::Clear, Box::new(move |_| log.borrow_mut().push(i)));
        }
        fire(&mut table, ViewportEvent::Clear, &());
        fire(&mut table, ViewportEvent::Clear, &());
        assert_eq!(*seen.borrow(), vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_take_and_restore_keeps_order() {
        let mut table: EventTable<()> = EventTable::new();
        table.subscribe(ViewportEvent::Change, Box::new(|_| {}));
        let taken = table.take(ViewportEvent::Change);
        assert_eq!(table.count(ViewportEvent::Change), 0);

        table.subscribe(ViewportEvent::Change, Box::new(|_| {}));
        table.restore(ViewportEvent::Change, taken);
        assert_eq!(table.count(ViewportEvent::Change), 2);
    }
}
