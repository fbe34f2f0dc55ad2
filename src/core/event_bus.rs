//! Synchroner Event-Bus mit Prioritäten.
//!
//! Listener werden in absteigender Priorität aufgerufen, bei gleicher
//! Priorität in Registrierungs-Reihenfolge. Ein Listener kann die weitere
//! Verteilung mit `Handled::Stop` beenden.

use super::element::ElementId;
use super::graphics::Graphics;
use crate::command::Trigger;
use crate::copy_paste::CopyTree;
use glam::Vec2;

/// Standard-Priorität für Listener.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// Rückgabe eines Listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Weitere Listener aufrufen
    Continue,
    /// Verteilung abbrechen
    Stop,
}

/// Nutzdaten eines Events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Empty,
    /// Einzelnes Element (z.B. shape.added, root.set)
    Element {
        id: ElementId,
        graphics: Option<Graphics>,
    },
    /// Mehrere Elemente (elements.changed)
    Elements { ids: Vec<ElementId> },
    /// Abschluss einer Command-Stack-Operation
    CommandStack { trigger: Trigger },
    /// Kopier-Baum (elements.copy / elements.copied)
    Copy { tree: CopyTree },
    /// Abgelehntes Einfügen
    PasteRejected {
        tree: CopyTree,
        target: ElementId,
        position: Vec2,
    },
}

/// Ein verteiltes Event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub payload: EventPayload,
}

/// Handle zum Abmelden eines Listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&Event) -> Handled>;

struct Listener {
    id: ListenerId,
    event: String,
    priority: i32,
    callback: Callback,
}

/// Event-Bus des Canvas.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    /// Erstellt einen leeren Event-Bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert einen Listener für `event` mit gegebener Priorität.
    pub fn on<F>(&mut self, event: &str, priority: i32, callback: F) -> ListenerId
    where
        F: FnMut(&Event) -> Handled + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);

        // Hinter allen Listenern mit gleicher oder höherer Priorität einfügen
        let index = self
            .listeners
            .iter()
            .position(|listener| listener.priority < priority)
            .unwrap_or(self.listeners.len());

        self.listeners.insert(
            index,
            Listener {
                id,
                event: event.to_owned(),
                priority,
                callback: Box::new(callback),
            },
        );
        id
    }

    /// Meldet einen Listener ab. Gibt `true` zurück, wenn er existierte.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        before != self.listeners.len()
    }

    /// Verteilt ein Event. Gibt `Handled::Stop` zurück, wenn ein Listener abgebrochen hat.
    pub fn fire(&mut self, name: &str, payload: EventPayload) -> Handled {
        let event = Event {
            name: name.to_owned(),
            payload,
        };

        for listener in self.listeners.iter_mut().filter(|l| l.event == name) {
            if (listener.callback)(&event) == Handled::Stop {
                log::debug!("Event '{}' von Listener gestoppt", name);
                return Handled::Stop;
            }
        }
        Handled::Continue
    }

    /// Anzahl registrierter Listener für ein Event.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.iter().filter(|l| l.event == name).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_run_by_priority_then_registration() {
        let mut bus = EventBus::new();
        let calls = Rc::new(RefCell::new(Vec::new()));

        for (tag, priority) in [("low", 500), ("default-1", 1000), ("high", 1500), ("default-2", 1000)] {
            let calls = Rc::clone(&calls);
            bus.on("foo", priority, move |_| {
                calls.borrow_mut().push(tag);
                Handled::Continue
            });
        }

        bus.fire("foo", EventPayload::Empty);
        assert_eq!(
            *calls.borrow(),
            vec!["high", "default-1", "default-2", "low"]
        );
    }

    #[test]
    fn stop_prevents_lower_priority_listeners() {
        let mut bus = EventBus::new();
        let calls = Rc::new(RefCell::new(0));

        bus.on("foo", 2000, |_| Handled::Stop);
        let counter = Rc::clone(&calls);
        bus.on("foo", DEFAULT_PRIORITY, move |_| {
            *counter.borrow_mut() += 1;
            Handled::Continue
        });

        assert_eq!(bus.fire("foo", EventPayload::Empty), Handled::Stop);
        assert_eq!(*calls.borrow(), 0);
        // anderes Event ist nicht betroffen
        assert_eq!(bus.fire("bar", EventPayload::Empty), Handled::Continue);
    }

    #[test]
    fn off_removes_listener() {
        let mut bus = EventBus::new();
        let id = bus.on("foo", DEFAULT_PRIORITY, |_| Handled::Continue);
        assert_eq!(bus.listener_count("foo"), 1);
        assert!(bus.off(id));
        assert!(!bus.off(id));
        assert_eq!(bus.listener_count("foo"), 0);
    }
}
