// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed publish/subscribe bus.
//!
//! Subscribers register for an [`EventKind`] and receive the matching
//! [`EditorEvent`] payloads.

use rustc_hash::FxHashMap;

use crate::keys::NodeKey;
use crate::mode::EditorMode;

/// Event discriminant used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ModeChanged,
    TextureRepeatChanged,
    ObjectPlaced,
    ObjectRemoved,
    RoomCreated,
    DoorPlaced,
    HistoryChanged,
    SceneReset,
    SceneLoaded,
}

/// Editor notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ModeChanged { from: EditorMode, to: EditorMode },
    TextureRepeatChanged { u: f64, v: f64 },
    ObjectPlaced(NodeKey),
    ObjectRemoved(NodeKey),
    RoomCreated(NodeKey),
    DoorPlaced { door: NodeKey, walls: Vec<NodeKey> },
    HistoryChanged { can_undo: bool, can_redo: bool },
    SceneReset,
    SceneLoaded { objects: usize },
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::ModeChanged { .. } => EventKind::ModeChanged,
            EditorEvent::TextureRepeatChanged { .. } => EventKind::TextureRepeatChanged,
            EditorEvent::ObjectPlaced(_) => EventKind::ObjectPlaced,
            EditorEvent::ObjectRemoved(_) => EventKind::ObjectRemoved,
            EditorEvent::RoomCreated(_) => EventKind::RoomCreated,
            EditorEvent::DoorPlaced { .. } => EventKind::DoorPlaced,
            EditorEvent::HistoryChanged { .. } => EventKind::HistoryChanged,
            EditorEvent::SceneReset => EventKind::SceneReset,
            EditorEvent::SceneLoaded { .. } => EventKind::SceneLoaded,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&EditorEvent)>;

#[derive(Default)]
pub struct EventBus {
    handlers: FxHashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.handlers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&EditorEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(kind).or_default().push((id, Box::new(handler)));
        id
    }

    /// Returns false when the subscription was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.handlers.values_mut() {
            let before = handlers.len();
            handlers.retain(|(h, _)| *h != id);
            if handlers.len() != before {
                return true;
            }
        }
        false
    }

    /// Deliver an event to its subscribers, in subscription order.
    pub fn publish(&mut self, event: &EditorEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn only_matching_kind_is_delivered() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::TextureRepeatChanged, move |e| sink.borrow_mut().push(e.clone()));

        bus.publish(&EditorEvent::SceneReset);
        bus.publish(&EditorEvent::TextureRepeatChanged { u: 2.0, v: 1.0 });

        assert_eq!(
            *seen.borrow(),
            vec![EditorEvent::TextureRepeatChanged { u: 2.0, v: 1.0 }]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = bus.subscribe(EventKind::SceneReset, move |_| *sink.borrow_mut() += 1);

        bus.publish(&EditorEvent::SceneReset);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&EditorEvent::SceneReset);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_keeps_other_handlers() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let first = Rc::clone(&count);
        let id = bus.subscribe(EventKind::SceneReset, move |_| *first.borrow_mut() += 1);
        let second = Rc::clone(&count);
        bus.subscribe(EventKind::SceneReset, move |_| *second.borrow_mut() += 10);

        assert!(bus.unsubscribe(id));
        bus.publish(&EditorEvent::SceneReset);
        assert_eq!(*count.borrow(), 10);
    }
}
