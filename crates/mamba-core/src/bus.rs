use std::collections::VecDeque;

use crate::event::Event;

/// FIFO queue between input/lifecycle producers and the frame loop.
///
/// Each frame the app publishes key-driven and lifecycle events, drains the
/// queue once and dispatches everything it got, in order.
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Enqueue a batch, e.g. the lifecycle events returned by a registry call.
    pub fn publish_all(&mut self, events: impl IntoIterator<Item = Event>) {
        self.queue.extend(events);
    }

    /// Remove and return all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        self.queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::LifecycleWarning;

    #[test]
    fn drain_empties_queue() {
        let mut bus = EventBus::new();
        assert!(bus.drain().is_empty());
        bus.publish(Event::ToggleHud);
        bus.publish(Event::Quit);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn publish_all_preserves_order() {
        let mut bus = EventBus::new();
        bus.publish(Event::ToggleDayNight);
        bus.publish_all(vec![
            Event::ModuleUnloaded { id: "a".into() },
            Event::ModuleLoaded { id: "b".into(), name: "Beta".into() },
            Event::ModuleWarning(LifecycleWarning::InvalidModule),
        ]);
        let events = bus.drain();
        assert!(matches!(&events[0], Event::ToggleDayNight));
        assert!(matches!(&events[1], Event::ModuleUnloaded { id } if id == "a"));
        assert!(matches!(&events[2], Event::ModuleLoaded { id, .. } if id == "b"));
        assert!(matches!(&events[3], Event::ModuleWarning(LifecycleWarning::InvalidModule)));
    }
}
