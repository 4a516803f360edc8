//! Event queue for host lifecycle events

/// Events emitted by the scene host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// An avatar finished loading
    Load { generation: u64, title: Option<String> },
    /// Bytes read while loading
    Progress { loaded: u64, total: Option<u64> },
    /// Loading failed
    Error(String),
    /// The avatar of `generation` was torn down
    Disposed { generation: u64 },
}

/// A simple event queue that the host pushes to and consumers drain
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event onto the bus
    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    /// Drain all events from the bus, returning them
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        bus.push(HostEvent::Progress {
            loaded: 10,
            total: Some(20),
        });
        bus.push(HostEvent::Load {
            generation: 1,
            title: None,
        });

        assert_eq!(bus.len(), 2);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_drain_clears() {
        let mut bus = EventBus::new();
        bus.push(HostEvent::Error("boom".into()));

        let _ = bus.drain();
        assert!(bus.drain().is_empty());
    }
}
