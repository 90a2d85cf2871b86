//! Event sink that records everything it is given.

use stakepoll_types::{Address, EventSink, PollEvent};
use std::cell::RefCell;

#[derive(Default)]
pub struct RecordingEventSink {
    events: RefCell<Vec<(PollEvent, Vec<Address>)>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events with their involved addresses, oldest first.
    pub fn events(&self) -> Vec<(PollEvent, Vec<Address>)> {
        self.events.borrow().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|(e, _)| e.name()).collect()
    }

    pub fn last(&self) -> Option<PollEvent> {
        self.events.borrow().last().map(|(e, _)| e.clone())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &PollEvent, involved: &[Address]) {
        self.events
            .borrow_mut()
            .push((event.clone(), involved.to_vec()));
    }
}
