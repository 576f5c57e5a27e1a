//! Contacts found during a physics step, handed to the scene afterwards

use legion::Entity;

use crate::components::Trigger;

/// The player touched an active trigger body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub trigger: Trigger,
    pub entity: Entity,
}

/// A queue for events of a single type.
/// Events are collected during the frame and drained by the scene.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Take every queued event, leaving the queue empty
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.events)
    }
}
