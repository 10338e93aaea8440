//! Outbound notifications for the renderer.
//!
//! The engine pushes [`GameEvent`]s into a sink as each step happens. Sinks are
//! borrowed per call, so a renderer, a recorder, or nothing at all can listen.

use crate::types::GameEvent;

pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Collects every event in order
impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: GameEvent) {
        (**self).emit(event);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}
