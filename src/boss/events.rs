//! Events raised by body parts
//!
//! The tree never reaches for a global event manager; callers pass an
//! [`EventSink`] into the operations that can raise events.

use super::PartId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyPartEvent {
    /// A weakpoint took damage
    Hurt { part: PartId, life_remaining: f32 },
    /// A weakpoint ran out of life
    Destroyed(PartId),
    /// A part's colour animation ran to its end
    ColourAnimationFinished(PartId),
}

pub trait EventSink {
    fn emit(&mut self, event: BodyPartEvent);
}

/// Collects events for the caller to drain
impl EventSink for Vec<BodyPartEvent> {
    fn emit(&mut self, event: BodyPartEvent) {
        self.push(event);
    }
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: BodyPartEvent) {}
}
