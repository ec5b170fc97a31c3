//=========================================================================
// Event System
//=========================================================================
//
// Tagged unions over event categories plus the dispatcher that routes
// them to handlers.
//
// Architecture:
//   Event::Input(InputEvent) ──raise()──> EventDispatcher
//                                             │ match category
//                                             ↓
//                              input table [device][key][action]
//                                             ↓
//                                      handler(&Event)
//
// Only input events exist today. A new category is a new variant in both
// `Event` and `EventType` plus a table (or arm) in the dispatcher; call
// sites that raise input events do not change.
//
//=========================================================================

//=== Module Declarations =================================================

mod dispatcher;
pub mod input;

//=== Public API ==========================================================

pub use dispatcher::{EventDispatcher, EventHandler};
pub use input::{
    InputDevice, InputEvent, InputEventContext, InputEventType, Key, KeyAction, MouseMotion,
};

//=== Event ===============================================================

/// An event of any category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Input(InputEvent),
}

impl Event {
    /// The dispatch key of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            Event::Input(event) => EventType::Input(event.event_type),
        }
    }

    /// Returns the input payload when this is an input event.
    pub fn as_input(&self) -> Option<&InputEvent> {
        match self {
            Event::Input(event) => Some(event),
        }
    }
}

impl From<InputEvent> for Event {
    fn from(event: InputEvent) -> Self {
        Event::Input(event)
    }
}

//=== EventType ===========================================================

/// Dispatch key of any event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Input(InputEventType),
}

impl From<InputEventType> for EventType {
    fn from(event_type: InputEventType) -> Self {
        EventType::Input(event_type)
    }
}
