//=========================================================================
// Event Dispatcher
//=========================================================================
//
// Routes events to at most one handler per exact event type.
//
// Architecture:
//   InputEventType::index() → flat slot table → Option<EventHandler>
//
// The table is allocated once with one slot per (device, key, action)
// triple; lookup is a bounds-checked array index. Registration and
// dispatch take `&self` so handlers can re-enter the dispatcher while an
// event is in flight.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::{Event, EventType, InputEventType};

//=== EventHandler ========================================================

/// Callback invoked for a raised event.
///
/// Handlers are shared (`Rc`) so the dispatcher can keep the one being
/// invoked alive even if it is replaced mid-call. State captured by a
/// handler is mutated through `Cell`/`RefCell`.
pub type EventHandler = Rc<dyn Fn(&Event)>;

//=== EventDispatcher =====================================================

/// Single-threaded, direct-addressed event dispatcher.
///
/// # Semantics
///
/// - One handler per exact event type; registering again overwrites.
/// - Registering `None` clears the slot.
/// - Raising an event whose slot is empty does nothing.
/// - A handler may register or clear any slot, including its own. The
///   in-flight call keeps running with the handler it started with; the
///   change is visible from the next [`EventDispatcher::raise`].
pub struct EventDispatcher {
    input_handlers: RefCell<Box<[Option<EventHandler>]>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with every slot empty.
    pub fn new() -> Self {
        let slots: Vec<Option<EventHandler>> = vec![None; InputEventType::COUNT];
        Self {
            input_handlers: RefCell::new(slots.into_boxed_slice()),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Stores `handler` in the slot addressed by `event_type`.
    ///
    /// Overwrites any previous handler for that exact type. Passing `None`
    /// unregisters.
    pub fn register(&self, event_type: impl Into<EventType>, handler: Option<EventHandler>) {
        match event_type.into() {
            EventType::Input(input_type) => {
                trace!(
                    target: "engine::events",
                    "{} handler for {:?}",
                    if handler.is_some() { "Registering" } else { "Clearing" },
                    input_type
                );
                self.input_handlers.borrow_mut()[input_type.index()] = handler;
            }
        }
    }

    /// Clears the slot addressed by `event_type`.
    pub fn unregister(&self, event_type: impl Into<EventType>) {
        self.register(event_type, None);
    }

    /// Returns `true` if a handler occupies the slot for `event_type`.
    pub fn is_registered(&self, event_type: impl Into<EventType>) -> bool {
        match event_type.into() {
            EventType::Input(input_type) => {
                self.input_handlers.borrow()[input_type.index()].is_some()
            }
        }
    }

    //--- Dispatch ---------------------------------------------------------

    /// Invokes the handler registered for the event's type, if any.
    pub fn raise(&self, event: impl Into<Event>) {
        let event = event.into();

        // Clone the handler out so the table borrow ends before the call.
        let handler = match &event {
            Event::Input(input) => self.input_handlers.borrow()[input.event_type.index()].clone(),
        };

        if let Some(handler) = handler {
            handler(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self
            .input_handlers
            .borrow()
            .iter()
            .filter(|slot| slot.is_some())
            .count();

        f.debug_struct("EventDispatcher")
            .field("input_slots", &InputEventType::COUNT)
            .field("occupied", &occupied)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
