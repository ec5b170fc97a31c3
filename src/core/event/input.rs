//=========================================================================
// Input Event Types
//
// Engine-neutral representation of keyboard and mouse input.
//
// Responsibilities:
// - Define the finite (device, key, action) domain used as a dispatch key
// - Provide dense indices so the dispatcher can address a flat table
// - Carry the per-event payload (mouse motion for cursor events)
//
// Design:
// Every enum here is fieldless and `#[repr(usize)]`, with `Unknown` at
// index 0. `COUNT` and `ALL` describe the whole domain, which keeps the
// dispatch table size a compile-time constant.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::DVec2;

//=== InputDevice =========================================================

/// Device that produced an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(usize)]
pub enum InputDevice {
    #[default]
    Unknown = 0,
    Keyboard,
    Mouse,
}

impl InputDevice {
    /// Number of devices, including `Unknown`.
    pub const COUNT: usize = 3;

    /// Every device in index order.
    pub const ALL: [InputDevice; Self::COUNT] =
        [InputDevice::Unknown, InputDevice::Keyboard, InputDevice::Mouse];

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }
}

//=== Key =================================================================

/// Keyboard key or mouse button identifier.
///
/// Mouse buttons share this enum with keyboard keys so that a single
/// `(device, key, action)` triple addresses any input. `Mouse` is the
/// pseudo-key used by cursor motion events.
///
/// Codes the platform layer does not map become `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(usize)]
pub enum Key {
    #[default]
    Unknown = 0,

    //--- Mouse ------------------------------------------------------------
    MouseLeft,
    MouseRight,
    MouseMiddle,
    Mouse,

    //--- Alphabetic keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Numeric keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Arrow keys -------------------------------------------------------
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    //--- Special keys -----------------------------------------------------
    Space,
    Enter,
    Escape,
    Tab,
}

impl Key {
    /// Number of keys, including `Unknown`.
    pub const COUNT: usize = 49;

    /// Every key in index order.
    pub const ALL: [Key; Self::COUNT] = {
        use Key::*;
        [
            Unknown,
            MouseLeft, MouseRight, MouseMiddle, Mouse,
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
            KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
            KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            Digit0, Digit1, Digit2, Digit3, Digit4,
            Digit5, Digit6, Digit7, Digit8, Digit9,
            ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
            Space, Enter, Escape, Tab,
        ]
    };

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for the mouse button keys and the motion pseudo-key.
    pub fn is_mouse(self) -> bool {
        matches!(self, Key::MouseLeft | Key::MouseRight | Key::MouseMiddle | Key::Mouse)
    }
}

//=== KeyAction ===========================================================

/// What happened to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(usize)]
pub enum KeyAction {
    #[default]
    Unknown = 0,
    Pressed,
    Released,
    Moved,
}

impl KeyAction {
    /// Number of actions, including `Unknown`.
    pub const COUNT: usize = 4;

    /// Every action in index order.
    pub const ALL: [KeyAction; Self::COUNT] = [
        KeyAction::Unknown,
        KeyAction::Pressed,
        KeyAction::Released,
        KeyAction::Moved,
    ];

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }
}

//=== InputEventType ======================================================

/// The `(device, key, action)` triple used as a dispatch key.
///
/// The domain is finite: `InputEventType::COUNT` distinct values exist,
/// each with a unique [`InputEventType::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputEventType {
    pub device: InputDevice,
    pub key: Key,
    pub action: KeyAction,
}

impl InputEventType {
    /// Size of the whole `(device, key, action)` domain.
    pub const COUNT: usize = InputDevice::COUNT * Key::COUNT * KeyAction::COUNT;

    pub const fn new(device: InputDevice, key: Key, action: KeyAction) -> Self {
        Self { device, key, action }
    }

    /// Keyboard event type shorthand.
    pub const fn keyboard(key: Key, action: KeyAction) -> Self {
        Self::new(InputDevice::Keyboard, key, action)
    }

    /// Mouse event type shorthand.
    pub const fn mouse(key: Key, action: KeyAction) -> Self {
        Self::new(InputDevice::Mouse, key, action)
    }

    /// The cursor motion event type, `(Mouse, Mouse, Moved)`.
    pub const fn mouse_moved() -> Self {
        Self::new(InputDevice::Mouse, Key::Mouse, KeyAction::Moved)
    }

    /// Row-major index into a `[device][key][action]` table.
    pub const fn index(self) -> usize {
        (self.device.index() * Key::COUNT + self.key.index()) * KeyAction::COUNT
            + self.action.index()
    }

    /// Iterates over every triple of the domain.
    pub fn all() -> impl Iterator<Item = InputEventType> {
        InputDevice::ALL.into_iter().flat_map(|device| {
            Key::ALL.into_iter().flat_map(move |key| {
                KeyAction::ALL
                    .into_iter()
                    .map(move |action| InputEventType::new(device, key, action))
            })
        })
    }
}

//=== Event Payload =======================================================

/// Cursor motion payload.
///
/// Both positions are absolute, in window pixels with a top-left origin.
/// `previous` is the position reported by the preceding motion event; the
/// first motion after the input layer binds reports `previous == current`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseMotion {
    pub previous: DVec2,
    pub current: DVec2,
}

impl MouseMotion {
    /// Cursor displacement since the previous motion event.
    pub fn delta(&self) -> DVec2 {
        self.current - self.previous
    }
}

/// Payload attached to an input event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputEventContext {
    /// Key and button events carry no payload.
    #[default]
    Keyboard,

    /// Cursor motion.
    Mouse(MouseMotion),
}

//=== InputEvent ==========================================================

/// A typed input event: its dispatch key plus payload.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputEvent {
    pub event_type: InputEventType,
    pub context: InputEventContext,
}

impl InputEvent {
    /// Builds a key or button event with an empty payload.
    pub fn key(device: InputDevice, key: Key, action: KeyAction) -> Self {
        Self {
            event_type: InputEventType::new(device, key, action),
            context: InputEventContext::Keyboard,
        }
    }

    /// Builds a cursor motion event.
    pub fn mouse_moved(motion: MouseMotion) -> Self {
        Self {
            event_type: InputEventType::mouse_moved(),
            context: InputEventContext::Mouse(motion),
        }
    }

    /// Returns the motion payload, if any.
    pub fn motion(&self) -> Option<MouseMotion> {
        match self.context {
            InputEventContext::Mouse(motion) => Some(motion),
            InputEventContext::Keyboard => None,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
