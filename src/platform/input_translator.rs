//=========================================================================
// Input Translator
//=========================================================================
//
// Converts raw winit key, button and cursor callbacks into typed
// `InputEvent`s and raises them on the event dispatcher.
//
// Architecture:
//   Window raw callback → translate_* → InputEvent → EventDispatcher::raise
//
// Every raw event produces exactly one typed event. Codes without a
// mapping become `Key::Unknown` and are still raised, so a game can bind
// the unknown slot if it wants a catch-all.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use glam::DVec2;
use log::{error, info, trace};
use winit::{
    event::{ElementState, MouseButton as WinitMouseButton},
    keyboard::{KeyCode as WinitKeyCode, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use super::Window;
use crate::core::event::{EventDispatcher, InputDevice, InputEvent, Key, KeyAction, MouseMotion};
use crate::error::EngineError;

//=== InputTranslator =====================================================

/// Binds a window's raw callback slots to an event dispatcher.
#[derive(Debug, Default)]
pub struct InputTranslator {
    bound: bool,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the three raw callbacks on `window`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Precondition`] if already bound.
    pub fn init(
        &mut self,
        window: &mut dyn Window,
        dispatcher: &Rc<EventDispatcher>,
    ) -> Result<(), EngineError> {
        if self.bound {
            error!(target: "platform::input", "Input translator initialized twice");
            return Err(EngineError::Precondition("input translator is already bound"));
        }

        //--- Keyboard -----------------------------------------------------
        let keyboard_dispatcher = Rc::clone(dispatcher);
        window.register_keyboard_key_callback(Some(Box::new(move |key, state, repeat| {
            let translated = translate_key(key);
            if translated == Key::Unknown {
                trace!(target: "platform::input", "Unmapped key {:?}", key);
            }
            keyboard_dispatcher.raise(InputEvent::key(
                InputDevice::Keyboard,
                translated,
                translate_action(state, repeat),
            ));
        })));

        //--- Mouse buttons ------------------------------------------------
        let mouse_dispatcher = Rc::clone(dispatcher);
        window.register_mouse_key_callback(Some(Box::new(move |button, state| {
            mouse_dispatcher.raise(InputEvent::key(
                InputDevice::Mouse,
                translate_mouse_button(button),
                translate_action(state, false),
            ));
        })));

        //--- Cursor motion ------------------------------------------------
        let cursor_dispatcher = Rc::clone(dispatcher);
        let mut last_position: Option<DVec2> = None;
        window.register_cursor_position_callback(Some(Box::new(move |x, y| {
            let current = DVec2::new(x, y);
            let previous = last_position.replace(current).unwrap_or(current);
            cursor_dispatcher.raise(InputEvent::mouse_moved(MouseMotion { previous, current }));
        })));

        self.bound = true;
        info!(target: "platform::input", "Input translator bound");
        Ok(())
    }

    /// Clears the three raw callbacks on `window`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Precondition`] if not bound.
    pub fn deinit(&mut self, window: &mut dyn Window) -> Result<(), EngineError> {
        if !self.bound {
            error!(target: "platform::input", "Input translator deinitialized while unbound");
            return Err(EngineError::Precondition("input translator is not bound"));
        }

        window.register_keyboard_key_callback(None);
        window.register_mouse_key_callback(None);
        window.register_cursor_position_callback(None);

        self.bound = false;
        info!(target: "platform::input", "Input translator unbound");
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

//=========================================================================
// Translation
//=========================================================================

/// Maps a physical key to an engine key. Unmapped codes become
/// [`Key::Unknown`].
pub fn translate_key(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(code) => Key::from(code),
        PhysicalKey::Unidentified(_) => Key::Unknown,
    }
}

/// Maps a mouse button. Only left, right and middle are known.
pub fn translate_mouse_button(button: WinitMouseButton) -> Key {
    match button {
        WinitMouseButton::Left => Key::MouseLeft,
        WinitMouseButton::Right => Key::MouseRight,
        WinitMouseButton::Middle => Key::MouseMiddle,
        _ => Key::Unknown,
    }
}

/// Maps a press state. Auto-repeat is neither a press nor a release and
/// becomes [`KeyAction::Unknown`].
pub fn translate_action(state: ElementState, repeat: bool) -> KeyAction {
    if repeat {
        return KeyAction::Unknown;
    }

    match state {
        ElementState::Pressed => KeyAction::Pressed,
        ElementState::Released => KeyAction::Released,
    }
}

/// Maps A-Z, 0-9, arrows and a few special keys.
impl From<WinitKeyCode> for Key {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Alphabetic keys --------------------------------------------------
            KeyA => Key::KeyA, KeyB => Key::KeyB, KeyC => Key::KeyC,
            KeyD => Key::KeyD, KeyE => Key::KeyE, KeyF => Key::KeyF,
            KeyG => Key::KeyG, KeyH => Key::KeyH, KeyI => Key::KeyI,
            KeyJ => Key::KeyJ, KeyK => Key::KeyK, KeyL => Key::KeyL,
            KeyM => Key::KeyM, KeyN => Key::KeyN, KeyO => Key::KeyO,
            KeyP => Key::KeyP, KeyQ => Key::KeyQ, KeyR => Key::KeyR,
            KeyS => Key::KeyS, KeyT => Key::KeyT, KeyU => Key::KeyU,
            KeyV => Key::KeyV, KeyW => Key::KeyW, KeyX => Key::KeyX,
            KeyY => Key::KeyY, KeyZ => Key::KeyZ,

            //--- Numeric keys -----------------------------------------------------
            Digit0 => Key::Digit0, Digit1 => Key::Digit1,
            Digit2 => Key::Digit2, Digit3 => Key::Digit3,
            Digit4 => Key::Digit4, Digit5 => Key::Digit5,
            Digit6 => Key::Digit6, Digit7 => Key::Digit7,
            Digit8 => Key::Digit8, Digit9 => Key::Digit9,

            //--- Arrow keys -------------------------------------------------------
            ArrowUp => Key::ArrowUp, ArrowDown => Key::ArrowDown,
            ArrowLeft => Key::ArrowLeft, ArrowRight => Key::ArrowRight,

            //--- Special keys -----------------------------------------------------
            Space => Key::Space,
            Enter => Key::Enter,
            Escape => Key::Escape,
            Tab => Key::Tab,

            //--- Fallback ---------------------------------------------------------
            _ => Key::Unknown,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
