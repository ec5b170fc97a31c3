//=========================================================================
// Platform Subsystem
//
// Window abstraction and raw input plumbing between the OS and the
// engine's event dispatcher.
//
// Architecture:
// ```text
//  OS / test harness                       Engine thread
//  ┌──────────────────────┐               ┌──────────────────────────┐
//  │ winit event loop     │               │ Window::poll_events()    │
//  │  or injector Sender  │──RawWindow──> │   ↓ drain channel        │
//  └──────────────────────┘    Event      │ raw callbacks (FnMut)    │
//                                         │   ↓ InputTranslator      │
//                                         │ EventDispatcher::raise() │
//                                         └──────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Raw callbacks, not typed events**: windows hand out raw winit codes;
//   translation to engine types lives in one place (`InputTranslator`)
// - **Channel feed**: both window kinds push `RawWindowEvent`s into a
//   crossbeam channel and fire callbacks only from `poll_events`, so user
//   handlers never run while winit holds the event loop
// - **Pump, not run**: the desktop window pumps winit with a zero timeout
//   so the engine keeps ownership of its frame loop
//
// Responsibilities:
// - Define the `Window` seam used by the engine
// - Provide the desktop (`WinitWindow`) and headless (`HeadlessWindow`)
//   implementations
// - Translate raw input into typed engine events
//
//=========================================================================

//=== Submodules ==========================================================

mod headless;
mod input_translator;
mod winit_window;

//=== Public API ==========================================================

pub use headless::HeadlessWindow;
pub use input_translator::{translate_action, translate_key, translate_mouse_button, InputTranslator};
pub use winit_window::WinitWindow;

//=== External Crates =====================================================

use log::trace;
use winit::{
    event::{ElementState, MouseButton},
    keyboard::PhysicalKey,
};

//=== Raw Callbacks =======================================================

/// Raw keyboard callback: physical key, press state, auto-repeat flag.
pub type KeyboardKeyCallback = Box<dyn FnMut(PhysicalKey, ElementState, bool)>;

/// Raw mouse button callback.
pub type MouseKeyCallback = Box<dyn FnMut(MouseButton, ElementState)>;

/// Raw cursor callback: absolute position in window pixels, top-left
/// origin.
pub type CursorPositionCallback = Box<dyn FnMut(f64, f64)>;

//=== RawWindowEvent ======================================================

/// Untranslated window input, as produced by the OS or a test injector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawWindowEvent {
    Key {
        key: PhysicalKey,
        state: ElementState,
        repeat: bool,
    },
    MouseButton {
        button: MouseButton,
        state: ElementState,
    },
    CursorMoved {
        x: f64,
        y: f64,
    },
    /// The framebuffer changed size.
    Resized {
        width: u32,
        height: u32,
    },
    /// The user asked to close the window.
    CloseRequested,
}

//=== WindowConfig ========================================================

/// Desktop window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kinetic Engine".to_string(),
            width: 640,
            height: 480,
        }
    }
}

//=== Window Trait ========================================================

/// Window seam used by the engine.
///
/// The engine drives a window through one frame as:
/// `prepare_frame` → (meshes draw) → `swap_buffers` → `poll_events`.
/// Raw callbacks fire only from inside `poll_events`.
pub trait Window {
    /// `true` once the user or the engine requested close.
    fn should_close(&self) -> bool;

    fn request_close(&mut self);

    /// Framebuffer size in pixels.
    fn window_size(&self) -> (u32, u32);

    /// Last known cursor position in window pixels.
    fn cursor_position(&self) -> (f64, f64);

    /// Makes the window's drawing context current on this thread.
    fn bind_current_context(&mut self);

    /// `true` once `bind_current_context` has run.
    fn is_context_bound(&self) -> bool;

    /// Sets the viewport and clears the frame.
    fn prepare_frame(&mut self, width: u32, height: u32);

    /// Presents the frame.
    fn swap_buffers(&mut self);

    /// Processes pending OS events, firing registered raw callbacks.
    fn poll_events(&mut self);

    /// Hides and captures the cursor.
    fn grab_cursor(&mut self);

    /// Releases and shows the cursor.
    fn ungrab_cursor(&mut self);

    fn is_cursor_grabbed(&self) -> bool;

    //--- Raw callback slots -----------------------------------------------
    //
    // One callback per slot. Registering replaces; `None` clears.
    //

    fn register_keyboard_key_callback(&mut self, callback: Option<KeyboardKeyCallback>);
    fn register_mouse_key_callback(&mut self, callback: Option<MouseKeyCallback>);
    fn register_cursor_position_callback(&mut self, callback: Option<CursorPositionCallback>);
}

//=== RawCallbacks ========================================================

/// The three raw callback slots shared by both window implementations.
#[derive(Default)]
pub(crate) struct RawCallbacks {
    pub(crate) keyboard: Option<KeyboardKeyCallback>,
    pub(crate) mouse: Option<MouseKeyCallback>,
    pub(crate) cursor: Option<CursorPositionCallback>,
}

impl RawCallbacks {
    /// Routes one raw event to its slot. Empty slots drop the event.
    ///
    /// `Resized` and `CloseRequested` have no slot; windows handle them
    /// themselves.
    pub(crate) fn fire(&mut self, event: RawWindowEvent) {
        match event {
            RawWindowEvent::Key { key, state, repeat } => {
                if let Some(callback) = self.keyboard.as_mut() {
                    callback(key, state, repeat);
                }
            }
            RawWindowEvent::MouseButton { button, state } => {
                if let Some(callback) = self.mouse.as_mut() {
                    callback(button, state);
                }
            }
            RawWindowEvent::CursorMoved { x, y } => {
                if let Some(callback) = self.cursor.as_mut() {
                    callback(x, y);
                }
            }
            RawWindowEvent::Resized { .. } | RawWindowEvent::CloseRequested => {
                trace!(target: "platform", "{:?} has no raw callback slot", event);
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keyboard.is_none() && self.mouse.is_none() && self.cursor.is_none()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
