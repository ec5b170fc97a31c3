//=========================================================================
// Winit Window
//=========================================================================
//
// Desktop `Window` backed by winit's pump-events API.
//
// Architecture:
// ```text
//  poll_events()
//    ├─ EventLoop::pump_app_events(Duration::ZERO, &mut WinitState)
//    │     └─ ApplicationHandler::window_event → Sender<RawWindowEvent>
//    └─ Receiver::try_recv() → RawCallbacks::fire()
// ```
//
// The engine owns the frame loop, so winit is pumped once per frame with
// a zero timeout instead of `run_app`. The window is created lazily in
// `resumed()` (mobile compatibility); construction pumps until it exists.
//
// Rendering is a seam: meshes own their GPU resources, so the context,
// viewport and clear hooks only notify winit of the present.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    error::OsError,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{CursorGrabMode, Window as OsWindow, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use super::{
    CursorPositionCallback, KeyboardKeyCallback, MouseKeyCallback, RawCallbacks, RawWindowEvent,
    Window, WindowConfig,
};
use crate::error::PlatformError;

//=== Constants ===========================================================

/// Pump iterations allowed for the event loop to deliver `resumed()`.
const WINDOW_CREATION_PUMPS: usize = 64;

//=== WinitState ==========================================================

/// Event loop side of the window: receives winit callbacks.
struct WinitState {
    attributes: WindowAttributes,
    window: Option<OsWindow>,
    creation_error: Option<OsError>,
    close_requested: bool,
    cursor: (f64, f64),
    sender: Sender<RawWindowEvent>,
}

impl WinitState {
    fn forward(&self, event: RawWindowEvent) {
        if self.sender.send(event).is_err() {
            warn!(target: "platform::input", "Raw event channel closed, dropping {:?}", event);
        }
    }
}

impl ApplicationHandler for WinitState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (resume)");
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.creation_error = Some(e);
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.close_requested = true;
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                self.forward(RawWindowEvent::Key {
                    key: key_event.physical_key,
                    state: key_event.state,
                    repeat: key_event.repeat,
                });
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.forward(RawWindowEvent::MouseButton { button, state });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                self.forward(RawWindowEvent::CursorMoved {
                    x: position.x,
                    y: position.y,
                });
            }

            _ => {
                // Size is read back through inner_size(); Focused and
                // RedrawRequested are not needed here
            }
        }
    }
}

//=== WinitWindow =========================================================

/// Desktop window driven by `pump_app_events`.
///
/// Must be created and used on the main thread.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    state: WinitState,
    receiver: Receiver<RawWindowEvent>,
    callbacks: RawCallbacks,
    context_bound: bool,
    cursor_grabbed: bool,
}

impl WinitWindow {
    /// Creates the event loop and the OS window.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::EventLoopCreation`] if winit cannot create an
    ///   event loop (including a second loop in the same process)
    /// - [`PlatformError::WindowCreation`] if the OS refuses the window
    /// - [`PlatformError::WindowUnavailable`] if the loop never resumes
    pub fn new(config: &WindowConfig) -> Result<Self, PlatformError> {
        debug!(target: "platform", "Creating winit event loop");
        let mut event_loop = EventLoop::new()?;

        let attributes = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let (sender, receiver) = unbounded();
        let mut state = WinitState {
            attributes,
            window: None,
            creation_error: None,
            close_requested: false,
            cursor: (0.0, 0.0),
            sender,
        };

        for _ in 0..WINDOW_CREATION_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut state);
            if state.window.is_some() || state.creation_error.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                debug!(target: "platform", "Event loop exited during startup ({})", code);
                break;
            }
        }

        if let Some(e) = state.creation_error.take() {
            return Err(PlatformError::WindowCreation(e));
        }
        if state.window.is_none() {
            return Err(PlatformError::WindowUnavailable);
        }

        Ok(Self {
            event_loop,
            state,
            receiver,
            callbacks: RawCallbacks::default(),
            context_bound: false,
            cursor_grabbed: false,
        })
    }

    fn os_window(&self) -> Option<&OsWindow> {
        self.state.window.as_ref()
    }
}

//=== Window Implementation ===============================================

impl Window for WinitWindow {
    fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn request_close(&mut self) {
        self.state.close_requested = true;
    }

    fn window_size(&self) -> (u32, u32) {
        self.os_window()
            .map(|window| {
                let size = window.inner_size();
                (size.width, size.height)
            })
            .unwrap_or((0, 0))
    }

    fn cursor_position(&self) -> (f64, f64) {
        self.state.cursor
    }

    fn bind_current_context(&mut self) {
        trace!(target: "platform", "Context bound (meshes own their GPU state)");
        self.context_bound = true;
    }

    fn is_context_bound(&self) -> bool {
        self.context_bound
    }

    fn prepare_frame(&mut self, width: u32, height: u32) {
        trace!(target: "platform", "Preparing {}x{} frame", width, height);
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = self.os_window() {
            window.pre_present_notify();
            window.request_redraw();
        }
    }

    fn poll_events(&mut self) {
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state)
        {
            info!(target: "platform", "Event loop exited ({})", code);
            self.state.close_requested = true;
        }

        while let Ok(event) = self.receiver.try_recv() {
            self.callbacks.fire(event);
        }
    }

    fn grab_cursor(&mut self) {
        let Some(window) = self.state.window.as_ref() else {
            return;
        };

        let result = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

        match result {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.cursor_grabbed = true;
            }
            Err(e) => {
                warn!(target: "platform", "Cursor grab refused: {}", e);
            }
        }
    }

    fn ungrab_cursor(&mut self) {
        let Some(window) = self.state.window.as_ref() else {
            return;
        };

        if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!(target: "platform", "Cursor release refused: {}", e);
        }
        window.set_cursor_visible(true);
        self.cursor_grabbed = false;
    }

    fn is_cursor_grabbed(&self) -> bool {
        self.cursor_grabbed
    }

    fn register_keyboard_key_callback(&mut self, callback: Option<KeyboardKeyCallback>) {
        self.callbacks.keyboard = callback;
    }

    fn register_mouse_key_callback(&mut self, callback: Option<MouseKeyCallback>) {
        self.callbacks.mouse = callback;
    }

    fn register_cursor_position_callback(&mut self, callback: Option<CursorPositionCallback>) {
        self.callbacks.cursor = callback;
    }
}
