//=========================================================================
// Headless Window
//=========================================================================
//
// A `Window` with no display, for tests, CI and offline simulation.
//
// Raw input is injected through a crossbeam channel and delivered to the
// raw callbacks on `poll_events`, in send order. An optional frame limit
// requests close after a fixed number of presented frames so a frame loop
// terminates on its own.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::{
    CursorPositionCallback, KeyboardKeyCallback, MouseKeyCallback, RawCallbacks, RawWindowEvent,
    Window,
};

//=== HeadlessWindow ======================================================

/// Display-less window driven by injected raw events.
pub struct HeadlessWindow {
    size: (u32, u32),
    cursor: (f64, f64),
    close_requested: bool,
    cursor_grabbed: bool,
    context_bound: bool,
    frame_limit: Option<u64>,
    frames_presented: u64,
    sender: Sender<RawWindowEvent>,
    receiver: Receiver<RawWindowEvent>,
    callbacks: RawCallbacks,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            size: (width, height),
            cursor: (0.0, 0.0),
            close_requested: false,
            cursor_grabbed: false,
            context_bound: false,
            frame_limit: None,
            frames_presented: 0,
            sender,
            receiver,
            callbacks: RawCallbacks::default(),
        }
    }

    /// Requests close after `frames` presented frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Sender for raw events; delivered on the next `poll_events`.
    pub fn injector(&self) -> Sender<RawWindowEvent> {
        self.sender.clone()
    }

    /// Resizes the virtual framebuffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// `true` if no raw callback is registered.
    pub fn callbacks_cleared(&self) -> bool {
        self.callbacks.is_empty()
    }
}

//=== Window Implementation ===============================================

impl Window for HeadlessWindow {
    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn window_size(&self) -> (u32, u32) {
        self.size
    }

    fn cursor_position(&self) -> (f64, f64) {
        self.cursor
    }

    fn bind_current_context(&mut self) {
        self.context_bound = true;
    }

    fn is_context_bound(&self) -> bool {
        self.context_bound
    }

    fn prepare_frame(&mut self, width: u32, height: u32) {
        trace!(target: "platform", "Headless frame {} ({}x{})", self.frames_presented, width, height);
    }

    fn swap_buffers(&mut self) {
        self.frames_presented += 1;

        if let Some(limit) = self.frame_limit {
            if self.frames_presented >= limit && !self.close_requested {
                debug!(target: "platform", "Headless frame limit {} reached", limit);
                self.close_requested = true;
            }
        }
    }

    fn poll_events(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                RawWindowEvent::CloseRequested => self.close_requested = true,
                RawWindowEvent::Resized { width, height } => self.resize(width, height),
                RawWindowEvent::CursorMoved { x, y } => {
                    self.cursor = (x, y);
                    self.callbacks.fire(event);
                }
                _ => self.callbacks.fire(event),
            }
        }
    }

    fn grab_cursor(&mut self) {
        self.cursor_grabbed = true;
    }

    fn ungrab_cursor(&mut self) {
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

//=========================================================================
// Unit Tests
//=========================================================================
