//=========================================================================
// Game
//=========================================================================
//
// Host-supplied logic driven by `Engine::run`.
//
// Lifecycle:
//   init(handle) → [ update(handle, dt) per frame ] → deinit(handle)
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::engine::EngineHandle;

//=== Game Trait ==========================================================

/// Game logic hooks.
///
/// Only `update()` is required. `init` usually adds bodies, binds a camera
/// and registers input callbacks through the handle; `deinit` undoes it.
///
/// ```no_run
/// use kinetic_engine::prelude::*;
///
/// struct Idle;
///
/// impl Game for Idle {
///     fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}
/// }
/// ```
pub trait Game {
    /// Called once before the first frame.
    fn init(&mut self, _engine: &EngineHandle) {}

    /// Called at the end of every frame with the frame's wall-clock time.
    fn update(&mut self, engine: &EngineHandle, dt: f32);

    /// Called once after the window reports close.
    fn deinit(&mut self, _engine: &EngineHandle) {}
}
