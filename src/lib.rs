//=========================================================================
// Kinetic Engine: Library Root
//
// A minimal real-time simulation runtime: a window, typed input events,
// time-gated rigid-body physics and a camera-driven frame loop that hands
// control to host game logic between frames.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`, `EngineHandle`)
// - Expose core systems (events, scene, physics) for direct use and tests
// - Expose the `Window` seam with desktop and headless implementations
//
// Typical usage:
// ```no_run
// use kinetic_engine::prelude::*;
//
// struct Idle;
//
// impl Game for Idle {
//     fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}
// }
//
// fn main() -> Result<(), EngineError> {
//     init_logging(LoggingConfig::default());
//
//     let mut engine = EngineBuilder::new().build();
//     engine.init()?;
//     engine.run(&mut Idle)?;
//     engine.deinit()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the platform-independent systems. `platform` holds the
// window seam; it is public so hosts and tests can supply their own
// window (see `HeadlessWindow`).
//
pub mod core;
pub mod error;
pub mod logging;
pub mod platform;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, EngineConfig, EngineHandle, WeakEngineHandle};
pub use error::{EngineError, PlatformError};
