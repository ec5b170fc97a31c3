//=========================================================================
// Core Systems
//
// Platform-independent building blocks driven by the engine's frame loop.
//
// Responsibilities:
// - Typed events and their dispatcher (`event`)
// - Bodies, cameras and the render registry (`scene`)
// - Time-gated rigid-body integration (`physics`)
// - The host game contract (`game`) and frame timing (`time`)
//
// Notes:
// Nothing here touches the OS. Everything is single-threaded and shared
// through `Rc`/`RefCell`; the engine holds weak references to caller-owned
// state and validates them on every use.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
pub mod game;
pub mod physics;
pub mod scene;
pub mod time;

//=== Public API ==========================================================

pub use event::{Event, EventDispatcher, EventHandler, EventType, InputEvent, InputEventType};
pub use game::Game;
pub use physics::{PhysicsAccumulator, GRAVITY};
pub use scene::{Body, Camera, Mesh, OrbitCamera, RigidBody, Scene};
pub use time::FrameClock;
