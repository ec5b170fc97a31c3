//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use kinetic_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder, EngineHandle, WeakEngineHandle};
pub use crate::error::EngineError;
pub use crate::logging::{init_logging, LoggingConfig};

// Game contract
pub use crate::core::game::Game;

// Input events
pub use crate::core::event::{InputDevice, InputEvent, InputEventType, Key, KeyAction, MouseMotion};

// Scene
pub use crate::core::scene::{
    shared, Body, Camera, FixedCamera, Mesh, OrbitCamera, RigidBody, SharedBody, SharedCamera,
    SharedMesh, SharedRigidBody,
};

// Platform
pub use crate::platform::{HeadlessWindow, Window};
