//=========================================================================
// Bodies
//=========================================================================
//
// Positioned, oriented entities the engine renders and simulates.
//
// Ownership:
//   Game  ──owns──>  Rc<RefCell<Body>>  <──weak──  BodyRegistry
//
// The engine never owns a body. Callers keep the strong reference and
// the registry validates its weak reference on every use.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

//=== Mesh ================================================================

/// Drawable geometry.
///
/// `mvp` is the full `projection * view * model` transform for the current
/// frame. Implementations own whatever GPU resources they need; the engine
/// only decides when and with which matrix to draw.
///
/// `draw` must not add or remove bodies.
pub trait Mesh {
    fn draw(&self, mvp: &Mat4);
}

/// Mesh shared between any number of bodies.
pub type SharedMesh = Rc<dyn Mesh>;

//=== Body ================================================================

/// A drawable entity with a position and orientation.
#[derive(Clone)]
pub struct Body {
    /// Geometry to draw. Bodies without a mesh are registered but skipped
    /// when rendering.
    pub mesh: Option<SharedMesh>,
    pub position: Vec3,
    /// Unit quaternion.
    pub rotation: Quat,
}

impl Body {
    /// Creates a body at the origin with the given mesh.
    pub fn with_mesh(mesh: SharedMesh) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::default()
        }
    }

    /// Sets the position (builder style).
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Model transform: rotation first, then translation in the rotated
    /// frame.
    ///
    /// Equivalent to `rotation_matrix * translation(position)`, so the
    /// position is expressed in the body's own rotated axes.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation) * Mat4::from_translation(self.position)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self {
            mesh: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("has_mesh", &self.mesh.is_some())
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .finish()
    }
}

//=== RigidBody ===========================================================

/// A body with linear motion state and mass.
///
/// `mass == 0` together with `mass_inv == 0` describes a static body that
/// gravity does not accelerate. [`RigidBody::new`] keeps the two fields
/// consistent; callers writing the fields directly are responsible for it.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body: Body,
    pub velocity: Vec3,
    /// Recomputed on every physics pass.
    pub acceleration: Vec3,
    pub mass: f32,
    pub mass_inv: f32,
}

impl RigidBody {
    /// Creates a resting rigid body.
    ///
    /// A mass of zero yields a static body.
    ///
    /// # Panics
    ///
    /// Panics if `mass` is negative or not finite.
    pub fn new(body: Body, mass: f32) -> Self {
        assert!(
            mass.is_finite() && mass >= 0.0,
            "Mass must be finite and non-negative, got {}",
            mass
        );

        let mass_inv = if mass == 0.0 { 0.0 } else { 1.0 / mass };

        Self {
            body,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            mass,
            mass_inv,
        }
    }

    /// Creates a static body (zero mass, zero inverse mass).
    pub fn immovable(body: Body) -> Self {
        Self::new(body, 0.0)
    }

    /// Sets the initial velocity (builder style).
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Returns `true` if gravity does not move this body.
    pub fn is_static(&self) -> bool {
        self.mass_inv == 0.0
    }
}

//=== Shared Handles ======================================================

/// Caller-owned body handle.
pub type SharedBody = Rc<RefCell<Body>>;

/// Caller-owned rigid body handle.
pub type SharedRigidBody = Rc<RefCell<RigidBody>>;

/// Wraps a value into a caller-owned `Rc<RefCell<_>>` handle.
pub fn shared<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

//=========================================================================
// Unit Tests
//=========================================================================
