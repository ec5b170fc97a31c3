//=========================================================================
// Cameras
//=========================================================================
//
// View and projection transforms.
//
// Architecture:
//   Projection::matrix(w, h) × Camera::view() = view-projection
//
// The engine binds one camera by weak reference; the game owns it and may
// mutate it from input handlers between frames.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

//=== Camera ==============================================================

/// Anything that can produce a view matrix.
///
/// `view` is called once per frame with no engine state borrowed, so it
/// may query the engine handle.
pub trait Camera {
    fn view(&self) -> Mat4;
}

/// Caller-owned camera handle.
pub type SharedCamera = Rc<RefCell<dyn Camera>>;

//=== Projection ==========================================================

/// Right-handed, OpenGL depth-range perspective settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Perspective matrix for a `width × height` viewport.
    ///
    /// Zero dimensions are treated as one pixel, so a minimized window
    /// still yields a finite matrix.
    pub fn matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

//=== OrbitCamera =========================================================

/// Camera orbiting a fixed target on a sphere.
///
/// `alpha` is the azimuth around +Y measured from +Z, `theta` the
/// elevation above the XZ plane, both in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub alpha: f32,
    pub theta: f32,
}

impl OrbitCamera {
    pub const DEFAULT_DISTANCE: f32 = 20.0;
    pub const INITIAL_ALPHA_DEGREES: f32 = 0.0;
    pub const INITIAL_THETA_DEGREES: f32 = 30.0;

    /// Radians of rotation per degree of pointer movement.
    pub const ROTATION_SPEED: f32 = 0.05;

    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            distance: Self::DEFAULT_DISTANCE,
            alpha: Self::INITIAL_ALPHA_DEGREES.to_radians(),
            theta: Self::INITIAL_THETA_DEGREES.to_radians(),
        }
    }

    /// Rotates the camera by a pointer displacement.
    ///
    /// Moving right decreases the azimuth; moving down raises the camera.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.alpha -= dx.to_radians() * Self::ROTATION_SPEED;
        self.theta += dy.to_radians() * Self::ROTATION_SPEED;
    }

    /// Restores the initial angles. Target and distance are kept.
    pub fn reset(&mut self) {
        self.alpha = Self::INITIAL_ALPHA_DEGREES.to_radians();
        self.theta = Self::INITIAL_THETA_DEGREES.to_radians();
    }

    /// Eye position relative to the origin.
    pub fn eye(&self) -> Vec3 {
        let (sin_alpha, cos_alpha) = self.alpha.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();

        self.distance * Vec3::new(sin_alpha * cos_theta, sin_theta, cos_alpha * cos_theta)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera for OrbitCamera {
    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }
}

//=== FixedCamera =========================================================

/// Camera with a constant view matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCamera(pub Mat4);

impl FixedCamera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self(Mat4::look_at_rh(eye, target, Vec3::Y))
    }
}

impl Camera for FixedCamera {
    fn view(&self) -> Mat4 {
        self.0
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
