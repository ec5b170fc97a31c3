//=========================================================================
// Physics Accumulator
//=========================================================================
//
// Time-gated integration of rigid bodies under constant gravity.
//
// Architecture:
//   update(dt) → spent_time += dt
//                  │ spent_time > simulation_step ?
//                  ↓
//              simulate(spent_time)    (one pass over the whole accumulation)
//                  ↓
//              spent_time = 0
//
// A pass first moves every body with the velocity it had before the pass,
// then derives acceleration from gravity and integrates velocity. The two
// loops stay separate so no body sees another's updated velocity.
//
// This is not a fixed-substep loop: a long frame produces one large step.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec3;
use log::{info, trace};

//=== Internal Dependencies ===============================================

use crate::core::scene::{RigidBody, SharedRigidBody, WeakSet};

//=== Constants ===========================================================

/// Standard gravity used by the accumulator, in units per second squared.
pub const GRAVITY: Vec3 = Vec3::new(0.0, -10.0, 0.0);

//=== PhysicsAccumulator ==================================================

/// Accumulates frame time and integrates registered rigid bodies once the
/// simulation step is exceeded.
///
/// Bodies are held weakly; a body its owner dropped is skipped and pruned.
pub struct PhysicsAccumulator {
    simulation_step: f32,
    spent_time: f32,
    gravity: Vec3,
    bodies: WeakSet<RigidBody>,
}

impl PhysicsAccumulator {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            simulation_step: 0.0,
            spent_time: 0.0,
            gravity: GRAVITY,
            bodies: WeakSet::new(),
        }
    }

    /// Overrides the gravity vector (builder style).
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    //--- Lifecycle --------------------------------------------------------

    /// Sets the threshold and resets accumulated time.
    pub fn init(&mut self, simulation_step: f32) {
        info!(target: "physics", "Physics started (step: {:.4}s)", simulation_step);
        self.simulation_step = simulation_step;
        self.spent_time = 0.0;
    }

    /// Resets timing and forgets every body.
    pub fn deinit(&mut self) {
        info!(target: "physics", "Physics stopped ({} body(ies) released)", self.bodies.len());
        self.simulation_step = 0.0;
        self.spent_time = 0.0;
        self.bodies.clear();
    }

    //--- Bodies -----------------------------------------------------------

    /// Registers `body`. Adding it twice keeps one entry.
    pub fn add_rigid_body(&mut self, body: &SharedRigidBody) {
        self.bodies.insert(body);
    }

    /// Unregisters `body`. Unknown bodies are ignored.
    pub fn remove_rigid_body(&mut self, body: &SharedRigidBody) {
        self.bodies.remove(body);
    }

    pub fn contains(&self, body: &SharedRigidBody) -> bool {
        self.bodies.contains(body)
    }

    //--- Simulation -------------------------------------------------------

    /// Adds `dt` to the accumulator and runs one pass if the step is
    /// exceeded.
    ///
    /// The threshold is strict: accumulating exactly `simulation_step`
    /// does not trigger a pass.
    pub fn update(&mut self, dt: f32) {
        self.spent_time += dt;

        if self.spent_time > self.simulation_step {
            self.simulate(self.spent_time);
            self.spent_time = 0.0;
        }
    }

    fn simulate(&mut self, step: f32) {
        let bodies = self.bodies.snapshot();
        trace!(target: "physics", "Integrating {} body(ies) over {:.4}s", bodies.len(), step);

        //--- Positions from pre-pass velocity -----------------------------
        for body in &bodies {
            let mut rigid = body.borrow_mut();
            let displacement = rigid.velocity * step;
            rigid.body.position += displacement;
        }

        //--- Accelerations and velocities ---------------------------------
        for body in &bodies {
            let mut rigid = body.borrow_mut();
            rigid.acceleration = rigid.mass * self.gravity * rigid.mass_inv;
            let dv = rigid.acceleration * step;
            rigid.velocity += dv;
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn simulation_step(&self) -> f32 {
        self.simulation_step
    }

    /// Time accumulated since the last pass.
    pub fn spent_time(&self) -> f32 {
        self.spent_time
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Number of live registered bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
