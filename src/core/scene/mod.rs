//=========================================================================
// Scene
//=========================================================================
//
// What the engine draws: the body registry and the bound camera.
//
// Architecture:
//   Scene
//     ├─ registry: BodyRegistry   (weak, plain + rigid)
//     └─ camera:   Weak<RefCell<dyn Camera>>
//
// Flow (once per frame):
//   camera() + draw_list() → Camera::view() → Mesh::draw(vp * model)
//
// The camera and draw list are collected before any camera or mesh is
// called, so the scene is not borrowed while user code runs.
//
//=========================================================================

//=== Module Declarations =================================================

mod body;
mod camera;
mod registry;

//=== Public API ==========================================================

pub use body::{shared, Body, Mesh, RigidBody, SharedBody, SharedMesh, SharedRigidBody};
pub use camera::{Camera, FixedCamera, OrbitCamera, Projection, SharedCamera};
pub use registry::{BodyRegistry, WeakSet};

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Mat4;
use log::trace;

//=== DrawItem ============================================================

/// One mesh to draw with its model transform.
#[derive(Clone)]
pub struct DrawItem {
    pub mesh: SharedMesh,
    pub model: Mat4,
}

//=== Scene ===============================================================

/// Render state: registered bodies and the bound camera.
#[derive(Default)]
pub struct Scene {
    registry: BodyRegistry,
    camera: Option<Weak<RefCell<dyn Camera>>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Camera -----------------------------------------------------------

    /// Replaces the bound camera. Takes effect on the next frame.
    pub fn bind_camera(&mut self, camera: &SharedCamera) {
        self.camera = Some(Rc::downgrade(camera));
    }

    /// The bound camera, if one is bound and still alive.
    pub fn camera(&self) -> Option<SharedCamera> {
        self.camera.as_ref().and_then(Weak::upgrade)
    }

    //--- Bodies -----------------------------------------------------------

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BodyRegistry {
        &mut self.registry
    }

    /// Collects every live body that has a mesh.
    ///
    /// Order is unspecified. Bodies without a mesh are skipped.
    pub fn draw_list(&mut self) -> Vec<DrawItem> {
        let (bodies, rigid_bodies) = self.registry.snapshot();

        let plain = bodies.iter().filter_map(|body| {
            let body = body.borrow();
            Some(DrawItem {
                mesh: body.mesh.clone()?,
                model: body.model_matrix(),
            })
        });

        let rigid = rigid_bodies.iter().filter_map(|rigid| {
            let rigid = rigid.borrow();
            Some(DrawItem {
                mesh: rigid.body.mesh.clone()?,
                model: rigid.body.model_matrix(),
            })
        });

        let items: Vec<DrawItem> = plain.chain(rigid).collect();
        trace!(target: "engine", "Draw list: {} item(s)", items.len());
        items
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    struct NullMesh;

    impl Mesh for NullMesh {
        fn draw(&self, _mvp: &Mat4) {}
    }

    #[test]
    fn no_camera_bound_by_default() {
        assert!(Scene::new().camera().is_none());
    }

    #[test]
    fn dropped_camera_unbinds() {
        let mut scene = Scene::new();
        let camera: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));
        scene.bind_camera(&camera);
        assert!(scene.camera().is_some());

        drop(camera);
        assert!(scene.camera().is_none());
    }

    #[test]
    fn rebinding_replaces_camera() {
        let mut scene = Scene::new();
        let first: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));
        let second: SharedCamera = shared(FixedCamera(Mat4::from_translation(Vec3::Z)));

        scene.bind_camera(&first);
        scene.bind_camera(&second);

        let bound = scene.camera().expect("second camera is alive");
        assert!(Rc::ptr_eq(&bound, &second));
    }

    #[test]
    fn draw_list_skips_meshless_bodies() {
        let mut scene = Scene::new();
        let mesh: SharedMesh = Rc::new(NullMesh);

        let drawn = shared(Body::with_mesh(Rc::clone(&mesh)).at(Vec3::X));
        let hidden = shared(Body::default());
        let rigid = shared(RigidBody::new(Body::with_mesh(mesh), 1.0));

        scene.registry_mut().add_body(&drawn);
        scene.registry_mut().add_body(&hidden);
        scene.registry_mut().add_rigid_body(&rigid);

        let items = scene.draw_list();
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .any(|item| item.model == Mat4::from_translation(Vec3::X)));
    }
}
