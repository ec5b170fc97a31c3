//=========================================================================
// Kinetic Engine
//
// Main entry point and coordinator for the engine.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──init()──>  [Runtime]  ──run(game)──> frame loop
//         │                          │                     ├─ Box<dyn Window>
//         ├─ with_title()            │                     └─ InputTranslator
//         ├─ with_window_size()      │
//         ├─ with_simulation_step()  └─ EngineHandle (Rc, cloneable)
//         └─ with_projection()             ├─ EventDispatcher
//                                          ├─ Scene (bodies + camera)
//                                          ├─ PhysicsAccumulator
//                                          └─ deferred window commands
// ```
//
// Frame (one iteration of `run`):
//   1. query size, prepare viewport
//   2. view-projection = perspective × camera view
//   3. draw every registered body with a mesh
//   4. present, poll events (input handlers run here), apply commands
//   5. measure frame time
//   6. advance physics
//   7. Game::update(dt)
//
// Handlers and the game reach the engine through `EngineHandle`, never
// through `Engine` itself, so the window can stay mutably borrowed while
// user code runs during polling.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use glam::Mat4;
use log::{error, info, trace};

//=== Internal Dependencies ===============================================

use crate::core::event::{Event, EventDispatcher, InputEvent, InputEventType};
use crate::core::game::Game;
use crate::core::physics::PhysicsAccumulator;
use crate::core::scene::{Projection, Scene, SharedBody, SharedCamera, SharedRigidBody};
use crate::core::time::FrameClock;
use crate::error::EngineError;
use crate::platform::{InputTranslator, WinitWindow, Window, WindowConfig};

//=== EngineConfig ========================================================

/// Settings fixed at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub window: WindowConfig,
    /// Minimum accumulated seconds before a physics pass.
    pub simulation_step: f32,
    pub projection: Projection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            simulation_step: 1.0 / 60.0,
            projection: Projection::default(),
        }
    }
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Title**: "Kinetic Engine"
/// - **Window size**: 640×480
/// - **Simulation step**: 1/60 s
/// - **Projection**: 45° vertical FOV, near 0.1, far 100
///
/// # Examples
///
/// ```no_run
/// use kinetic_engine::prelude::*;
///
/// struct Idle;
///
/// impl Game for Idle {
///     fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}
/// }
///
/// fn main() -> Result<(), EngineError> {
///     let mut engine = EngineBuilder::new()
///         .with_title("Sandbox")
///         .with_window_size(1280, 720)
///         .build();
///
///     engine.init()?;
///     engine.run(&mut Idle)?;
///     engine.deinit()
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    /// Sets the initial window size in logical pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0,
            "Window size must be positive, got {}x{}",
            width,
            height
        );
        self.config.window.width = width;
        self.config.window.height = height;
        self
    }

    /// Sets the physics simulation step in seconds.
    ///
    /// Physics runs one pass whenever accumulated frame time exceeds this
    /// value. Default: 1/60.
    ///
    /// # Panics
    ///
    /// Panics if `step <= 0.0`.
    pub fn with_simulation_step(mut self, step: f32) -> Self {
        assert!(step > 0.0, "Simulation step must be positive, got {}", step);
        self.config.simulation_step = step;
        self
    }

    /// Sets the perspective projection.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < fov_y_degrees < 180` and `0 < near < far`.
    pub fn with_projection(mut self, fov_y_degrees: f32, near: f32, far: f32) -> Self {
        assert!(
            fov_y_degrees > 0.0 && fov_y_degrees < 180.0,
            "Field of view must be within (0, 180) degrees, got {}",
            fov_y_degrees
        );
        assert!(
            near > 0.0 && near < far,
            "Clip planes must satisfy 0 < near < far, got near={} far={}",
            near,
            far
        );
        self.config.projection = Projection {
            fov_y_degrees,
            near,
            far,
        };
        self
    }

    /// Builds the engine. No window exists until [`Engine::init`].
    pub fn build(self) -> Engine {
        info!(
            target: "engine",
            "Building engine ({}x{}, step: {:.4}s)",
            self.config.window.width,
            self.config.window.height,
            self.config.simulation_step
        );

        Engine {
            config: self.config,
            handle: EngineHandle::new(),
            runtime: None,
        }
    }
}

//=== Window Commands =====================================================

/// Window operations requested through the handle, applied after polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowCommand {
    SetCursorGrab(bool),
    Close,
}

//=== EngineHandle ========================================================

struct EngineShared {
    dispatcher: Rc<EventDispatcher>,
    scene: RefCell<Scene>,
    physics: RefCell<PhysicsAccumulator>,
    commands: RefCell<Vec<WindowCommand>>,
}

/// Cloneable access to the engine's registries, dispatcher and window
/// commands.
///
/// Every method takes `&self` and may be called from input handlers while
/// the frame loop is running. Changes apply from the next frame (render
/// set, camera) or the next raised event (handlers).
///
/// Handlers stored in the dispatcher should capture a
/// [`WeakEngineHandle`] to avoid a reference cycle.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Rc<EngineShared>,
}

impl EngineHandle {
    fn new() -> Self {
        Self {
            shared: Rc::new(EngineShared {
                dispatcher: Rc::new(EventDispatcher::new()),
                scene: RefCell::new(Scene::new()),
                physics: RefCell::new(PhysicsAccumulator::new()),
                commands: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakEngineHandle {
        WeakEngineHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    //--- Camera -----------------------------------------------------------

    /// Binds `camera` for rendering. The engine keeps a weak reference;
    /// the caller must keep `camera` alive for as long as it should render.
    pub fn bind_camera(&self, camera: &SharedCamera) {
        trace!(target: "engine", "Camera bound");
        self.shared.scene.borrow_mut().bind_camera(camera);
    }

    /// The bound camera, if it is still alive.
    pub fn camera(&self) -> Option<SharedCamera> {
        self.shared.scene.borrow().camera()
    }

    //--- Bodies -----------------------------------------------------------

    /// Adds `body` to the render set. Adding twice has no effect.
    pub fn add_body(&self, body: &SharedBody) {
        self.shared.scene.borrow_mut().registry_mut().add_body(body);
    }

    /// Adds `body` to the render set and to physics.
    pub fn add_rigid_body(&self, body: &SharedRigidBody) {
        self.shared.scene.borrow_mut().registry_mut().add_rigid_body(body);
        self.shared.physics.borrow_mut().add_rigid_body(body);
    }

    /// Removes `body` from the render set.
    pub fn remove_body(&self, body: &SharedBody) {
        self.shared.scene.borrow_mut().registry_mut().remove_body(body);
    }

    /// Removes `body` from the render set only; physics keeps simulating
    /// it. Use [`EngineHandle::detach_rigid_body`] to remove it from both.
    pub fn remove_rigid_body(&self, body: &SharedRigidBody) {
        self.shared.scene.borrow_mut().registry_mut().remove_rigid_body(body);
    }

    /// Removes `body` from both the render set and physics.
    pub fn detach_rigid_body(&self, body: &SharedRigidBody) {
        self.remove_rigid_body(body);
        self.shared.physics.borrow_mut().remove_rigid_body(body);
    }

    pub fn contains_body(&self, body: &SharedBody) -> bool {
        self.shared.scene.borrow().registry().contains_body(body)
    }

    pub fn contains_rigid_body(&self, body: &SharedRigidBody) -> bool {
        self.shared.scene.borrow().registry().contains_rigid_body(body)
    }

    /// `true` if physics integrates `body`.
    pub fn is_simulated(&self, body: &SharedRigidBody) -> bool {
        self.shared.physics.borrow().contains(body)
    }

    /// Live bodies in the render set.
    pub fn body_count(&self) -> usize {
        self.shared.scene.borrow().registry().len()
    }

    //--- Input ------------------------------------------------------------

    /// Routes events of exactly `event_type` to `callback`, replacing any
    /// previous callback for that type.
    pub fn register_input_callback<F>(&self, event_type: InputEventType, callback: F)
    where
        F: Fn(&InputEvent) + 'static,
    {
        self.shared.dispatcher.register(
            event_type,
            Some(Rc::new(move |event: &Event| {
                if let Some(input) = event.as_input() {
                    callback(input);
                }
            })),
        );
    }

    pub fn unregister_input_callback(&self, event_type: InputEventType) {
        self.shared.dispatcher.unregister(event_type);
    }

    pub fn dispatcher(&self) -> &Rc<EventDispatcher> {
        &self.shared.dispatcher
    }

    //--- Window commands --------------------------------------------------

    /// Captures or releases the cursor after the current event poll.
    pub fn request_cursor_grab(&self, grab: bool) {
        self.shared
            .commands
            .borrow_mut()
            .push(WindowCommand::SetCursorGrab(grab));
    }

    /// Ends the frame loop after the next event poll.
    ///
    /// Requested from [`Game::update`], one more frame is rendered before
    /// the loop exits.
    pub fn request_close(&self) {
        self.shared.commands.borrow_mut().push(WindowCommand::Close);
    }

    //--- Frame internals --------------------------------------------------

    fn render(&self, projection: Mat4) -> Result<(), EngineError> {
        let (camera, items) = {
            let mut scene = self.shared.scene.borrow_mut();
            (scene.camera(), scene.draw_list())
        };
        let camera = camera.ok_or_else(|| {
            error!(target: "engine", "Render with no live camera bound");
            EngineError::Precondition("no live camera is bound")
        })?;

        // Scene borrow is released: cameras and meshes may use the handle.
        let view_projection = projection * camera.borrow().view();

        for item in &items {
            item.mesh.draw(&(view_projection * item.model));
        }
        Ok(())
    }

    fn apply_window_commands(&self, window: &mut dyn Window) {
        let commands = mem::take(&mut *self.shared.commands.borrow_mut());
        for command in commands {
            trace!(target: "engine", "Applying {:?}", command);
            match command {
                WindowCommand::SetCursorGrab(true) => window.grab_cursor(),
                WindowCommand::SetCursorGrab(false) => window.ungrab_cursor(),
                WindowCommand::Close => window.request_close(),
            }
        }
    }

    fn advance_physics(&self, dt: f32) {
        self.shared.physics.borrow_mut().update(dt);
    }
}

/// Non-owning [`EngineHandle`] for use inside stored handlers.
#[derive(Clone)]
pub struct WeakEngineHandle {
    shared: Weak<EngineShared>,
}

impl WeakEngineHandle {
    /// The engine handle, if the engine is still alive.
    pub fn upgrade(&self) -> Option<EngineHandle> {
        self.shared.upgrade().map(|shared| EngineHandle { shared })
    }
}

//=== Engine ==============================================================

struct Runtime {
    window: Box<dyn Window>,
    input: InputTranslator,
}

/// Kinetic Engine runtime.
///
/// Create via [`EngineBuilder`], then `init` → `run` → `deinit`.
///
/// # Lifecycle
///
/// ```text
/// build() ──> init() / init_with_window() ──> run(game) ──> deinit()
///                 │                              │
///                 ├─ bind context                ├─ game.init
///                 ├─ bind input translator       ├─ frames until close
///                 └─ start physics               └─ game.deinit
/// ```
pub struct Engine {
    config: EngineConfig,
    handle: EngineHandle,
    runtime: Option<Runtime>,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Creates the desktop window and initializes the engine on it.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Precondition`] if already initialized
    /// - [`EngineError::Platform`] if the window cannot be created
    pub fn init(&mut self) -> Result<(), EngineError> {
        self.ensure_uninitialized()?;
        let window = WinitWindow::new(&self.config.window)?;
        self.init_with_window(window)
    }

    /// Initializes the engine on a caller-supplied window.
    ///
    /// # Errors
    ///
    /// [`EngineError::Precondition`] if already initialized.
    pub fn init_with_window<W: Window + 'static>(&mut self, window: W) -> Result<(), EngineError> {
        self.ensure_uninitialized()?;
        info!(target: "engine", "Initializing engine");

        let mut window: Box<dyn Window> = Box::new(window);
        window.bind_current_context();

        let mut input = InputTranslator::new();
        input.init(window.as_mut(), &self.handle.shared.dispatcher)?;

        self.handle
            .shared
            .physics
            .borrow_mut()
            .init(self.config.simulation_step);

        self.runtime = Some(Runtime { window, input });
        info!(target: "engine", "Engine initialization complete");
        Ok(())
    }

    /// Unbinds input, stops physics and drops the window.
    ///
    /// Registered bodies and the bound camera are kept.
    ///
    /// # Errors
    ///
    /// [`EngineError::Precondition`] if not initialized.
    pub fn deinit(&mut self) -> Result<(), EngineError> {
        let Some(mut runtime) = self.runtime.take() else {
            error!(target: "engine", "deinit called before init");
            return Err(EngineError::Precondition("engine is not initialized"));
        };

        runtime.input.deinit(runtime.window.as_mut())?;
        self.handle.shared.physics.borrow_mut().deinit();

        info!(target: "engine", "Engine shutdown complete");
        Ok(())
    }

    fn ensure_uninitialized(&self) -> Result<(), EngineError> {
        if self.runtime.is_some() {
            error!(target: "engine", "init called twice");
            return Err(EngineError::Precondition("engine is already initialized"));
        }
        Ok(())
    }

    //--- Execution --------------------------------------------------------

    /// Runs `game` until the window reports close.
    ///
    /// Calls `game.init` once, then frames until close, then `game.deinit`.
    /// `game.deinit` also runs when a frame fails.
    ///
    /// # Errors
    ///
    /// [`EngineError::Precondition`] if the engine is not initialized, or
    /// if a frame is rendered with no live camera bound.
    pub fn run(&mut self, game: &mut dyn Game) -> Result<(), EngineError> {
        let handle = self.handle.clone();
        let config = &self.config;
        let Some(runtime) = self.runtime.as_mut() else {
            error!(target: "engine", "run called before init");
            return Err(EngineError::Precondition("engine is not initialized"));
        };

        info!(target: "engine", "Entering frame loop");
        game.init(&handle);

        let mut clock = FrameClock::new();
        let result = loop {
            if runtime.window.should_close() {
                break Ok(());
            }
            if let Err(e) = Self::frame(config, &handle, runtime, game, &mut clock) {
                break Err(e);
            }
        };

        game.deinit(&handle);
        info!(target: "engine", "Frame loop exited after {} frame(s)", clock.frame());
        result
    }

    fn frame(
        config: &EngineConfig,
        handle: &EngineHandle,
        runtime: &mut Runtime,
        game: &mut dyn Game,
        clock: &mut FrameClock,
    ) -> Result<(), EngineError> {
        //--- 1. Viewport ------------------------------------------------
        let (width, height) = runtime.window.window_size();
        runtime.window.prepare_frame(width, height);

        //--- 2-3. Render ------------------------------------------------
        handle.render(config.projection.matrix(width, height))?;

        //--- 4. Present and poll ----------------------------------------
        runtime.window.swap_buffers();
        runtime.window.poll_events();
        handle.apply_window_commands(runtime.window.as_mut());

        //--- 5-7. Time, physics, game -----------------------------------
        let dt = clock.tick();
        handle.advance_physics(dt);
        game.update(handle, dt);

        Ok(())
    }

    //--- Accessors --------------------------------------------------------

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.runtime.is_some()
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&dyn Window> {
        self.runtime.as_ref().map(|runtime| runtime.window.as_ref())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{Key, KeyAction};
    use crate::core::scene::{shared, Body, Camera, FixedCamera, Mesh, RigidBody};
    use crate::platform::{HeadlessWindow, RawWindowEvent};
    use glam::Vec3;
    use std::cell::Cell;
    use std::thread;
    use std::time::Duration;
    use winit::event::ElementState;
    use winit::keyboard::{KeyCode, PhysicalKey};

    //--- Test Helpers -----------------------------------------------------

    #[derive(Default)]
    struct RecordingMesh {
        draws: RefCell<Vec<Mat4>>,
    }

    impl Mesh for RecordingMesh {
        fn draw(&self, mvp: &Mat4) {
            self.draws.borrow_mut().push(*mvp);
        }
    }

    /// Game that binds a camera and counts lifecycle calls.
    #[derive(Default)]
    struct CountingGame {
        camera: Option<SharedCamera>,
        inits: u32,
        updates: u32,
        deinits: u32,
    }

    impl Game for CountingGame {
        fn init(&mut self, engine: &EngineHandle) {
            self.inits += 1;
            let camera: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));
            engine.bind_camera(&camera);
            self.camera = Some(camera);
        }

        fn update(&mut self, _engine: &EngineHandle, _dt: f32) {
            self.updates += 1;
        }

        fn deinit(&mut self, _engine: &EngineHandle) {
            self.deinits += 1;
        }
    }

    fn headless_engine(frames: u64) -> Engine {
        let mut engine = EngineBuilder::new().build();
        engine
            .init_with_window(HeadlessWindow::new(640, 480).with_frame_limit(frames))
            .expect("headless init should succeed");
        engine
    }

    fn press(code: KeyCode) -> RawWindowEvent {
        RawWindowEvent::Key {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let engine = EngineBuilder::new().build();
        let config = engine.config();

        assert_eq!(config.window.title, "Kinetic Engine");
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.simulation_step, 1.0 / 60.0);
        assert_eq!(config.projection, Projection::default());
        assert!(!engine.is_initialized());
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::new()
            .with_title("Sandbox")
            .with_window_size(1280, 720)
            .with_simulation_step(0.01)
            .with_projection(60.0, 0.5, 500.0)
            .build();

        let config = engine.config();
        assert_eq!(config.window.title, "Sandbox");
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert_eq!(config.simulation_step, 0.01);
        assert_eq!(config.projection.fov_y_degrees, 60.0);
        assert_eq!(config.projection.far, 500.0);
    }

    #[test]
    #[should_panic(expected = "Simulation step must be positive")]
    fn builder_with_simulation_step_panics_on_zero() {
        EngineBuilder::new().with_simulation_step(0.0);
    }

    #[test]
    #[should_panic(expected = "Window size must be positive")]
    fn builder_with_window_size_panics_on_zero() {
        EngineBuilder::new().with_window_size(0, 480);
    }

    #[test]
    #[should_panic(expected = "Field of view must be within")]
    fn builder_with_projection_panics_on_flat_fov() {
        EngineBuilder::new().with_projection(180.0, 0.1, 100.0);
    }

    #[test]
    #[should_panic(expected = "Clip planes must satisfy")]
    fn builder_with_projection_panics_on_inverted_planes() {
        EngineBuilder::new().with_projection(45.0, 10.0, 1.0);
    }

    //=====================================================================
    // Lifecycle Preconditions
    //=====================================================================

    #[test]
    fn run_before_init_is_rejected() {
        let mut engine = EngineBuilder::new().build();
        let mut game = CountingGame::default();

        let result = engine.run(&mut game);

        assert!(matches!(result, Err(EngineError::Precondition(_))));
        assert_eq!(game.inits, 0, "Game must not start on an uninitialized engine");
    }

    #[test]
    fn double_init_is_rejected() {
        let mut engine = headless_engine(1);
        let result = engine.init_with_window(HeadlessWindow::new(1, 1));
        assert!(matches!(result, Err(EngineError::Precondition(_))));
    }

    #[test]
    fn deinit_before_init_is_rejected() {
        let mut engine = EngineBuilder::new().build();
        assert!(matches!(engine.deinit(), Err(EngineError::Precondition(_))));
    }

    #[test]
    fn init_deinit_cycle_can_repeat() {
        let mut engine = headless_engine(1);
        engine.deinit().expect("first deinit");
        assert!(!engine.is_initialized());

        engine
            .init_with_window(HeadlessWindow::new(640, 480))
            .expect("re-init after deinit");
        engine.deinit().expect("second deinit");
    }

    #[test]
    fn rendering_without_camera_is_rejected() {
        struct NoCamera {
            deinits: u32,
        }

        impl Game for NoCamera {
            fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}

            fn deinit(&mut self, _engine: &EngineHandle) {
                self.deinits += 1;
            }
        }

        let mut engine = headless_engine(5);
        let mut game = NoCamera { deinits: 0 };

        let result = engine.run(&mut game);

        assert!(matches!(result, Err(EngineError::Precondition(_))));
        assert_eq!(game.deinits, 1, "deinit runs even when a frame fails");
    }

    #[test]
    fn dropped_camera_is_a_precondition_error() {
        let mut engine = headless_engine(5);
        let camera: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));
        engine.handle().bind_camera(&camera);
        drop(camera);

        struct Idle;
        impl Game for Idle {
            fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}
        }

        assert!(matches!(engine.run(&mut Idle), Err(EngineError::Precondition(_))));
    }

    //=====================================================================
    // Frame Loop
    //=====================================================================

    #[test]
    fn game_lifecycle_follows_frames() {
        let mut engine = headless_engine(3);
        let mut game = CountingGame::default();

        engine.run(&mut game).expect("run should succeed");

        assert_eq!(game.inits, 1);
        assert_eq!(game.updates, 3, "One update per presented frame");
        assert_eq!(game.deinits, 1);
    }

    #[test]
    fn bodies_are_drawn_with_full_transform() {
        let mut engine = headless_engine(1);
        let mesh = Rc::new(RecordingMesh::default());
        let body = shared(Body::with_mesh(mesh.clone()).at(Vec3::new(1.0, 2.0, 3.0)));
        let hidden = shared(Body::default());
        engine.handle().add_body(&body);
        engine.handle().add_body(&hidden);

        let mut game = CountingGame::default();
        engine.run(&mut game).expect("run should succeed");

        let projection = Projection::default().matrix(640, 480);
        let expected = projection * Mat4::IDENTITY * body.borrow().model_matrix();

        let draws = mesh.draws.borrow();
        assert_eq!(draws.len(), 1, "Meshless bodies are skipped");
        assert!(draws[0].abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn bound_camera_stays_owned_by_caller() {
        let engine = EngineBuilder::new().build();
        let camera: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));

        engine.handle().bind_camera(&camera);

        let bound = engine.handle().camera().expect("caller still holds the camera");
        assert!(Rc::ptr_eq(&bound, &camera));
        drop(bound);

        drop(camera);
        assert!(engine.handle().camera().is_none());
    }

    #[test]
    fn init_binds_window_context() {
        let engine = headless_engine(1);
        let window = engine.window().expect("engine is initialized");
        assert!(window.is_context_bound());
    }

    #[test]
    fn projection_follows_window_size_each_frame() {
        let window = HeadlessWindow::new(640, 480).with_frame_limit(2);
        window
            .injector()
            .send(RawWindowEvent::Resized { width: 300, height: 600 })
            .expect("channel open");

        let mut engine = EngineBuilder::new().build();
        engine.init_with_window(window).expect("headless init");

        let mesh = Rc::new(RecordingMesh::default());
        let body = shared(Body::with_mesh(mesh.clone()));
        engine.handle().add_body(&body);

        let mut game = CountingGame::default();
        engine.run(&mut game).expect("run should succeed");

        let projection = Projection::default();
        let draws = mesh.draws.borrow();
        assert_eq!(draws.len(), 2);
        assert!(
            draws[0].abs_diff_eq(projection.matrix(640, 480), 1e-6),
            "Frame 1 renders before the resize is polled"
        );
        assert!(
            draws[1].abs_diff_eq(projection.matrix(300, 600), 1e-6),
            "Frame 2 uses the new aspect ratio"
        );
    }

    #[test]
    fn camera_view_may_use_engine_handle() {
        /// Camera that moves back one unit per registered body.
        struct CountingCamera(WeakEngineHandle);

        impl Camera for CountingCamera {
            fn view(&self) -> Mat4 {
                let bodies = self.0.upgrade().map_or(0, |engine| engine.body_count());
                Mat4::from_translation(Vec3::new(0.0, 0.0, -(bodies as f32)))
            }
        }

        let mut engine = headless_engine(1);
        let camera: SharedCamera = shared(CountingCamera(engine.handle().downgrade()));
        engine.handle().bind_camera(&camera);

        let mesh = Rc::new(RecordingMesh::default());
        let first = shared(Body::with_mesh(mesh.clone()));
        let second = shared(Body::default());
        engine.handle().add_body(&first);
        engine.handle().add_body(&second);

        struct Idle;
        impl Game for Idle {
            fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}
        }

        engine.run(&mut Idle).expect("run should succeed");

        let expected = Projection::default().matrix(640, 480)
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
        let draws = mesh.draws.borrow();
        assert_eq!(draws.len(), 1);
        assert!(draws[0].abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn camera_rebind_takes_effect_next_frame() {
        struct Rebinder {
            first: SharedCamera,
            second: SharedCamera,
        }

        impl Game for Rebinder {
            fn init(&mut self, engine: &EngineHandle) {
                engine.bind_camera(&self.first);

                let weak = engine.downgrade();
                let second = self.second.clone();
                engine.register_input_callback(
                    InputEventType::keyboard(Key::KeyC, KeyAction::Pressed),
                    move |_| {
                        if let Some(engine) = weak.upgrade() {
                            engine.bind_camera(&second);
                        }
                    },
                );
            }

            fn update(&mut self, _engine: &EngineHandle, _dt: f32) {}
        }

        let first_view = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
        let second_view = Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0));
        let first: SharedCamera = shared(FixedCamera(first_view));
        let second: SharedCamera = shared(FixedCamera(second_view));

        let window = HeadlessWindow::new(640, 480).with_frame_limit(2);
        window.injector().send(press(KeyCode::KeyC)).expect("channel open");

        let mut engine = EngineBuilder::new().build();
        engine.init_with_window(window).expect("headless init");

        let mesh = Rc::new(RecordingMesh::default());
        let body = shared(Body::with_mesh(mesh.clone()));
        engine.handle().add_body(&body);

        let mut game = Rebinder {
            first: first.clone(),
            second: second.clone(),
        };
        engine.run(&mut game).expect("run should succeed");

        let projection = Projection::default().matrix(640, 480);
        let draws = mesh.draws.borrow();
        assert_eq!(draws.len(), 2);
        assert!(
            draws[0].abs_diff_eq(projection * first_view, 1e-6),
            "Frame rendered before the poll uses the old camera"
        );
        assert!(
            draws[1].abs_diff_eq(projection * second_view, 1e-6),
            "Rebinding applies from the next frame"
        );
    }

    #[test]
    fn physics_advances_during_run() {
        struct Sleeper(Option<SharedCamera>);

        impl Game for Sleeper {
            fn init(&mut self, engine: &EngineHandle) {
                let camera: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));
                engine.bind_camera(&camera);
                self.0 = Some(camera);
            }

            fn update(&mut self, _engine: &EngineHandle, _dt: f32) {
                thread::sleep(Duration::from_millis(2));
            }
        }

        let mut engine = EngineBuilder::new().with_simulation_step(0.001).build();
        engine
            .init_with_window(HeadlessWindow::new(640, 480).with_frame_limit(4))
            .expect("headless init");

        let ball = shared(RigidBody::new(Body::default(), 1.0));
        engine.handle().add_rigid_body(&ball);

        engine.run(&mut Sleeper(None)).expect("run should succeed");

        let rigid = ball.borrow();
        assert!(rigid.velocity.y < 0.0, "Gravity should have pulled the ball down");
        assert!(rigid.body.position.y < 0.0);
    }

    #[test]
    fn request_close_ends_loop_after_next_poll() {
        struct Quitter {
            camera: Option<SharedCamera>,
            updates: u32,
        }

        impl Game for Quitter {
            fn init(&mut self, engine: &EngineHandle) {
                let camera: SharedCamera = shared(FixedCamera(Mat4::IDENTITY));
                engine.bind_camera(&camera);
                self.camera = Some(camera);
            }

            fn update(&mut self, engine: &EngineHandle, _dt: f32) {
                self.updates += 1;
                engine.request_close();
            }
        }

        let mut engine = headless_engine(100);
        let mut game = Quitter {
            camera: None,
            updates: 0,
        };
        engine.run(&mut game).expect("run should succeed");

        // Requested during frame 1's update, applied after frame 2's poll.
        assert_eq!(game.updates, 2);
    }

    #[test]
    fn cursor_grab_is_applied_after_poll() {
        let window = HeadlessWindow::new(640, 480).with_frame_limit(1);
        window.injector().send(press(KeyCode::Escape)).expect("channel open");

        let mut engine = EngineBuilder::new().build();
        engine.init_with_window(window).expect("headless init");

        let weak = engine.handle().downgrade();
        engine.handle().register_input_callback(
            InputEventType::keyboard(Key::Escape, KeyAction::Pressed),
            move |_| {
                if let Some(engine) = weak.upgrade() {
                    engine.request_cursor_grab(true);
                }
            },
        );

        let mut game = CountingGame::default();
        engine.run(&mut game).expect("run should succeed");

        let window = engine.window().expect("engine is initialized");
        assert!(window.is_cursor_grabbed());
    }

    //=====================================================================
    // Registry and Input Forwarding
    //=====================================================================

    #[test]
    fn body_registry_round_trip() {
        let engine = EngineBuilder::new().build();
        let handle = engine.handle();
        let body = shared(Body::default());

        handle.add_body(&body);
        handle.add_body(&body);
        assert!(handle.contains_body(&body));
        assert_eq!(handle.body_count(), 1);

        handle.remove_body(&body);
        handle.remove_body(&body);
        assert!(!handle.contains_body(&body));
        assert_eq!(handle.body_count(), 0);
    }

    #[test]
    fn remove_rigid_body_keeps_physics() {
        let engine = EngineBuilder::new().build();
        let handle = engine.handle();
        let ball = shared(RigidBody::new(Body::default(), 1.0));

        handle.add_rigid_body(&ball);
        assert!(handle.contains_rigid_body(&ball));
        assert!(handle.is_simulated(&ball));

        handle.remove_rigid_body(&ball);
        assert!(!handle.contains_rigid_body(&ball));
        assert!(handle.is_simulated(&ball), "Render removal leaves physics alone");

        handle.detach_rigid_body(&ball);
        assert!(!handle.is_simulated(&ball));
    }

    #[test]
    fn dropped_bodies_vanish() {
        let engine = EngineBuilder::new().build();
        let handle = engine.handle();

        let body = shared(Body::default());
        let ball = shared(RigidBody::new(Body::default(), 1.0));
        handle.add_body(&body);
        handle.add_rigid_body(&ball);
        drop(body);
        drop(ball);

        assert_eq!(handle.body_count(), 0);
    }

    #[test]
    fn input_callbacks_forward_to_dispatcher() {
        let engine = EngineBuilder::new().build();
        let handle = engine.handle();
        let event_type = InputEventType::keyboard(Key::Space, KeyAction::Pressed);
        let calls = Rc::new(Cell::new(0));

        let captured = Rc::clone(&calls);
        handle.register_input_callback(event_type, move |event| {
            assert_eq!(event.event_type, event_type);
            captured.set(captured.get() + 1);
        });
        assert!(handle.dispatcher().is_registered(event_type));

        handle
            .dispatcher()
            .raise(InputEvent::key(event_type.device, event_type.key, event_type.action));
        assert_eq!(calls.get(), 1);

        handle.unregister_input_callback(event_type);
        assert!(!handle.dispatcher().is_registered(event_type));
    }

    #[test]
    fn weak_handle_expires_with_engine() {
        let engine = EngineBuilder::new().build();
        let weak = engine.handle().downgrade();
        assert!(weak.upgrade().is_some());

        drop(engine);
        assert!(weak.upgrade().is_none());
    }
}
