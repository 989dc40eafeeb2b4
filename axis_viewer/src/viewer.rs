//! The viewer surface: owns the staging area, the live scene triple, the
//! drag controllers, and the interaction mode, and answers host requests.
//!
//! Every inbound request runs inside a failure boundary: errors are
//! stringified into an `ERROR` notification instead of crossing the
//! embedding boundary.

use std::sync::Arc;

use anyhow::Context;
use glam::DVec3;
use log::warn;
use rand::SeedableRng;
use rand::rngs::StdRng;

use axis_bridge::{FilePayload, HostRequest, InlineXmlPayload, ThemePayload, ViewerEvent};
use axis_engine::{Engine, Model, State};
use axis_formats::{InlineXml, SceneDescriptor, SceneFile, StagingFs, stage};

use crate::drag::{self, PhysicsDrag};
use crate::joint_drag::{self, JointDrag};
use crate::mode::InteractionMode;
use crate::noise::CtrlNoise;
use crate::pick::{Ray, RayCaster};
use crate::scene::{self, BuiltScene};
use crate::theme::Theme;

/// If the frame clock falls further behind than this, resync instead of
/// stepping to catch up.
pub const RESYNC_THRESHOLD_MS: f64 = 35.0;

/// The one live model/state/scene triple. Replaced wholesale on load; the
/// previous triple is dropped before the next one is compiled.
#[derive(Debug)]
pub struct LoadedScene {
    pub model: Arc<Model>,
    pub state: State,
    pub scene: BuiltScene,
    pub root_name: String,
}

pub struct Viewer {
    engine: Box<dyn Engine>,
    staging: StagingFs,
    scene: Option<LoadedScene>,
    mode: InteractionMode,
    physics_drag: PhysicsDrag,
    joint_drag: JointDrag,
    theme: Theme,
    hovered_body: Option<i32>,
    ctrl_noise: CtrlNoise,
    /// Simulation clock in milliseconds of host frame time.
    sim_time_ms: f64,
    rng: StdRng,
}

impl Viewer {
    pub fn new(engine: Box<dyn Engine>) -> Self {
        let mut viewer = Self {
            engine,
            staging: StagingFs::new(),
            scene: None,
            mode: InteractionMode::Paused,
            physics_drag: PhysicsDrag::default(),
            joint_drag: JointDrag::default(),
            theme: Theme::default(),
            hovered_body: None,
            ctrl_noise: CtrlNoise::default(),
            sim_time_ms: 0.0,
            rng: StdRng::from_entropy(),
        };
        viewer.update_drag_mode();
        viewer
    }

    /// The readiness notification the host waits for before sending loads.
    pub fn ready_event() -> ViewerEvent {
        ViewerEvent::IframeReady
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn scene(&self) -> Option<&LoadedScene> {
        self.scene.as_ref()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn staging(&self) -> &StagingFs {
        &self.staging
    }

    pub fn physics_drag(&self) -> &PhysicsDrag {
        &self.physics_drag
    }

    pub fn joint_drag(&self) -> &JointDrag {
        &self.joint_drag
    }

    pub fn ctrl_noise_mut(&mut self) -> &mut CtrlNoise {
        &mut self.ctrl_noise
    }

    /// Handle one host request. Failures become `ERROR` events; nothing
    /// propagates past this boundary.
    pub fn handle_request(&mut self, request: HostRequest, events: &mut Vec<ViewerEvent>) {
        if let Err(err) = self.dispatch(request, events) {
            warn!("request failed: {err:#}");
            events.push(axis_bridge::error_event(&format!("{err:#}")));
        }
    }

    fn dispatch(
        &mut self,
        request: HostRequest,
        events: &mut Vec<ViewerEvent>,
    ) -> anyhow::Result<()> {
        match request {
            HostRequest::LoadScene { root, files, xml } => {
                let scene_name = self.load_scene(root, files, xml)?;
                events.push(ViewerEvent::SceneLoaded { scene_name });
            }
            HostRequest::ResetPose => {
                if let Some(loaded) = self.scene.as_mut() {
                    self.engine.reset_data(&loaded.model, &mut loaded.state);
                    self.engine.forward(&loaded.model, &mut loaded.state);
                }
            }
            HostRequest::PauseSimulation => self.set_mode(InteractionMode::Paused),
            HostRequest::ResumeSimulation => self.set_mode(InteractionMode::Simulating),
            HostRequest::SetTheme { theme } => self.set_theme(&theme),
            HostRequest::Unknown => warn!("ignoring unknown message type"),
        }
        Ok(())
    }

    fn load_scene(
        &mut self,
        root: Option<String>,
        files: Vec<FilePayload>,
        xml: Option<InlineXmlPayload>,
    ) -> anyhow::Result<String> {
        // Release the previous triple before compiling its replacement, and
        // drop anything that still points into it.
        self.scene = None;
        self.physics_drag.end();
        self.joint_drag.end();
        self.hovered_body = None;
        self.staging.clear();

        let descriptor = SceneDescriptor {
            root,
            files: files
                .into_iter()
                .map(|file| SceneFile {
                    path: file.path,
                    bytes: file.buffer,
                })
                .collect(),
            xml: xml.map(|inline| InlineXml {
                file_name: inline.file_name,
                content: inline.content,
            }),
        };

        let root_path = stage(&descriptor, &mut self.staging).context("staging scene")?;
        let model = Arc::new(self.engine.load_model(&self.staging, &root_path)?);
        let mut state = State::new(&model);
        let scene = scene::build(&model);
        self.engine.reset_data(&model, &mut state);
        self.engine.forward(&model, &mut state);

        self.scene = Some(LoadedScene {
            model,
            state,
            scene,
            root_name: root_path.clone(),
        });
        // A fresh scene always starts paused.
        self.set_mode(InteractionMode::Paused);
        Ok(root_path)
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.update_drag_mode();
    }

    /// Exactly one controller is enabled: joint drags while paused, physics
    /// drags while simulating.
    fn update_drag_mode(&mut self) {
        match self.mode {
            InteractionMode::Paused => {
                self.physics_drag.disable();
                self.joint_drag.enable();
            }
            InteractionMode::Simulating => {
                self.joint_drag.disable();
                self.physics_drag.enable();
            }
        }
    }

    fn set_theme(&mut self, update: &ThemePayload) {
        self.theme.merge(update);
    }

    pub fn pointer_down(&mut self, ray: &Ray, caster: &dyn RayCaster) {
        let Some(loaded) = self.scene.as_ref() else {
            return;
        };
        let hits = caster.intersect(ray);
        match self.mode {
            InteractionMode::Paused => {
                self.joint_drag.start(ray, &hits, &loaded.scene.bodies);
            }
            InteractionMode::Simulating => {
                self.physics_drag.start(ray, &hits, &loaded.scene.bodies);
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        ray: &Ray,
        caster: &dyn RayCaster,
        events: &mut Vec<ViewerEvent>,
    ) {
        self.update_hover(ray, caster, events);

        let Self {
            engine,
            scene,
            physics_drag,
            joint_drag,
            ..
        } = self;
        let Some(loaded) = scene.as_mut() else {
            return;
        };

        physics_drag.move_to(ray);

        if let Some(session) = joint_drag.session_mut() {
            session.move_along(ray);
            session.refresh_world_hit(&loaded.scene.bodies);
            joint_drag::apply_drag(&loaded.model, &mut loaded.state, engine.as_mut(), session);
        }
    }

    pub fn pointer_up(&mut self) {
        self.physics_drag.end();
        self.joint_drag.end();
    }

    pub fn pointer_leave(&mut self, events: &mut Vec<ViewerEvent>) {
        self.clear_hover(events);
    }

    fn update_hover(&mut self, ray: &Ray, caster: &dyn RayCaster, events: &mut Vec<ViewerEvent>) {
        let new_hover: Option<(i32, String)> = self.scene.as_ref().and_then(|loaded| {
            caster.intersect(ray).into_iter().find_map(|hit| {
                if hit.body_id <= 0 {
                    return None;
                }
                loaded
                    .scene
                    .body(hit.body_id)
                    .filter(|node| !node.name.is_empty())
                    .map(|node| (node.body_id, node.name.clone()))
            })
        });

        if new_hover.as_ref().map(|(id, _)| *id) == self.hovered_body {
            return;
        }
        self.clear_hover(events);
        if let Some((body_id, body_name)) = new_hover {
            self.hovered_body = Some(body_id);
            if let Some(node) = self
                .scene
                .as_mut()
                .and_then(|loaded| loaded.scene.body_mut(body_id))
            {
                node.highlighted = true;
            }
            events.push(ViewerEvent::BodyMouseover { body_name });
        }
    }

    fn clear_hover(&mut self, events: &mut Vec<ViewerEvent>) {
        if let Some(previous) = self.hovered_body.take() {
            if let Some(node) = self
                .scene
                .as_mut()
                .and_then(|loaded| loaded.scene.body_mut(previous))
            {
                node.highlighted = false;
                events.push(ViewerEvent::BodyMouseout {
                    body_name: node.name.clone(),
                });
            }
        }
    }

    /// One display-refresh callback: advance or re-derive the simulation,
    /// then copy transforms into the render graph. With no compiled model
    /// this renders a background-only frame.
    pub fn render(&mut self, time_ms: f64) {
        let Self {
            engine,
            scene,
            mode,
            physics_drag,
            joint_drag,
            ctrl_noise,
            sim_time_ms,
            rng,
            ..
        } = self;
        let Some(loaded) = scene.as_mut() else {
            return;
        };
        let LoadedScene {
            model,
            state,
            scene: render_scene,
            ..
        } = loaded;

        match *mode {
            InteractionMode::Simulating => {
                let step_ms = model.timestep * 1000.0;
                // A clock too far behind resyncs rather than catching up;
                // a non-positive timestep cannot advance it at all.
                if time_ms - *sim_time_ms > RESYNC_THRESHOLD_MS || step_ms <= 0.0 {
                    *sim_time_ms = time_ms;
                }
                while *sim_time_ms < time_ms {
                    if ctrl_noise.is_enabled() {
                        ctrl_noise.apply(model.timestep, &mut state.ctrl, rng);
                    }
                    state.clear_applied_forces();
                    if let Some(session) = physics_drag.session_mut() {
                        render_scene.sync_transforms(model, state);
                        session.refresh_world_hit(&render_scene.bodies);
                        let (force, point) = drag::spring_force(model, session);
                        engine.apply_force(
                            model,
                            state,
                            force,
                            DVec3::ZERO,
                            point,
                            session.body_id,
                        );
                    }
                    engine.step(model, state);
                    *sim_time_ms += step_ms;
                }
            }
            InteractionMode::Paused => {
                // An in-progress joint drag owns the pose; a stale recompute
                // here would fight the direct qpos writes.
                if !joint_drag.is_active() {
                    engine.forward(model, state);
                }
            }
        }

        render_scene.sync_transforms(model, state);
    }
}
