//! The seam to the physics engine proper.
//!
//! The engine is an external library with a fixed API: compile a model from
//! the staged filesystem, advance or re-derive a state, inject a Cartesian
//! force. Everything this workspace does goes through this trait; no
//! implementation ships here.

use glam::DVec3;
use thiserror::Error;

use axis_formats::StagingFs;

use crate::model::Model;
use crate::state::State;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the staged model; its own message is preserved.
    #[error("failed to compile scene {root}: {message}")]
    Compile { root: String, message: String },
}

pub trait Engine {
    /// Compile the staged root document into model tables.
    fn load_model(&mut self, fs: &StagingFs, root: &str) -> Result<Model, EngineError>;

    /// Re-derive world-space buffers from `qpos` without advancing time.
    fn forward(&mut self, model: &Model, state: &mut State);

    /// Advance the simulation by one `model.timestep`.
    fn step(&mut self, model: &Model, state: &mut State);

    /// Apply a world-frame force and torque at `point` on `body` for the
    /// next step.
    fn apply_force(
        &mut self,
        model: &Model,
        state: &mut State,
        force: DVec3,
        torque: DVec3,
        point: DVec3,
        body: i32,
    );

    /// Reset the state to the model's reference pose.
    fn reset_data(&mut self, model: &Model, state: &mut State) {
        state.reset(model);
    }
}
