//! Engine-owned mutable simulation buffers.
//!
//! Like the model tables these are flat vectors addressed by documented
//! strides: `qpos` by `jnt_qposadr`, `xpos` 3 per body, `xquat` 4 per body
//! (`[w, x, y, z]`), light buffers 3 per light.

use crate::model::Model;

#[derive(Debug, Clone, Default)]
pub struct State {
    pub qpos: Vec<f64>,
    pub ctrl: Vec<f64>,
    pub qfrc_applied: Vec<f64>,
    pub xpos: Vec<f64>,
    pub xquat: Vec<f64>,
    pub light_xpos: Vec<f64>,
    pub light_xdir: Vec<f64>,
    /// Simulated time in seconds.
    pub time: f64,
}

impl State {
    /// Allocate buffers sized for `model`, starting at the reference pose.
    pub fn new(model: &Model) -> Self {
        let mut xquat = vec![0.0; model.nbody * 4];
        for body in 0..model.nbody {
            xquat[body * 4] = 1.0;
        }
        Self {
            qpos: model.qpos0.clone(),
            ctrl: vec![0.0; model.nu],
            qfrc_applied: vec![0.0; model.nv],
            xpos: vec![0.0; model.nbody * 3],
            xquat,
            light_xpos: vec![0.0; model.nlight * 3],
            light_xdir: vec![0.0; model.nlight * 3],
            time: 0.0,
        }
    }

    /// Reset to the model's reference pose. World-space buffers are left for
    /// the next forward-kinematics pass to recompute.
    pub fn reset(&mut self, model: &Model) {
        self.qpos.clear();
        self.qpos.extend_from_slice(&model.qpos0);
        self.ctrl.iter_mut().for_each(|value| *value = 0.0);
        self.qfrc_applied.iter_mut().for_each(|value| *value = 0.0);
        self.time = 0.0;
    }

    pub fn clear_applied_forces(&mut self) {
        self.qfrc_applied.iter_mut().for_each(|value| *value = 0.0);
    }

    pub fn body_position(&self, body: usize) -> [f64; 3] {
        let base = body * 3;
        [self.xpos[base], self.xpos[base + 1], self.xpos[base + 2]]
    }

    /// Engine quaternion order: `[w, x, y, z]`.
    pub fn body_quat(&self, body: usize) -> [f64; 4] {
        let base = body * 4;
        [
            self.xquat[base],
            self.xquat[base + 1],
            self.xquat[base + 2],
            self.xquat[base + 3],
        ]
    }

    pub fn light_position(&self, light: usize) -> [f64; 3] {
        let base = light * 3;
        [
            self.light_xpos[base],
            self.light_xpos[base + 1],
            self.light_xpos[base + 2],
        ]
    }

    pub fn light_direction(&self, light: usize) -> [f64; 3] {
        let base = light * 3;
        [
            self.light_xdir[base],
            self.light_xdir[base + 1],
            self.light_xdir[base + 2],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_body_model() -> Model {
        Model {
            nbody: 2,
            nq: 2,
            nv: 2,
            nu: 1,
            qpos0: vec![0.25, -0.5],
            ..Model::default()
        }
    }

    #[test]
    fn allocates_from_model_counts() {
        let model = two_body_model();
        let state = State::new(&model);
        assert_eq!(state.qpos, vec![0.25, -0.5]);
        assert_eq!(state.xpos.len(), 6);
        assert_eq!(state.xquat.len(), 8);
        // Identity orientation until the first forward pass.
        assert_eq!(state.body_quat(1), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn reset_restores_reference_pose() {
        let model = two_body_model();
        let mut state = State::new(&model);
        state.qpos[0] = 3.0;
        state.ctrl[0] = 0.7;
        state.qfrc_applied[1] = 9.0;
        state.time = 4.2;
        state.reset(&model);
        assert_eq!(state.qpos, vec![0.25, -0.5]);
        assert_eq!(state.ctrl, vec![0.0]);
        assert_eq!(state.qfrc_applied, vec![0.0, 0.0]);
        assert_eq!(state.time, 0.0);
    }
}
