//! Pointer-driven kinematic joint manipulation (paused mode).
//!
//! Reprojects pointer motion into a per-joint-type qpos delta, damps and
//! clamps it, writes it into the state vector, then forward-recomputes
//! dependent poses without advancing simulated time.

use glam::DVec3;
use log::debug;

use axis_engine::{Engine, JointType, Model, State, clamp_qpos, find_body_joint};

use crate::convert;
use crate::drag::DragSession;
use crate::pick::{PickHit, Ray};
use crate::scene::BodyNode;

/// Angular sensitivity for hinge and ball joints.
pub const ROTATIONAL_SENSITIVITY: f64 = 0.75;
/// Linear sensitivity for slide joints.
pub const LINEAR_SENSITIVITY: f64 = 0.03;
/// Fraction of the computed change applied per pointer move.
pub const DAMPING: f64 = 0.4;
/// In-plane vectors shorter than this yield no angle.
const MIN_PLANAR_LENGTH: f64 = 1e-3;

/// Signed, sensitivity-scaled rotation angle about `axis` between two drag
/// points projected onto the plane through `pivot` perpendicular to the axis.
pub fn revolute_delta(axis: DVec3, pivot: DVec3, start: DVec3, end: DVec3) -> f64 {
    let normal = axis.normalize_or_zero();
    if normal == DVec3::ZERO {
        return 0.0;
    }
    let project = |point: DVec3| {
        let offset = point - pivot;
        offset - normal * offset.dot(normal)
    };
    let from = project(start);
    let to = project(end);
    if from.length() < MIN_PLANAR_LENGTH || to.length() < MIN_PLANAR_LENGTH {
        return 0.0;
    }
    let winding = from.cross(to).dot(axis);
    let direction = if winding > 0.0 {
        1.0
    } else if winding < 0.0 {
        -1.0
    } else {
        0.0
    };
    direction * from.angle_between(to) * ROTATIONAL_SENSITIVITY
}

/// Sensitivity-scaled translation of the drag vector along `axis`.
pub fn prismatic_delta(axis: DVec3, start: DVec3, end: DVec3) -> f64 {
    (end - start).dot(axis.normalize_or_zero()) * LINEAR_SENSITIVITY
}

/// Apply one pointer move to the joint influencing the dragged body.
///
/// Returns `false` when nothing was written — no joint reaches the body, or
/// the joint type has no drag mapping. That is the common case for most
/// bodies and is not an error.
pub fn apply_drag(
    model: &Model,
    state: &mut State,
    engine: &mut dyn Engine,
    session: &DragSession,
) -> bool {
    let Some(joint) = find_body_joint(model, session.body_id) else {
        debug!("no joint influences body {}", session.body_id);
        return false;
    };
    let Some(&current) = state.qpos.get(joint.qpos_addr) else {
        return false;
    };

    // Pivot: the jointed body's world position, in render coordinates. The
    // axis stays in the engine frame, straight from the joint table.
    let body_index = joint.body_id.max(0) as usize;
    let pivot = if (body_index + 1) * 3 <= state.xpos.len() {
        convert::position_from(&state.xpos, body_index)
    } else {
        session.world_hit
    };

    let delta = match joint.joint_type {
        JointType::Hinge | JointType::Ball => {
            revolute_delta(joint.axis, pivot, session.world_hit, session.current_world)
        }
        JointType::Slide => {
            prismatic_delta(joint.axis, session.world_hit, session.current_world)
        }
        JointType::Free | JointType::Unknown(_) => return false,
    };

    let target = current + delta;
    // The applied change is the negated damped delta; the drag tests pin the
    // resulting sign.
    let change = -((target - current) * DAMPING);
    state.qpos[joint.qpos_addr] = clamp_qpos(model, &joint, current + change);
    engine.forward(model, state);
    true
}

/// The joint drag controller: gesture state machine for paused mode.
#[derive(Debug, Default)]
pub struct JointDrag {
    enabled: bool,
    session: Option<DragSession>,
}

impl JointDrag {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disabling mid-gesture ends the gesture.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.session = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        self.session.as_mut()
    }

    pub fn start(&mut self, ray: &Ray, hits: &[PickHit], bodies: &[BodyNode]) {
        if !self.enabled {
            return;
        }
        self.session = DragSession::from_pick(ray, hits, bodies);
    }

    pub fn end(&mut self) {
        self.session = None;
    }
}
