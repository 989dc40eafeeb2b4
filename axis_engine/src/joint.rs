//! Joint lookup and limit handling for interactive manipulation.

use glam::DVec3;

use crate::model::Model;

/// Joint type tags as the engine declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointType {
    Free,
    Ball,
    Slide,
    Hinge,
    Unknown(i32),
}

impl JointType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => JointType::Free,
            1 => JointType::Ball,
            2 => JointType::Slide,
            3 => JointType::Hinge,
            other => JointType::Unknown(other),
        }
    }
}

/// Snapshot of the joint influencing a picked body. Derived on demand from
/// the model tables, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct JointInfo {
    pub joint_id: usize,
    /// The body the joint actually belongs to (the picked body or the
    /// nearest jointed ancestor).
    pub body_id: i32,
    pub qpos_addr: usize,
    pub joint_type: JointType,
    /// World-frame joint axis, straight from the model table.
    pub axis: DVec3,
}

fn joint_on_body(model: &Model, body: i32) -> Option<JointInfo> {
    (0..model.njnt)
        .find(|&joint| model.jnt_bodyid[joint] == body)
        .map(|joint| JointInfo {
            joint_id: joint,
            body_id: body,
            qpos_addr: model.jnt_qposadr[joint].max(0) as usize,
            joint_type: JointType::from_raw(model.jnt_type[joint]),
            axis: model.jnt_axis3(joint),
        })
}

/// Find the joint influencing `body`: the body's own joint if it has one,
/// else the first joint found walking the parent chain toward the root.
/// Body 0 is the world; reaching it without a match yields `None`.
pub fn find_body_joint(model: &Model, body: i32) -> Option<JointInfo> {
    if body < 0 {
        return None;
    }
    if let Some(info) = joint_on_body(model, body) {
        return Some(info);
    }
    let mut parent = body;
    while parent > 0 {
        parent = model.body_parentid.get(parent as usize).copied()?;
        if let Some(info) = joint_on_body(model, parent) {
            return Some(info);
        }
    }
    None
}

/// Hinge joints without declared limits stay within a full turn either way.
pub const DEFAULT_HINGE_RANGE: f64 = 2.0 * std::f64::consts::PI;
/// Slide joints without declared limits stay within ±2 length units.
pub const DEFAULT_SLIDE_RANGE: f64 = 2.0;

/// Clamp a candidate qpos value for `joint`: declared limits win; otherwise
/// the per-type safety range applies (ball and free joints are unclamped).
pub fn clamp_qpos(model: &Model, joint: &JointInfo, value: f64) -> f64 {
    if model
        .jnt_limited
        .get(joint.joint_id)
        .is_some_and(|&limited| limited != 0)
    {
        let (lo, hi) = joint.declared_range(model);
        return value.clamp(lo, hi);
    }
    match joint.joint_type {
        JointType::Hinge => value.clamp(-DEFAULT_HINGE_RANGE, DEFAULT_HINGE_RANGE),
        JointType::Slide => value.clamp(-DEFAULT_SLIDE_RANGE, DEFAULT_SLIDE_RANGE),
        _ => value,
    }
}

impl JointInfo {
    fn declared_range(&self, model: &Model) -> (f64, f64) {
        if self.joint_id * 2 + 1 < model.jnt_range.len() {
            model.jnt_range2(self.joint_id)
        } else {
            (-std::f64::consts::PI, std::f64::consts::PI)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// world → base (hinge) → arm → wrist, with `arm` and `wrist` jointless.
    fn chain_model() -> Model {
        Model {
            nbody: 4,
            njnt: 1,
            nq: 1,
            body_parentid: vec![0, 0, 1, 2],
            jnt_type: vec![3],
            jnt_bodyid: vec![1],
            jnt_qposadr: vec![0],
            jnt_axis: vec![0.0, 0.0, 1.0],
            jnt_limited: vec![0],
            jnt_range: vec![0.0, 0.0],
            ..Model::default()
        }
    }

    #[test]
    fn finds_direct_joint() {
        let model = chain_model();
        let info = find_body_joint(&model, 1).expect("joint");
        assert_eq!(info.joint_id, 0);
        assert_eq!(info.body_id, 1);
        assert_eq!(info.joint_type, JointType::Hinge);
        assert_eq!(info.axis, DVec3::Z);
    }

    #[test]
    fn walks_ancestors_to_the_nearest_jointed_body() {
        let model = chain_model();
        let info = find_body_joint(&model, 3).expect("joint");
        assert_eq!(info.body_id, 1);
    }

    #[test]
    fn world_body_has_no_joint() {
        let model = chain_model();
        assert!(find_body_joint(&model, 0).is_none());
        assert!(find_body_joint(&model, -1).is_none());
    }

    #[test]
    fn declared_limits_clamp() {
        let mut model = chain_model();
        model.jnt_limited = vec![1];
        model.jnt_range = vec![-0.5, 1.25];
        let info = find_body_joint(&model, 1).expect("joint");
        assert_eq!(clamp_qpos(&model, &info, 2.0), 1.25);
        assert_eq!(clamp_qpos(&model, &info, -3.0), -0.5);
        assert_eq!(clamp_qpos(&model, &info, 0.3), 0.3);
    }

    #[test]
    fn unlimited_hinge_uses_safety_range() {
        let model = chain_model();
        let info = find_body_joint(&model, 1).expect("joint");
        assert_eq!(clamp_qpos(&model, &info, 100.0), DEFAULT_HINGE_RANGE);
        assert_eq!(clamp_qpos(&model, &info, -100.0), -DEFAULT_HINGE_RANGE);
    }

    #[test]
    fn unlimited_slide_uses_safety_range() {
        let mut model = chain_model();
        model.jnt_type = vec![2];
        let info = find_body_joint(&model, 1).expect("joint");
        assert_eq!(clamp_qpos(&model, &info, 5.0), DEFAULT_SLIDE_RANGE);
        assert_eq!(clamp_qpos(&model, &info, -5.0), -DEFAULT_SLIDE_RANGE);
    }

    #[test]
    fn ball_joint_is_unclamped_by_default() {
        let mut model = chain_model();
        model.jnt_type = vec![1];
        let info = find_body_joint(&model, 1).expect("joint");
        assert_eq!(clamp_qpos(&model, &info, 9.0), 9.0);
    }
}
