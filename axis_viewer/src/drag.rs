//! Pointer-driven rigid-body force injection (simulating mode).
//!
//! While a gesture is active the frame loop feeds a proportional corrective
//! force toward the pointer target into the solver, applied at the grabbed
//! point, every physics step.

use glam::DVec3;

use axis_engine::Model;

use crate::convert;
use crate::pick::{PickHit, Ray};
use crate::scene::BodyNode;

/// Spring gain between pointer target and grab point.
pub const DRAG_FORCE_GAIN: f64 = 250.0;

/// Transient per-gesture state shared by both drag controllers.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub body_id: i32,
    /// Pointer target distance along the ray, fixed at grab time.
    pub grab_distance: f64,
    /// Grab point in the grabbed body's local frame.
    pub local_hit: DVec3,
    /// Grab point in world space, re-derived as the body moves.
    pub world_hit: DVec3,
    /// Where the pointer ray currently puts the target.
    pub current_world: DVec3,
}

impl DragSession {
    /// Start a session from pick results: the nearest hit on a body with a
    /// positive id wins. Body 0 is the ground and is never draggable.
    pub fn from_pick(ray: &Ray, hits: &[PickHit], bodies: &[BodyNode]) -> Option<Self> {
        let hit = hits.iter().find(|hit| hit.body_id > 0)?;
        let body = bodies.get(hit.body_id as usize)?;
        let point = ray.point_at(hit.distance);
        Some(Self {
            body_id: hit.body_id,
            grab_distance: hit.distance,
            local_hit: body.world_to_local(point),
            world_hit: point,
            current_world: point,
        })
    }

    /// Reproject the target along the new ray at the fixed grab distance.
    pub fn move_along(&mut self, ray: &Ray) {
        self.current_world = ray.point_at(self.grab_distance);
    }

    /// Re-derive the world-space grab point from the body's current pose.
    pub fn refresh_world_hit(&mut self, bodies: &[BodyNode]) {
        if let Some(body) = bodies.get(self.body_id as usize) {
            self.world_hit = body.local_to_world(self.local_hit);
        }
    }
}

/// Corrective force and application point for the grabbed body, both in the
/// engine frame: `force = (target − grab) · mass · K`.
pub fn spring_force(model: &Model, session: &DragSession) -> (DVec3, DVec3) {
    let mass = model
        .body_mass
        .get(session.body_id as usize)
        .copied()
        .unwrap_or(0.0);
    let force = (session.current_world - session.world_hit) * mass * DRAG_FORCE_GAIN;
    (
        convert::force_to_engine(force),
        convert::pos_to_engine(session.world_hit),
    )
}

/// The physics drag controller: a gesture state machine the frame loop polls.
#[derive(Debug, Default)]
pub struct PhysicsDrag {
    enabled: bool,
    session: Option<DragSession>,
}

impl PhysicsDrag {
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

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
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

    pub fn move_to(&mut self, ray: &Ray) {
        if let Some(session) = self.session.as_mut() {
            session.move_along(ray);
        }
    }

    pub fn end(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    fn bodies() -> Vec<BodyNode> {
        (0..3)
            .map(|body_id| BodyNode {
                body_id,
                name: format!("b{body_id}"),
                has_custom_mesh: false,
                highlighted: false,
                position: DVec3::new(body_id as f64, 0.0, 0.0),
                rotation: DQuat::IDENTITY,
                geoms: Vec::new(),
            })
            .collect()
    }

    fn ray() -> Ray {
        Ray::new(DVec3::new(0.0, 5.0, 0.0), DVec3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn ground_body_is_never_grabbed() {
        let hits = vec![
            PickHit {
                body_id: 0,
                distance: 1.0,
            },
            PickHit {
                body_id: 2,
                distance: 4.0,
            },
        ];
        let session = DragSession::from_pick(&ray(), &hits, &bodies()).expect("session");
        assert_eq!(session.body_id, 2);
        assert_eq!(session.grab_distance, 4.0);
        assert_eq!(session.world_hit, DVec3::new(0.0, 1.0, 0.0));
        // Local hit is body-relative.
        assert_eq!(session.local_hit, DVec3::new(-2.0, 1.0, 0.0));
    }

    #[test]
    fn only_ground_hits_means_no_session() {
        let hits = vec![PickHit {
            body_id: 0,
            distance: 1.0,
        }];
        assert!(DragSession::from_pick(&ray(), &hits, &bodies()).is_none());
    }

    #[test]
    fn target_stays_at_grab_distance() {
        let hits = vec![PickHit {
            body_id: 1,
            distance: 2.0,
        }];
        let mut session = DragSession::from_pick(&ray(), &hits, &bodies()).expect("session");
        let moved = Ray::new(DVec3::new(1.0, 5.0, 0.0), DVec3::new(0.0, -1.0, 0.0));
        session.move_along(&moved);
        assert_eq!(session.current_world, DVec3::new(1.0, 3.0, 0.0));
        assert_eq!(session.grab_distance, 2.0);
    }

    #[test]
    fn spring_force_scales_by_mass_and_gain() {
        let model = Model {
            nbody: 2,
            body_mass: vec![0.0, 2.0],
            ..Model::default()
        };
        let session = DragSession {
            body_id: 1,
            grab_distance: 1.0,
            local_hit: DVec3::ZERO,
            world_hit: DVec3::new(0.0, 1.0, 0.0),
            current_world: DVec3::new(0.0, 1.0, 1.0),
        };
        let (force, point) = spring_force(&model, &session);
        // Render delta (0, 0, 1) → engine (0, -1, 0), times mass 2 × gain 250.
        assert_eq!(force, DVec3::new(0.0, -500.0, 0.0));
        assert_eq!(point, DVec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn disable_ends_an_active_gesture() {
        let mut drag = PhysicsDrag::default();
        drag.enable();
        let hits = vec![PickHit {
            body_id: 1,
            distance: 2.0,
        }];
        drag.start(&ray(), &hits, &bodies());
        assert!(drag.is_active());
        drag.disable();
        assert!(!drag.is_active());
        // Disabled controllers ignore new gestures.
        drag.start(&ray(), &hits, &bodies());
        assert!(!drag.is_active());
    }
}
