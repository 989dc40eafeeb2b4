//! Coordinate conversion between the engine's convention (z-up,
//! right-handed) and the renderer's (y-up). The single home for the swizzle:
//! every call site goes through these, in one direction or the other.

use glam::{DQuat, DVec3};

/// Engine position → render position: `(x, y, z) ↦ (x, z, -y)`.
pub fn pos_to_render(p: DVec3) -> DVec3 {
    DVec3::new(p.x, p.z, -p.y)
}

/// Render position → engine position: `(x, y, z) ↦ (x, -z, y)`.
pub fn pos_to_engine(p: DVec3) -> DVec3 {
    DVec3::new(p.x, -p.z, p.y)
}

/// Forces convert like positions.
pub fn force_to_engine(f: DVec3) -> DVec3 {
    pos_to_engine(f)
}

/// Engine quaternion (`[w, x, y, z]` order) → render quaternion.
pub fn quat_to_render(wxyz: [f64; 4]) -> DQuat {
    DQuat::from_xyzw(-wxyz[1], -wxyz[3], wxyz[2], -wxyz[0])
}

/// Read entry `index` of a stride-3 engine buffer, converted for rendering.
pub fn position_from(buffer: &[f64], index: usize) -> DVec3 {
    let base = index * 3;
    pos_to_render(DVec3::new(buffer[base], buffer[base + 1], buffer[base + 2]))
}

/// Read entry `index` of a stride-4 engine quaternion buffer, converted.
pub fn quat_from(buffer: &[f64], index: usize) -> DQuat {
    let base = index * 4;
    quat_to_render([
        buffer[base],
        buffer[base + 1],
        buffer[base + 2],
        buffer[base + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_conversion_round_trips() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(pos_to_engine(pos_to_render(v)), v);
        assert_eq!(pos_to_render(pos_to_engine(v)), v);
    }

    #[test]
    fn render_up_is_engine_z() {
        assert_eq!(pos_to_render(DVec3::Z), DVec3::Y);
        assert_eq!(pos_to_engine(DVec3::Y), DVec3::Z);
    }

    #[test]
    fn quaternion_conversion_preserves_norm() {
        let q = quat_to_render([0.5, 0.5, 0.5, 0.5]);
        assert!((q.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identity_quaternion_stays_a_rotation_identity() {
        // (-0, -0, 0, -1) is the same rotation as the identity.
        let q = quat_to_render([1.0, 0.0, 0.0, 0.0]);
        let v = DVec3::new(0.3, -0.7, 1.1);
        assert!((q * v - v).length() < 1e-12);
    }

    #[test]
    fn buffer_reads_apply_the_swizzle() {
        let xpos = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        assert_eq!(position_from(&xpos, 1), DVec3::new(1.0, 3.0, -2.0));
    }
}
