//! Flat, index-addressed mirror of the compiled physics model.
//!
//! The engine owns these tables; this struct records their layout contracts
//! (stride per field, `-1` as the null id) so the rest of the workspace can
//! read them without inventing an object graph the engine ABI does not have.

use glam::DVec3;

/// Geometry type tags as the engine declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomKind {
    Plane,
    HeightField,
    Sphere,
    Capsule,
    Ellipsoid,
    Cylinder,
    Box,
    Mesh,
    /// Any tag this build does not recognize; rendered as the default sphere.
    Unknown(i32),
}

impl GeomKind {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => GeomKind::Plane,
            1 => GeomKind::HeightField,
            2 => GeomKind::Sphere,
            3 => GeomKind::Capsule,
            4 => GeomKind::Ellipsoid,
            5 => GeomKind::Cylinder,
            6 => GeomKind::Box,
            7 => GeomKind::Mesh,
            other => GeomKind::Unknown(other),
        }
    }
}

/// Compiled model tables. Strides: `geom_size`/`geom_pos`/`jnt_axis` are 3
/// per entry, `geom_quat` 4, `geom_rgba`/`mat_rgba` 4, `jnt_range` 2,
/// `mesh_*` buffers addressed through the `mesh_*adr`/`mesh_*num` tables.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub ngeom: usize,
    pub nbody: usize,
    pub njnt: usize,
    pub nlight: usize,
    pub nmesh: usize,
    pub nq: usize,
    pub nv: usize,
    pub nu: usize,

    pub geom_type: Vec<i32>,
    pub geom_bodyid: Vec<i32>,
    pub geom_group: Vec<i32>,
    pub geom_matid: Vec<i32>,
    pub geom_dataid: Vec<i32>,
    pub geom_size: Vec<f64>,
    pub geom_pos: Vec<f64>,
    pub geom_quat: Vec<f64>,
    pub geom_rgba: Vec<f32>,

    pub body_parentid: Vec<i32>,
    pub body_mass: Vec<f64>,
    /// Offset of each body's null-terminated name in `names`.
    pub name_bodyadr: Vec<i32>,
    /// Packed null-terminated name buffer.
    pub names: Vec<u8>,

    pub jnt_type: Vec<i32>,
    pub jnt_bodyid: Vec<i32>,
    pub jnt_qposadr: Vec<i32>,
    pub jnt_axis: Vec<f64>,
    pub jnt_limited: Vec<u8>,
    pub jnt_range: Vec<f64>,

    pub light_directional: Vec<u8>,
    pub light_attenuation: Vec<f32>,

    pub mesh_vert: Vec<f32>,
    pub mesh_normal: Vec<f32>,
    pub mesh_texcoord: Vec<f32>,
    pub mesh_face: Vec<u32>,
    pub mesh_vertadr: Vec<i32>,
    pub mesh_vertnum: Vec<i32>,
    pub mesh_texcoordadr: Vec<i32>,
    pub mesh_faceadr: Vec<i32>,
    pub mesh_facenum: Vec<i32>,

    pub mat_rgba: Vec<f32>,
    pub mat_texid: Vec<i32>,
    pub mat_specular: Vec<f32>,
    pub mat_shininess: Vec<f32>,
    pub mat_reflectance: Vec<f32>,

    pub tex_width: Vec<i32>,
    pub tex_height: Vec<i32>,
    pub tex_adr: Vec<i32>,
    pub tex_rgb: Vec<u8>,

    /// Reference pose the state resets to.
    pub qpos0: Vec<f64>,
    /// Integration timestep in seconds.
    pub timestep: f64,
}

impl Model {
    pub fn geom_kind(&self, geom: usize) -> GeomKind {
        GeomKind::from_raw(self.geom_type[geom])
    }

    pub fn geom_size3(&self, geom: usize) -> [f64; 3] {
        let base = geom * 3;
        [
            self.geom_size[base],
            self.geom_size[base + 1],
            self.geom_size[base + 2],
        ]
    }

    pub fn geom_position(&self, geom: usize) -> DVec3 {
        let base = geom * 3;
        DVec3::new(
            self.geom_pos[base],
            self.geom_pos[base + 1],
            self.geom_pos[base + 2],
        )
    }

    /// Engine quaternion order: `[w, x, y, z]`.
    pub fn geom_quat4(&self, geom: usize) -> [f64; 4] {
        let base = geom * 4;
        [
            self.geom_quat[base],
            self.geom_quat[base + 1],
            self.geom_quat[base + 2],
            self.geom_quat[base + 3],
        ]
    }

    pub fn geom_rgba4(&self, geom: usize) -> [f32; 4] {
        let base = geom * 4;
        [
            self.geom_rgba[base],
            self.geom_rgba[base + 1],
            self.geom_rgba[base + 2],
            self.geom_rgba[base + 3],
        ]
    }

    pub fn mat_rgba4(&self, mat: usize) -> [f32; 4] {
        let base = mat * 4;
        [
            self.mat_rgba[base],
            self.mat_rgba[base + 1],
            self.mat_rgba[base + 2],
            self.mat_rgba[base + 3],
        ]
    }

    pub fn jnt_axis3(&self, joint: usize) -> DVec3 {
        let base = joint * 3;
        DVec3::new(
            self.jnt_axis[base],
            self.jnt_axis[base + 1],
            self.jnt_axis[base + 2],
        )
    }

    pub fn jnt_range2(&self, joint: usize) -> (f64, f64) {
        let base = joint * 2;
        (self.jnt_range[base], self.jnt_range[base + 1])
    }

    /// Decode a body's null-terminated name from the packed name buffer.
    /// Bodies the compiler left nameless decode to an empty string.
    pub fn body_name(&self, body: usize) -> String {
        let Some(&adr) = self.name_bodyadr.get(body) else {
            return String::new();
        };
        if adr < 0 {
            return String::new();
        }
        let start = adr as usize;
        if start >= self.names.len() {
            return String::new();
        }
        let end = self.names[start..]
            .iter()
            .position(|&byte| byte == 0)
            .map(|offset| start + offset)
            .unwrap_or(self.names.len());
        String::from_utf8_lossy(&self.names[start..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geom_kind_covers_the_engine_tags() {
        assert_eq!(GeomKind::from_raw(0), GeomKind::Plane);
        assert_eq!(GeomKind::from_raw(7), GeomKind::Mesh);
        assert_eq!(GeomKind::from_raw(42), GeomKind::Unknown(42));
    }

    #[test]
    fn decodes_packed_body_names() {
        let model = Model {
            nbody: 3,
            name_bodyadr: vec![0, 6, 11],
            names: b"world\0base\0arm\0".to_vec(),
            ..Model::default()
        };
        assert_eq!(model.body_name(0), "world");
        assert_eq!(model.body_name(1), "base");
        assert_eq!(model.body_name(2), "arm");
    }

    #[test]
    fn nameless_body_decodes_empty() {
        let model = Model {
            nbody: 1,
            name_bodyadr: vec![-1],
            names: b"\0".to_vec(),
            ..Model::default()
        };
        assert_eq!(model.body_name(0), "");
        assert_eq!(model.body_name(9), "");
    }
}
