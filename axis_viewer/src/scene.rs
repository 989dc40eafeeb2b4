//! Derive a renderable scene graph from compiled model tables.
//!
//! One node per body, one mesh per visible geometry, one light per declared
//! light. Body nodes sit directly under the scene root: transforms are
//! refreshed in world space every frame, so nesting per physics parent would
//! double-apply them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::{DQuat, DVec3};
use log::debug;

use axis_engine::{GeomKind, Model, State};

use crate::convert;

/// Geometry visualization groups below this render; the rest are hidden.
pub const VISIBLE_GROUP_LIMIT: i32 = 3;
/// Ground planes render as large fixed squares.
pub const PLANE_EXTENT: f64 = 200.0;
/// Planes are always tinted this accent color, whatever the model declares.
pub const PLANE_ACCENT_RGB: [f32; 3] = [0.0, 0.0, 0.5];
/// Texture id 2 tiles; everything else maps once.
const TILED_TEXTURE_ID: i32 = 2;
const TILED_REPEAT: [f32; 2] = [50.0, 50.0];

/// Shape primitive for one geometry, in render-axis conventions.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere { radius: f64 },
    /// Lies in the ground plane.
    Plane { extent: f64 },
    Capsule { radius: f64, length: f64 },
    Ellipsoid { radii: DVec3 },
    Cylinder { radius: f64, length: f64 },
    Box { extents: DVec3 },
    Mesh { mesh_id: usize },
}

/// Decoded texture image, RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub tex_id: i32,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub repeat: [u32; 2],
}

/// Material description for one geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub texture: Option<Arc<Texture>>,
    pub specular_intensity: Option<f32>,
    pub reflectivity: Option<f32>,
    pub roughness: Option<f32>,
    pub metalness: Option<f32>,
}

/// Decoded mesh buffers, vertex components already in render-axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

/// One renderable geometry under a body node.
#[derive(Debug, Clone, PartialEq)]
pub struct GeomNode {
    pub geom_id: usize,
    pub body_id: i32,
    pub shape: Shape,
    pub material: Material,
    pub position: DVec3,
    pub rotation: DQuat,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// One node per body index; transforms are world-space, refreshed per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyNode {
    pub body_id: i32,
    pub name: String,
    pub has_custom_mesh: bool,
    pub highlighted: bool,
    pub position: DVec3,
    pub rotation: DQuat,
    pub geoms: Vec<GeomNode>,
}

impl BodyNode {
    fn new(model: &Model, body_id: i32) -> Self {
        Self {
            body_id,
            name: model.body_name(body_id.max(0) as usize),
            has_custom_mesh: false,
            highlighted: false,
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            geoms: Vec::new(),
        }
    }

    pub fn world_to_local(&self, point: DVec3) -> DVec3 {
        self.rotation.inverse() * (point - self.position)
    }

    pub fn local_to_world(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.position
    }
}

/// One render light per declared model light.
#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    /// `None` for the synthetic fallback light.
    pub light_id: Option<usize>,
    pub directional: bool,
    pub decay: f32,
    pub cast_shadow: bool,
    /// `Some(0)` when attached to the world body node, `None` for the root.
    pub attached_to_body: Option<i32>,
    pub position: DVec3,
    pub target: DVec3,
}

/// The derived render graph.
#[derive(Debug, Clone, Default)]
pub struct BuiltScene {
    /// Indexed by body id; covers every body index `0..nbody`.
    pub bodies: Vec<BodyNode>,
    pub lights: Vec<LightNode>,
    /// Present exactly when the model declares no lights.
    pub fallback_light: Option<LightNode>,
    pub meshes: HashMap<usize, Arc<MeshBuffers>>,
}

impl BuiltScene {
    pub fn body(&self, body_id: i32) -> Option<&BodyNode> {
        usize::try_from(body_id)
            .ok()
            .and_then(|index| self.bodies.get(index))
    }

    pub fn body_mut(&mut self, body_id: i32) -> Option<&mut BodyNode> {
        usize::try_from(body_id)
            .ok()
            .and_then(|index| self.bodies.get_mut(index))
    }

    /// Copy current body and light transforms out of the engine state,
    /// converting to render conventions.
    pub fn sync_transforms(&mut self, model: &Model, state: &State) {
        for body in 0..model.nbody {
            if let Some(node) = self.bodies.get_mut(body) {
                node.position = convert::position_from(&state.xpos, body);
                node.rotation = convert::quat_from(&state.xquat, body);
            }
        }
        for light in 0..model.nlight {
            if let Some(node) = self.lights.get_mut(light) {
                let position = convert::position_from(&state.light_xpos, light);
                let direction = convert::position_from(&state.light_xdir, light);
                node.position = position;
                node.target = position + direction;
            }
        }
    }
}

/// Build the render graph for a compiled model.
pub fn build(model: &Model) -> BuiltScene {
    let mut bodies: BTreeMap<i32, BodyNode> = BTreeMap::new();
    let mut meshes: HashMap<usize, Arc<MeshBuffers>> = HashMap::new();
    let mut textures: HashMap<i32, Arc<Texture>> = HashMap::new();
    let mut previous_material: Option<Material> = None;

    for geom in 0..model.ngeom {
        if model.geom_group[geom] >= VISIBLE_GROUP_LIMIT {
            continue;
        }
        let body_id = model.geom_bodyid[geom];
        let kind = model.geom_kind(geom);
        let size = model.geom_size3(geom);

        let node = bodies
            .entry(body_id)
            .or_insert_with(|| BodyNode::new(model, body_id));

        let shape = match kind {
            GeomKind::Plane => Shape::Plane {
                extent: PLANE_EXTENT,
            },
            GeomKind::Sphere => Shape::Sphere { radius: size[0] },
            GeomKind::Capsule => Shape::Capsule {
                radius: size[0],
                length: size[1] * 2.0,
            },
            GeomKind::Ellipsoid => Shape::Ellipsoid {
                radii: DVec3::new(size[0], size[2], size[1]),
            },
            GeomKind::Cylinder => Shape::Cylinder {
                radius: size[0],
                length: size[1] * 2.0,
            },
            GeomKind::Box => Shape::Box {
                extents: DVec3::new(size[0] * 2.0, size[2] * 2.0, size[1] * 2.0),
            },
            GeomKind::Mesh if model.geom_dataid[geom] >= 0 => {
                let mesh_id = model.geom_dataid[geom] as usize;
                meshes
                    .entry(mesh_id)
                    .or_insert_with(|| Arc::new(decode_mesh(model, mesh_id)));
                node.has_custom_mesh = true;
                Shape::Mesh { mesh_id }
            }
            // Height fields and unrecognized tags fall back to the default
            // half-size sphere.
            _ => Shape::Sphere {
                radius: size[0] * 0.5,
            },
        };

        let material = build_material(model, geom, kind, &mut textures, &mut previous_material);

        // Planes bake their orientation into the primitive.
        let rotation = if kind == GeomKind::Plane {
            DQuat::IDENTITY
        } else {
            convert::quat_to_render(model.geom_quat4(geom))
        };

        node.geoms.push(GeomNode {
            geom_id: geom,
            body_id,
            shape,
            material,
            position: convert::pos_to_render(model.geom_position(geom)),
            rotation,
            cast_shadow: geom != 0,
            receive_shadow: kind != GeomKind::Mesh,
        });
    }

    // Lights attach to the world body node when the geometry pass created
    // one, else to the scene root.
    let world_node_exists = bodies.contains_key(&0);
    let mut lights = Vec::with_capacity(model.nlight);
    for light in 0..model.nlight {
        lights.push(LightNode {
            light_id: Some(light),
            directional: model
                .light_directional
                .get(light)
                .is_some_and(|&flag| flag != 0),
            decay: model.light_attenuation.get(light).copied().unwrap_or(0.0) * 100.0,
            cast_shadow: true,
            attached_to_body: world_node_exists.then_some(0),
            position: DVec3::ZERO,
            target: DVec3::ZERO,
        });
    }
    let fallback_light = (model.nlight == 0).then(|| LightNode {
        light_id: None,
        directional: true,
        decay: 0.0,
        cast_shadow: false,
        attached_to_body: None,
        position: DVec3::ZERO,
        target: DVec3::ZERO,
    });

    // Every body index gets a node, visible geometry or not.
    for body in 0..model.nbody {
        bodies
            .entry(body as i32)
            .or_insert_with(|| BodyNode::new(model, body as i32));
    }

    let bodies: Vec<BodyNode> = (0..model.nbody)
        .map(|body| bodies.remove(&(body as i32)).expect("node per body index"))
        .collect();

    debug!(
        "built scene: {} bodies, {} lights, {} meshes",
        bodies.len(),
        lights.len(),
        meshes.len()
    );

    BuiltScene {
        bodies,
        lights,
        fallback_light,
        meshes,
    }
}

/// Decode one mesh's buffers, swapping vertex and normal components into
/// render-axis order.
fn decode_mesh(model: &Model, mesh_id: usize) -> MeshBuffers {
    let vert_start = model.mesh_vertadr[mesh_id].max(0) as usize;
    let vert_count = model.mesh_vertnum[mesh_id].max(0) as usize;

    let swizzle = |buffer: &[f32]| -> Vec<f32> {
        let slice = &buffer[vert_start * 3..(vert_start + vert_count) * 3];
        let mut out = Vec::with_capacity(slice.len());
        for chunk in slice.chunks_exact(3) {
            out.push(chunk[0]);
            out.push(chunk[2]);
            out.push(-chunk[1]);
        }
        out
    };

    let positions = swizzle(&model.mesh_vert);
    let normals = swizzle(&model.mesh_normal);

    let uvs = match model.mesh_texcoordadr.get(mesh_id) {
        Some(&adr) if adr >= 0 => {
            let start = adr as usize;
            model.mesh_texcoord[start * 2..(start + vert_count) * 2].to_vec()
        }
        _ => Vec::new(),
    };

    let face_start = model.mesh_faceadr[mesh_id].max(0) as usize;
    let face_count = model.mesh_facenum[mesh_id].max(0) as usize;
    let indices = model.mesh_face[face_start * 3..(face_start + face_count) * 3].to_vec();

    MeshBuffers {
        positions,
        normals,
        uvs,
        indices,
    }
}

fn build_texture(model: &Model, tex_id: i32) -> Texture {
    let index = tex_id as usize;
    let width = model.tex_width[index].max(0) as u32;
    let height = model.tex_height[index].max(0) as u32;
    let offset = model.tex_adr[index].max(0) as usize;
    let pixels = (width * height) as usize;
    let mut rgba = Vec::with_capacity(pixels * 4);
    for pixel in 0..pixels {
        let base = offset + pixel * 3;
        rgba.push(model.tex_rgb[base]);
        rgba.push(model.tex_rgb[base + 1]);
        rgba.push(model.tex_rgb[base + 2]);
        rgba.push(u8::MAX);
    }
    let repeat = if tex_id == TILED_TEXTURE_ID {
        [TILED_REPEAT[0] as u32, TILED_REPEAT[1] as u32]
    } else {
        [1, 1]
    };
    Texture {
        tex_id,
        width,
        height,
        rgba,
        repeat,
    }
}

fn build_material(
    model: &Model,
    geom: usize,
    kind: GeomKind,
    textures: &mut HashMap<i32, Arc<Texture>>,
    previous: &mut Option<Material>,
) -> Material {
    let mat_id = model.geom_matid[geom];
    let mut color = model.geom_rgba4(geom);
    let mut texture: Option<Arc<Texture>> = None;

    if mat_id >= 0 {
        color = model.mat_rgba4(mat_id as usize);
        let tex_id = model.mat_texid[mat_id as usize];
        if tex_id >= 0 {
            texture = Some(Arc::clone(
                textures
                    .entry(tex_id)
                    .or_insert_with(|| Arc::new(build_texture(model, tex_id))),
            ));
        }
    }

    if kind == GeomKind::Plane {
        color[0] = PLANE_ACCENT_RGB[0];
        color[1] = PLANE_ACCENT_RGB[1];
        color[2] = PLANE_ACCENT_RGB[2];
    }

    // Reuse the previous material when nothing observable changed; a new one
    // is only sampled on a color/opacity/texture transition.
    if let Some(prev) = previous.as_ref() {
        let prev_tex = prev.texture.as_ref().map(|tex| tex.tex_id);
        let next_tex = texture.as_ref().map(|tex| tex.tex_id);
        if prev.color == [color[0], color[1], color[2]]
            && prev.opacity == color[3]
            && prev_tex == next_tex
        {
            return prev.clone();
        }
    }

    let mut material = Material {
        color: [color[0], color[1], color[2]],
        opacity: color[3],
        transparent: color[3] < 1.0,
        texture,
        specular_intensity: None,
        reflectivity: None,
        roughness: None,
        metalness: None,
    };
    if mat_id >= 0 {
        let index = mat_id as usize;
        material.specular_intensity = model.mat_specular.get(index).map(|s| s * 0.5);
        material.reflectivity = model.mat_reflectance.get(index).copied();
        material.roughness = model.mat_shininess.get(index).map(|s| 1.0 - s);
        material.metalness = Some(0.1);
    }
    *previous = Some(material.clone());
    material
}
