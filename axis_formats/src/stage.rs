//! Scene staging: materialize caller-supplied buffers into the staging
//! filesystem and verify the transitive include/asset closure of the root
//! document before the engine compiler ever runs.
//!
//! All bytes must be pre-supplied by the caller; a reference that resolves to
//! nothing staged is a hard error, never a fetch.

use std::collections::BTreeSet;

use log::{debug, info};
use thiserror::Error;

use crate::mjcf::{self, ScanError};
use crate::vfs::{StagingFs, is_binary_path, join_relative, normalize_path};

/// One caller-supplied file destined for the staging tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Inline XML text standing in for an on-disk root document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineXml {
    pub file_name: String,
    pub content: String,
}

/// Immutable description of a scene to stage: an optional explicit root plus
/// every buffer the scene graph may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneDescriptor {
    pub root: Option<String>,
    pub files: Vec<SceneFile>,
    pub xml: Option<InlineXml>,
}

#[derive(Debug, Error)]
pub enum StageError {
    /// A transitively referenced include or asset was not staged.
    #[error("missing referenced file in scene: {0}")]
    MissingAsset(String),
    /// No explicit root, no inline XML, and no `.xml` entry to fall back to.
    #[error("no root XML provided or detected")]
    NoRootSpecified,
    /// The root document (or a file reached from it) is not usable MJCF.
    #[error("invalid scene markup in {path}: {message}")]
    InvalidSceneMarkup { path: String, message: String },
}

impl StageError {
    fn markup(path: &str, err: ScanError) -> Self {
        StageError::InvalidSceneMarkup {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Stage a scene descriptor and verify its reference closure.
///
/// Returns the normalized root path for the engine's own loader. Fails fast
/// with [`StageError::MissingAsset`] naming the first unresolved reference;
/// nothing is compiled on a partial tree.
pub fn stage(descriptor: &SceneDescriptor, fs: &mut StagingFs) -> Result<String, StageError> {
    for file in &descriptor.files {
        if file.path.is_empty() {
            continue;
        }
        if is_binary_path(&file.path) {
            fs.write_binary(&file.path, file.bytes.clone());
        } else {
            fs.write_text(&file.path, String::from_utf8_lossy(&file.bytes).into_owned());
        }
    }

    if let Some(xml) = &descriptor.xml {
        fs.write_text(&xml.file_name, xml.content.clone());
    }

    let root = resolve_root(descriptor)?;
    debug!("staging root {root} ({} files supplied)", fs.len());

    let root_text = fs
        .read(&root)
        .ok_or_else(|| StageError::MissingAsset(root.clone()))?
        .to_text();
    if !mjcf::has_scene_root(&root_text) {
        return Err(StageError::InvalidSceneMarkup {
            path: root.clone(),
            message: "expected a <mujoco> root element".to_string(),
        });
    }

    let mut visited = BTreeSet::new();
    visit_document(fs, &root, &mut visited)?;

    info!("staged scene {root}: {} files, {} visited", fs.len(), visited.len());
    Ok(root)
}

/// Root resolution order: explicit argument, inline-XML filename, first
/// `.xml`-suffixed supplied file.
fn resolve_root(descriptor: &SceneDescriptor) -> Result<String, StageError> {
    if let Some(root) = &descriptor.root {
        let normalized = normalize_path(root);
        if !normalized.is_empty() {
            return Ok(normalized);
        }
    }
    if let Some(xml) = &descriptor.xml {
        let normalized = normalize_path(&xml.file_name);
        if !normalized.is_empty() {
            return Ok(normalized);
        }
    }
    descriptor
        .files
        .iter()
        .find(|file| file.path.to_ascii_lowercase().ends_with(".xml"))
        .map(|file| normalize_path(&file.path))
        .ok_or(StageError::NoRootSpecified)
}

fn visit_document(
    fs: &StagingFs,
    path: &str,
    visited: &mut BTreeSet<String>,
) -> Result<(), StageError> {
    // Cyclic includes visit each file exactly once.
    if !visited.insert(path.to_string()) {
        return Ok(());
    }

    let data = fs
        .read(path)
        .ok_or_else(|| StageError::MissingAsset(path.to_string()))?;
    let refs = mjcf::scan_document(&data.to_text()).map_err(|err| StageError::markup(path, err))?;

    for include in &refs.includes {
        let include_path = join_relative(path, include);
        visit_document(fs, &include_path, visited)?;
    }

    for asset in &refs.assets {
        let dir = refs.dirs.dir_for(asset.kind);
        let combined = if dir.is_empty() {
            asset.file.clone()
        } else {
            format!("{dir}/{}", asset.file)
        };
        let asset_path = join_relative(path, &combined);
        if !fs.exists(&asset_path) {
            return Err(StageError::MissingAsset(asset_path));
        }
    }

    Ok(())
}
