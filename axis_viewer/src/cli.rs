//! Headless scene lint: stage a scene directory from disk and report the
//! resolved dependency closure without an engine or a window.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use walkdir::WalkDir;

use axis_formats::{SceneDescriptor, SceneFile, StagingFs, is_binary_path};

#[derive(Parser, Debug)]
#[command(about = "Stage an MJCF scene directory and report its dependency closure", version)]
pub struct Args {
    /// Directory containing the scene XML and its assets
    pub scene_dir: PathBuf,

    /// Root XML path relative to the scene directory (auto-detected when omitted)
    #[arg(long)]
    pub root: Option<String>,

    /// Emit the staged manifest as JSON instead of a summary line
    #[arg(long)]
    pub json: bool,
}

/// Read every regular file under `dir` into scene-file buffers, keyed by
/// slash-separated paths relative to `dir`.
pub fn collect_scene_files(dir: &Path) -> Result<Vec<SceneFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("relativizing {}", entry.path().display()))?;
        let path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        files.push(SceneFile { path, bytes });
    }
    Ok(files)
}

#[derive(Debug, Serialize)]
pub struct StagedManifest {
    pub root: String,
    pub files: Vec<StagedEntry>,
}

#[derive(Debug, Serialize)]
pub struct StagedEntry {
    pub path: String,
    pub kind: &'static str,
    pub bytes: usize,
}

pub fn manifest_from(root: &str, staging: &StagingFs) -> StagedManifest {
    StagedManifest {
        root: root.to_string(),
        files: staging
            .iter()
            .map(|(path, data)| StagedEntry {
                path: path.to_string(),
                kind: if is_binary_path(path) { "binary" } else { "text" },
                bytes: data.len(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use axis_formats::stage;

    #[test]
    fn collects_and_stages_a_scene_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("robot.xml"),
            "<mujoco><compiler meshdir=\"meshes\"/><asset><mesh file=\"arm.stl\"/></asset></mujoco>",
        )
        .expect("write xml");
        fs::create_dir(dir.path().join("meshes")).expect("mkdir");
        fs::write(dir.path().join("meshes/arm.stl"), [0u8; 84]).expect("write mesh");

        let files = collect_scene_files(dir.path()).expect("collect");
        assert_eq!(files.len(), 2);

        let descriptor = SceneDescriptor {
            root: None,
            files,
            xml: None,
        };
        let mut staging = StagingFs::new();
        let root = stage(&descriptor, &mut staging).expect("stage");
        assert_eq!(root, "robot.xml");

        let manifest = manifest_from(&root, &staging);
        assert_eq!(manifest.files.len(), 2);
        let mesh = manifest
            .files
            .iter()
            .find(|entry| entry.path == "meshes/arm.stl")
            .expect("mesh entry");
        assert_eq!(mesh.kind, "binary");
        assert_eq!(mesh.bytes, 84);
    }
}
