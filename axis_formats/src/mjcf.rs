//! Dependency scanning for MJCF scene markup.
//!
//! The stager only needs the reference graph out of a document: `<include>`
//! targets, `<compiler>` directory overrides, and `file` attributes on asset
//! declarations. Everything else is the engine compiler's business.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Asset declarations that may reference staged files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh,
    Texture,
    HeightField,
    Skin,
}

impl AssetKind {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"mesh" => Some(AssetKind::Mesh),
            b"texture" => Some(AssetKind::Texture),
            b"hfield" => Some(AssetKind::HeightField),
            b"skin" => Some(AssetKind::Skin),
            _ => None,
        }
    }
}

/// A `file` attribute found on an asset declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub file: String,
}

/// Per-kind asset directories declared on the `<compiler>` element.
///
/// `meshdir` defaults to `assets`; `texturedir` and `skindir` fall back to
/// the mesh directory, `hfielddir` to the texture directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerDirs {
    pub meshdir: Option<String>,
    pub texturedir: Option<String>,
    pub skindir: Option<String>,
    pub hfielddir: Option<String>,
}

impl CompilerDirs {
    pub const DEFAULT_MESHDIR: &'static str = "assets";

    pub fn dir_for(&self, kind: AssetKind) -> String {
        let mesh = self
            .meshdir
            .clone()
            .unwrap_or_else(|| Self::DEFAULT_MESHDIR.to_string());
        match kind {
            AssetKind::Mesh => mesh,
            AssetKind::Texture | AssetKind::HeightField => {
                let texture = self.texturedir.clone().unwrap_or_else(|| mesh.clone());
                if kind == AssetKind::Texture {
                    texture
                } else {
                    self.hfielddir.clone().unwrap_or(texture)
                }
            }
            AssetKind::Skin => self.skindir.clone().unwrap_or(mesh),
        }
    }
}

/// Everything the stager needs out of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRefs {
    pub includes: Vec<String>,
    pub dirs: CompilerDirs,
    pub assets: Vec<AssetRef>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed XML: {0}")]
    Xml(String),
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, ScanError> {
    for attr in element.attributes().flatten() {
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|err| ScanError::Xml(format!("invalid attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Quick well-formedness sniff: does this look like an MJCF document at all?
pub fn has_scene_root(xml: &str) -> bool {
    !xml.is_empty() && xml.contains("<mujoco")
}

/// Extract include targets, compiler directories, and asset references.
pub fn scan_document(xml: &str) -> Result<DocumentRefs, ScanError> {
    let mut reader = Reader::from_str(xml);
    let mut refs = DocumentRefs::default();

    loop {
        match reader
            .read_event()
            .map_err(|err| ScanError::Xml(err.to_string()))?
        {
            Event::Eof => break,
            Event::Start(element) | Event::Empty(element) => {
                match element.name().as_ref() {
                    b"include" => {
                        if let Some(file) = attribute(&element, b"file")? {
                            refs.includes.push(file);
                        }
                    }
                    b"compiler" => {
                        // Last declaration wins, matching the engine compiler.
                        if let Some(dir) = attribute(&element, b"meshdir")? {
                            refs.dirs.meshdir = Some(dir);
                        }
                        if let Some(dir) = attribute(&element, b"texturedir")? {
                            refs.dirs.texturedir = Some(dir);
                        }
                        if let Some(dir) = attribute(&element, b"skindir")? {
                            refs.dirs.skindir = Some(dir);
                        }
                        if let Some(dir) = attribute(&element, b"hfielddir")? {
                            refs.dirs.hfielddir = Some(dir);
                        }
                    }
                    tag => {
                        if let Some(kind) = AssetKind::from_tag(tag) {
                            if let Some(file) = attribute(&element, b"file")? {
                                refs.assets.push(AssetRef { kind, file });
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <mujoco model="arm">
          <compiler meshdir="meshes" texturedir="textures"/>
          <include file="parts.xml"/>
          <asset>
            <mesh name="arm" file="arm.stl"/>
            <texture name="wood" file="wood.png"/>
            <hfield name="terrain" file="terrain.png"/>
            <skin name="hand" file="hand.skn"/>
          </asset>
          <worldbody>
            <geom type="plane" size="1 1 0.1"/>
          </worldbody>
        </mujoco>
    "#;

    #[test]
    fn scans_includes_and_assets() {
        let refs = scan_document(SAMPLE).expect("scan");
        assert_eq!(refs.includes, vec!["parts.xml".to_string()]);
        assert_eq!(refs.assets.len(), 4);
        assert_eq!(refs.assets[0], AssetRef {
            kind: AssetKind::Mesh,
            file: "arm.stl".to_string(),
        });
        assert_eq!(refs.assets[2].kind, AssetKind::HeightField);
    }

    #[test]
    fn directory_defaults_chain() {
        let refs = scan_document(SAMPLE).expect("scan");
        assert_eq!(refs.dirs.dir_for(AssetKind::Mesh), "meshes");
        assert_eq!(refs.dirs.dir_for(AssetKind::Texture), "textures");
        // skindir unset: falls back to the mesh directory.
        assert_eq!(refs.dirs.dir_for(AssetKind::Skin), "meshes");
        // hfielddir unset: falls back to the texture directory.
        assert_eq!(refs.dirs.dir_for(AssetKind::HeightField), "textures");
    }

    #[test]
    fn bare_document_uses_builtin_defaults() {
        let refs = scan_document("<mujoco><asset><mesh file=\"a.obj\"/></asset></mujoco>")
            .expect("scan");
        assert_eq!(refs.dirs.dir_for(AssetKind::Mesh), "assets");
        assert_eq!(refs.dirs.dir_for(AssetKind::Texture), "assets");
        assert_eq!(refs.dirs.dir_for(AssetKind::HeightField), "assets");
    }

    #[test]
    fn sniffs_scene_root() {
        assert!(has_scene_root("<mujoco model=\"x\"/>"));
        assert!(!has_scene_root("<robot name=\"urdf\"/>"));
        assert!(!has_scene_root(""));
    }

    #[test]
    fn rejects_malformed_markup() {
        assert!(scan_document("<mujoco><include").is_err());
    }
}
