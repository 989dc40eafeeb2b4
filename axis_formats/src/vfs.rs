//! In-memory staging filesystem the engine loader reads compiled scenes from.
//!
//! Paths are stored as normalized, slash-separated relative paths; the engine
//! sees them under the fixed [`STAGING_PREFIX`]. Writing to an existing path
//! shadows the previous content.

use std::collections::BTreeMap;

use log::debug;

/// Mount point the engine-side loader resolves staged paths against.
pub const STAGING_PREFIX: &str = "/working";

/// File extensions staged as raw bytes; everything else is treated as text.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "tga", "dds", "ktx", "ktx2", "hdr", "exr", "obj", "stl",
    "ply", "glb", "gltf", "skn", "bin",
];

/// Returns true when the path's extension is on the binary allow-list.
pub fn is_binary_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    match lower.rsplit_once('.') {
        Some((_, ext)) => BINARY_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Content of one staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Text(String),
    Binary(Vec<u8>),
}

impl FileData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileData::Text(text) => text.as_bytes(),
            FileData::Binary(bytes) => bytes,
        }
    }

    /// Decode the content as UTF-8 text, replacing invalid sequences.
    pub fn to_text(&self) -> String {
        match self {
            FileData::Text(text) => text.clone(),
            FileData::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Normalize a staged path: strip leading slashes, drop `.` and empty
/// segments, resolve `..` against the segments collected so far.
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

/// Resolve `reference` against the directory of `current`, supporting `./`,
/// `../`, and bare-relative forms. Bare-relative paths resolve against the
/// current file's directory, not the staging root.
pub fn join_relative(current: &str, reference: &str) -> String {
    let mut stack: Vec<&str> = current.split('/').collect();
    stack.pop();
    for part in reference.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

/// Path→content map rooted at [`STAGING_PREFIX`].
#[derive(Debug, Default)]
pub struct StagingFs {
    files: BTreeMap<String, FileData>,
}

impl StagingFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every staged file. The load flow calls this before staging a new
    /// scene so staged trees never accumulate across loads.
    pub fn clear(&mut self) {
        if !self.files.is_empty() {
            debug!("clearing {} staged files", self.files.len());
        }
        self.files.clear();
    }

    pub fn write(&mut self, path: &str, data: FileData) {
        self.files.insert(normalize_path(path), data);
    }

    pub fn write_text(&mut self, path: &str, text: impl Into<String>) {
        self.write(path, FileData::Text(text.into()));
    }

    pub fn write_binary(&mut self, path: &str, bytes: Vec<u8>) {
        self.write(path, FileData::Binary(bytes));
    }

    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    pub fn read(&self, path: &str) -> Option<&FileData> {
        self.files.get(&normalize_path(path))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Staged paths in sorted order, relative to the staging root.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileData)> {
        self.files.iter().map(|(path, data)| (path.as_str(), data))
    }

    /// The absolute path the engine loader sees for a staged file.
    pub fn staged_path(&self, path: &str) -> String {
        format!("{}/{}", STAGING_PREFIX, normalize_path(path))
    }
}
