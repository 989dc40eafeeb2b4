pub mod mjcf;
pub mod stage;
pub mod vfs;

pub use mjcf::{AssetKind, AssetRef, CompilerDirs, DocumentRefs, ScanError};
pub use stage::{InlineXml, SceneDescriptor, SceneFile, StageError, stage};
pub use vfs::{FileData, STAGING_PREFIX, StagingFs, is_binary_path, join_relative, normalize_path};
