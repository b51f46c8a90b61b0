//! On-disk layout: blobs in the root, metadata records under `.metadata`

use std::path::{Path, PathBuf};

/// Subdirectory holding metadata records
pub const METADATA_DIR: &str = ".metadata";

/// Extension of metadata records
pub const METADATA_EXT: &str = "meta";

pub fn blob_path(root: &Path, hash: &str) -> PathBuf {
    root.join(hash)
}

pub fn metadata_path(metadata_dir: &Path, hash: &str) -> PathBuf {
    metadata_dir.join(format!("{hash}.{METADATA_EXT}"))
}

/// Unique sibling of `target` used while writing it
///
/// The name keeps the target's stem and adds a dotted `tmp.<uuid>` suffix, so
/// it never looks like a blob or a metadata record.
pub fn staging_path(target: &Path) -> PathBuf {
    let unique_id = uuid::Uuid::new_v4();
    target.with_extension(format!("tmp.{unique_id}"))
}

/// Whether a file name inside the metadata directory is a record
pub fn is_metadata_file(name: &str) -> bool {
    name.strip_suffix(&format!(".{METADATA_EXT}"))
        .is_some_and(crate::keys::is_hashed_name)
}
