//! Path validation
//!
//! Computes app paths under the storage root. Ids arrive from untrusted input,
//! so every component is checked and rejected rather than normalized.

use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Validate that `id` names exactly one directory directly under the root.
pub fn validate_id(id: &str) -> Result<(), StorageError> {
    if id.contains('/') || id.contains('\\') {
        return Err(StorageError::invalid_path(id, "id contains a path separator"));
    }
    validate_segment(id)
}

/// Resolve `root/id/subpath`, failing with `InvalidPath` if any part could
/// escape `root`. An empty `subpath` resolves to the app directory itself.
///
/// Pure string work; the filesystem is never consulted.
pub fn resolve(root: &Path, id: &str, subpath: &str) -> Result<PathBuf, StorageError> {
    validate_id(id)?;

    let mut path = root.join(id);
    if subpath.is_empty() {
        return Ok(path);
    }

    for segment in subpath.split(['/', '\\']) {
        validate_segment(segment).map_err(|_| {
            StorageError::invalid_path(subpath, "sub-path segment is not a plain name")
        })?;
        path.push(segment);
    }

    Ok(path)
}

fn validate_segment(segment: &str) -> Result<(), StorageError> {
    if segment.is_empty() {
        return Err(StorageError::invalid_path(segment, "empty path segment"));
    }
    if segment.contains('\0') {
        return Err(StorageError::invalid_path(segment, "path segment contains NUL"));
    }

    // Catches ".", ".." and platform prefixes such as "C:".
    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == segment => Ok(()),
        (Some(Component::ParentDir), _) => Err(StorageError::invalid_path(
            segment,
            "parent directory segment",
        )),
        _ => Err(StorageError::invalid_path(
            segment,
            "segment is not a plain name",
        )),
    }
}
