//! File system operations
//!
//! Small I/O helpers used by the app handle.

use std::fs::{self, File};
use std::io::{self, Read, Result, Write};
use std::path::Path;

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Read a text file, treating a missing file as `None`
pub fn read_optional_string(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create (or truncate) `path` and copy `reader` into it, returning the byte count
pub fn write_stream(path: &Path, reader: &mut dyn Read) -> Result<u64> {
    let mut file = File::create(path)?;
    let written = io::copy(reader, &mut file)?;
    file.flush()?;
    Ok(written)
}
