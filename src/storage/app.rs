//! App handle
//!
//! An `App` knows its id and the storage root. Paths to its files are always
//! recomputed through the path validator; nothing about the files is cached.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::error::StorageError;
use crate::storage::filesystem::{file_exists, read_optional_string, write_stream};
use crate::storage::validation::{resolve, validate_id};

/// The fixed set of files inside an app directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Name,
    Unsigned,
    Signed,
    WorkflowUrl,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Name,
        Resource::Unsigned,
        Resource::Signed,
        Resource::WorkflowUrl,
    ];

    /// File name of this resource within the app directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Name => "name",
            Resource::Unsigned => "unsigned",
            Resource::Signed => "signed",
            Resource::WorkflowUrl => "workflow_url",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Handle to one app directory under the storage root.
#[derive(Debug)]
pub struct App {
    id: String,
    root: PathBuf,
}

impl App {
    /// Build a handle, rejecting ids that would escape `root`.
    pub fn new(root: impl Into<PathBuf>, id: impl Into<String>) -> Result<Self, StorageError> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self {
            id,
            root: root.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Directory holding this app's files.
    pub fn dir(&self) -> Result<PathBuf, StorageError> {
        resolve(&self.root, &self.id, "")
    }

    /// Path to one of the app's files. The file need not exist.
    pub fn path_to(&self, resource: Resource) -> Result<PathBuf, StorageError> {
        resolve(&self.root, &self.id, resource.file_name())
    }

    /// Display name, or `None` if no name was ever written.
    pub fn name(&self) -> Result<Option<String>, StorageError> {
        let path = self.path_to(Resource::Name)?;
        read_optional_string(&path).map_err(|e| self.resource_error(Resource::Name, "read", e))
    }

    pub fn is_signed(&self) -> bool {
        match self.path_to(Resource::Signed) {
            Ok(path) => file_exists(&path),
            Err(e) => {
                warn!("Cannot resolve signed binary of app {}: {}", self.id, e);
                false
            }
        }
    }

    pub fn workflow_url(&self) -> Result<Option<String>, StorageError> {
        let path = self.path_to(Resource::WorkflowUrl)?;
        read_optional_string(&path)
            .map_err(|e| self.resource_error(Resource::WorkflowUrl, "read", e))
    }

    pub fn set_workflow_url(&self, url: &str) -> Result<(), StorageError> {
        let path = self.path_to(Resource::WorkflowUrl)?;
        fs::write(&path, url).map_err(|e| self.resource_error(Resource::WorkflowUrl, "write", e))
    }

    /// Open the uploaded binary for reading.
    pub fn open_unsigned(&self) -> Result<File, StorageError> {
        let path = self.path_to(Resource::Unsigned)?;
        File::open(&path).map_err(|e| self.resource_error(Resource::Unsigned, "open", e))
    }

    /// Store signing output, replacing any previous signed binary.
    pub fn save_signed(&self, reader: &mut dyn Read) -> Result<u64, StorageError> {
        let path = self.path_to(Resource::Signed)?;
        let written = write_stream(&path, reader)
            .map_err(|e| self.resource_error(Resource::Signed, "write", e))?;
        info!("Saved signed binary for app {} ({} bytes)", self.id, written);
        Ok(written)
    }

    /// Recursively remove the app directory. Only the resolver calls this,
    /// and it drops the index entry afterwards.
    ///
    /// A directory that is already gone counts as pruned.
    pub(crate) fn prune(&self) -> io::Result<()> {
        let dir = self
            .dir()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        match fs::symlink_metadata(&dir) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&dir),
            Ok(_) => Err(io::Error::other(format!(
                "{} is not a directory",
                dir.display()
            ))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("App directory {} already removed", dir.display());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn resource_error(
        &self,
        resource: Resource,
        op: &'static str,
        source: io::Error,
    ) -> StorageError {
        StorageError::ResourceFailed {
            id: self.id.clone(),
            resource,
            op,
            source,
        }
    }
}
