//! App resolver
//!
//! `AppStore` keeps an id -> handle index in sync with the directories under
//! the storage root. Every operation holds one mutex for its whole duration,
//! so no caller ever observes a half-updated index and creates and deletes
//! never interleave their filesystem and index work.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::app::{App, Resource};
use crate::storage::validation::validate_id;

type Index = HashMap<String, Arc<App>>;

/// Mint a fresh app id: a random 128-bit UUID in hyphenated form.
pub fn new_app_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct AppStore {
    root: PathBuf,
    cleanup_failed_creates: bool,
    index: Mutex<Index>,
}

impl AppStore {
    /// Open the store at `root`, creating the directory if needed, and load
    /// the apps already on disk.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::StorageUnavailable {
            root: root.clone(),
            source,
        })?;

        let store = Self {
            root,
            cleanup_failed_creates: true,
            index: Mutex::new(HashMap::new()),
        };
        let found = store.refresh()?;
        info!(
            "App store opened at {} ({} apps)",
            store.root.display(),
            found
        );
        Ok(store)
    }

    /// Whether a failed create removes the directory it left behind.
    pub fn with_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_failed_creates = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rescan the storage root, returning how many apps were newly discovered.
    pub fn refresh(&self) -> Result<usize, StorageError> {
        let mut index = self.lock();
        self.rescan(&mut index)
    }

    /// Rescan the storage root and return every known app, ordered by id.
    pub fn list(&self) -> Result<Vec<Arc<App>>, StorageError> {
        let mut index = self.lock();
        self.rescan(&mut index)?;

        let mut apps: Vec<Arc<App>> = index.values().cloned().collect();
        apps.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(apps)
    }

    /// Look up an app by id. Does not touch the filesystem.
    pub fn get(&self, id: &str) -> Option<Arc<App>> {
        self.lock().get(id).cloned()
    }

    /// Create a new app directory with optional initial name and unsigned binary.
    ///
    /// The app becomes visible only once every write has succeeded.
    pub fn create(
        &self,
        name: Option<&str>,
        unsigned: Option<&mut dyn Read>,
    ) -> Result<Arc<App>, StorageError> {
        let mut index = self.lock();

        let id = new_app_id();
        let app = App::new(&self.root, id.as_str())
            .map_err(|e| create_failed(&id, "resolve app dir", invalid_input(e)))?;
        let dir = app
            .dir()
            .map_err(|e| create_failed(&id, "resolve app dir", invalid_input(e)))?;

        // Non-recursive, so a missing root or an id collision is an error and
        // nothing that belongs to another app is ever cleaned up.
        fs::create_dir(&dir).map_err(|e| {
            let err = create_failed(&id, "make app dir", e);
            error!("{}", err);
            err
        })?;

        if let Err(err) = self.write_initial_files(&app, name, unsigned) {
            error!("{}", err);
            if self.cleanup_failed_creates {
                self.discard(&app);
            }
            return Err(err);
        }

        let app = Arc::new(app);
        index.insert(id.clone(), Arc::clone(&app));
        info!("Created app {}", id);
        Ok(app)
    }

    /// Delete an app and all of its files. Unknown ids are a no-op.
    pub fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut index = self.lock();

        let Some(app) = index.get(id).cloned() else {
            debug!("Delete of unknown app {} ignored", id);
            return Ok(());
        };

        app.prune().map_err(|source| {
            error!("Failed to prune app {}: {}", id, source);
            StorageError::DeleteFailed {
                id: id.to_string(),
                source,
            }
        })?;

        // Only after the directory is gone.
        index.remove(id);
        info!("Deleted app {}", id);
        Ok(())
    }

    // The index is only written after all fallible I/O has finished, so a
    // guard poisoned by a panicking caller still holds a coherent map.
    fn lock(&self) -> MutexGuard<'_, Index> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rescan(&self, index: &mut Index) -> Result<usize, StorageError> {
        let unavailable = |source| StorageError::StorageUnavailable {
            root: self.root.clone(),
            source,
        };

        let entries = fs::read_dir(&self.root).map_err(unavailable)?;
        let mut rebuilt = Index::with_capacity(index.len());
        let mut discovered = 0;

        for entry in entries {
            let entry = entry.map_err(unavailable)?;

            // Symlinks are not followed, so a linked directory is not an app.
            match entry.file_type() {
                Ok(t) if t.is_dir() => {}
                Ok(t) if t.is_symlink() => {
                    debug!("Skipping symlink {} in storage root", entry.path().display());
                    continue;
                }
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            }

            let Ok(id) = entry.file_name().into_string() else {
                warn!(
                    "Skipping non UTF-8 entry {} in storage root",
                    entry.path().display()
                );
                continue;
            };

            if let Err(e) = validate_id(&id) {
                warn!("Skipping storage entry {:?}: {}", id, e);
                continue;
            }

            let app = match index.get(&id) {
                Some(existing) => Arc::clone(existing),
                None => match App::new(&self.root, id.as_str()) {
                    Ok(app) => {
                        discovered += 1;
                        debug!("Discovered app {} on disk", id);
                        Arc::new(app)
                    }
                    Err(e) => {
                        warn!("Skipping storage entry {:?}: {}", id, e);
                        continue;
                    }
                },
            };
            rebuilt.insert(id, app);
        }

        let vanished = index.keys().filter(|id| !rebuilt.contains_key(*id)).count();
        if vanished > 0 {
            warn!("{} indexed apps no longer exist on disk", vanished);
        }

        *index = rebuilt;
        Ok(discovered)
    }

    fn write_initial_files(
        &self,
        app: &App,
        name: Option<&str>,
        unsigned: Option<&mut dyn Read>,
    ) -> Result<(), StorageError> {
        let id = app.id();

        if let Some(name) = name {
            let path = app
                .path_to(Resource::Name)
                .map_err(|e| create_failed(id, "write name file", invalid_input(e)))?;
            fs::write(&path, name).map_err(|e| create_failed(id, "write name file", e))?;
        }

        if let Some(reader) = unsigned {
            let path = app
                .path_to(Resource::Unsigned)
                .map_err(|e| create_failed(id, "create unsigned", invalid_input(e)))?;
            let mut file =
                File::create(&path).map_err(|e| create_failed(id, "create unsigned", e))?;
            let written = io::copy(reader, &mut file)
                .and_then(|n| file.flush().map(|()| n))
                .map_err(|e| create_failed(id, "write unsigned", e))?;
            debug!("Stored {} unsigned bytes for app {}", written, id);
        }

        Ok(())
    }

    fn discard(&self, app: &App) {
        match app.prune() {
            Ok(()) => info!("Removed partially created app {}", app.id()),
            Err(e) => warn!(
                "Could not remove partially created app {}: {}",
                app.id(),
                e
            ),
        }
    }
}

fn create_failed(id: &str, op: &'static str, source: io::Error) -> StorageError {
    StorageError::CreateFailed {
        id: id.to_string(),
        op,
        source,
    }
}

fn invalid_input(err: StorageError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("upload interrupted"))
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_app_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_open_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("save").join("apps");

        let store = AppStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_rescan_preserves_existing_handles() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path()).unwrap();

        let app = store.create(Some("Foo"), None).unwrap();
        fs::create_dir(dir.path().join("external")).unwrap();

        assert_eq!(store.refresh().unwrap(), 1);
        let listed = store.get(app.id()).unwrap();
        assert!(Arc::ptr_eq(&app, &listed));
        assert_eq!(store.refresh().unwrap(), 0);
    }

    #[test]
    fn test_rescan_skips_files_and_drops_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path()).unwrap();

        fs::write(dir.path().join("stray-file"), "x").unwrap();
        let app = store.create(None, None).unwrap();
        fs::remove_dir_all(app.dir().unwrap()).unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(store.get(app.id()).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_rescan_skips_invalid_names_and_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("apps");
        let store = AppStore::open(&root).unwrap();

        // A plain directory on Unix, but never a valid app id.
        fs::create_dir(root.join("a\\b")).unwrap();
        let elsewhere = dir.path().join("elsewhere");
        fs::create_dir(&elsewhere).unwrap();
        std::os::unix::fs::symlink(&elsewhere, root.join("linked")).unwrap();
        fs::create_dir(root.join("kept")).unwrap();

        let ids: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|app| app.id().to_string())
            .collect();
        assert_eq!(ids, vec!["kept".to_string()]);
        assert!(store.get("a\\b").is_none());
        assert!(store.get("linked").is_none());
    }

    #[test]
    fn test_failed_create_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path()).unwrap();

        let mut reader = FailingReader;
        let err = store.create(Some("Foo"), Some(&mut reader as &mut dyn Read)).unwrap_err();
        let (id, op) = match err {
            StorageError::CreateFailed { id, op, .. } => (id, op),
            other => panic!("expected CreateFailed, got {other:?}"),
        };

        assert_eq!(op, "write unsigned");
        assert!(store.get(&id).is_none());
        assert!(!dir.path().join(&id).exists());
    }

    #[test]
    fn test_failed_create_without_cleanup_leaves_orphan() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path()).unwrap().with_cleanup(false);

        let mut reader = FailingReader;
        let err = store.create(Some("Foo"), Some(&mut reader as &mut dyn Read)).unwrap_err();
        let id = match err {
            StorageError::CreateFailed { id, .. } => id,
            other => panic!("expected CreateFailed, got {other:?}"),
        };

        assert!(store.get(&id).is_none());
        assert!(dir.path().join(&id).is_dir());

        // The orphan surfaces on the next rescan.
        let listed: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|app| app.id().to_string())
            .collect();
        assert_eq!(listed, vec![id]);
    }
}
