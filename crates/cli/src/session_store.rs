//! Session entries persisted in the data directory

use gstpro_http::client::session::{SessionStore, StoreError, TOKEN_KEY, USER_KEY};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const SESSION_FILE: &str = "session.json";

/// JSON file holding the `token` and `user` entries
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE))
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError(format!("{}: {e}", self.path.display()))),
        }
    }

    fn entry(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock()?;
        Ok(self.read()?.remove(key))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError("session file lock poisoned".into()))
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Result<Option<String>, StoreError> {
        self.entry(TOKEN_KEY)
    }

    fn user(&self) -> Result<Option<String>, StoreError> {
        self.entry(USER_KEY)
    }

    fn set(&self, token: &str, user: &str) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let entries = BTreeMap::from([
            (TOKEN_KEY.to_string(), token.to_string()),
            (USER_KEY.to_string(), user.to_string()),
        ]);
        let json = serde_json::to_vec_pretty(&entries).map_err(|e| StoreError(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError(e.to_string()))?;
        }
        write_private(&self.path, &json).map_err(|e| StoreError(format!("{}: {e}", self.path.display())))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError(format!("{}: {e}", self.path.display()))),
        }
    }
}

/// Write a file readable only by the current user
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}
