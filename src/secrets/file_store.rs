//! secrets::file_store
//!
//! Access tokens kept in `~/.confrev/credentials.toml`, one entry per key.
//!
//! The file is created with mode 0600 before anything is written to it and
//! replaced by rename, so a crash never leaves a half-written token behind.
//! Writers serialize on `credentials.toml.lock`. Values never reach logs or
//! error messages, and parse errors report only a byte offset.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use fs2::FileExt;

use super::traits::{SecretError, SecretStore};

const FILE_NAME: &str = "credentials.toml";

type Entries = BTreeMap<String, String>;

fn read_failed(what: &str) -> impl FnOnce(io::Error) -> SecretError + '_ {
    move |e| SecretError::ReadError(format!("{}: {}", what, e))
}

fn write_failed(what: &str) -> impl FnOnce(io::Error) -> SecretError + '_ {
    move |e| SecretError::WriteError(format!("{}: {}", what, e))
}

/// Token store backed by a TOML file.
///
/// ```
/// use confrev::secrets::{FileSecretStore, SecretStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileSecretStore::with_path(dir.path().join("credentials.toml"));
///
/// store.set("github.com.token", "ghp_example").unwrap();
/// assert!(store.exists("github.com.token").unwrap());
/// store.delete("github.com.token").unwrap();
/// assert!(store.get("github.com.token").unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    /// Store at `~/.confrev/credentials.toml`.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self::with_path(home.join(".confrev").join(FILE_NAME)))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Hold the writer lock for the duration of `update`, then persist.
    fn modify(&self, update: impl FnOnce(&mut Entries) -> bool) -> Result<(), SecretError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(write_failed("cannot create directory"))?;
        }
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.sibling(".lock"))
            .map_err(write_failed("cannot open lock file"))?;
        lock.lock_exclusive()
            .map_err(write_failed("cannot lock credentials file"))?;

        let mut entries = self.load()?;
        if update(&mut entries) {
            self.persist(&entries)?;
        }
        // The lock is released when `lock` drops.
        Ok(())
    }

    fn load(&self) -> Result<Entries, SecretError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(read_failed("cannot read credentials file")(e)),
        };
        toml::from_str(&text).map_err(|e| {
            let at = e
                .span()
                .map(|s| format!(" at byte {}", s.start))
                .unwrap_or_default();
            SecretError::ReadError(format!("cannot parse credentials file{}", at))
        })
    }

    fn persist(&self, entries: &Entries) -> Result<(), SecretError> {
        let text = toml::to_string_pretty(entries)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize credentials: {}", e)))?;

        let staging = self.sibling(".tmp");
        let mut file = open_private(&staging).map_err(write_failed("cannot create temp file"))?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(write_failed("cannot write credentials"))?;
        drop(file);

        fs::rename(&staging, &self.path).map_err(write_failed("cannot replace credentials file"))
    }

    /// Whether the file is readable by its owner only. True when absent
    /// and on platforms without Unix modes.
    pub fn verify_permissions(&self) -> Result<bool, SecretError> {
        #[cfg(unix)]
        {
            match fs::metadata(&self.path) {
                Ok(meta) => Ok(meta.permissions().mode() & 0o777 == 0o600),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
                Err(e) => Err(read_failed("cannot read file metadata")(e)),
            }
        }
        #[cfg(not(unix))]
        {
            Ok(true)
        }
    }
}

/// Truncate-create `path`, restricting it to 0600 before the caller writes.
fn open_private(path: &Path) -> io::Result<File> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    #[cfg(unix)]
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.modify(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileSecretStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("credentials.toml"));
        (temp, store)
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let (_temp, store) = create_test_store();
        assert!(store.get("nonexistent").expect("get").is_none());
    }

    #[test]
    fn set_and_get() {
        let (_temp, store) = create_test_store();
        store.set("github.com.token", "test_token").expect("set");
        assert_eq!(
            store.get("github.com.token").expect("get"),
            Some("test_token".to_string())
        );
    }

    #[test]
    fn set_overwrites() {
        let (_temp, store) = create_test_store();
        store.set("key", "value1").expect("first set");
        store.set("key", "value2").expect("second set");
        assert_eq!(store.get("key").expect("get"), Some("value2".to_string()));
    }

    #[test]
    fn delete_nonexistent_does_not_create_file() {
        let (_temp, store) = create_test_store();
        store.delete("nonexistent").expect("delete nonexistent");
        assert!(!store.path().exists());
    }

    #[test]
    fn lock_file_is_sibling() {
        let (temp, store) = create_test_store();
        store.set("key", "value").expect("set");
        assert!(temp.path().join("credentials.toml.lock").exists());
    }

    #[test]
    fn creates_directory_if_missing() {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("subdir").join("credentials.toml");
        let store = FileSecretStore::with_path(path.clone());

        store.set("key", "value").expect("set");
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn permissions_0600_on_unix() {
        let (_temp, store) = create_test_store();
        assert!(store.verify_permissions().expect("verify before write"));
        store.set("key", "value").expect("set");
        assert!(store.verify_permissions().expect("verify after write"));
    }

    #[test]
    fn parse_error_does_not_echo_content() {
        let (_temp, store) = create_test_store();
        fs::write(store.path(), "token = \"ghp_leak").expect("write bad toml");

        let err = store.get("token").unwrap_err().to_string();
        assert!(err.contains("cannot parse"), "{err}");
        assert!(!err.contains("ghp_leak"), "{err}");
    }

    #[test]
    fn persistence_across_instances() {
        let (temp, store) = create_test_store();
        store.set("key", "value").expect("set");

        let reopened = FileSecretStore::with_path(temp.path().join("credentials.toml"));
        assert_eq!(reopened.get("key").expect("get"), Some("value".to_string()));
    }
}
