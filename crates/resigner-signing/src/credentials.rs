//! Keystore password persistence

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Narrow set/get contract over persisted secret values.
pub trait SecureValueStore {
    /// Persist `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Look up the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
}

/// JSON-file-backed credential store.
///
/// Not an OS keychain: values sit on disk, readable only by the owning
/// user (0600 on Unix). Keys for keystore passwords are derived from the
/// keystore path so the password travels with the store file, not the
/// path string.
pub struct FileCredentialStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

#[derive(Default, Serialize, Deserialize)]
struct StoreFile {
    values: HashMap<String, String>,
}

impl FileCredentialStore {
    /// Open the store at `path`, starting empty when the file is missing
    /// or unreadable.
    pub fn open(path: PathBuf) -> Self {
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<StoreFile>(&text).ok())
            .map(|file| file.values)
            .unwrap_or_default();

        Self { path, values }
    }

    /// Default store location under the user's home directory.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".resigner").join("credentials.json"))
    }

    /// Store key for the password of the keystore at `path`.
    pub fn keystore_password_key(path: &Path) -> String {
        let digest = Sha256::digest(path.to_string_lossy().as_bytes());
        format!("keystore-password-{digest:x}")
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(&StoreFile {
            values: self.values.clone(),
        })?;
        fs::write(&self.path, text)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

impl SecureValueStore for FileCredentialStore {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
