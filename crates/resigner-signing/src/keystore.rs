//! Android keystore lifecycle
//!
//! Keystores hold a single signing key under a fixed alias; generated
//! stores get a placeholder distinguished name since resigning does not
//! care who the certificate claims to be.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::backend::AndroidBackend;
use crate::error::Result;

/// Fixed alias the signing key is stored under.
pub const KEY_ALIAS: &str = "app_key";
/// Key algorithm for generated keystores.
pub const KEY_ALGORITHM: &str = "RSA";
/// Key size in bits, as passed to the generator.
pub const KEY_SIZE_BITS: &str = "2048";
/// Certificate validity in days.
pub const VALIDITY_DAYS: &str = "10000";
/// Placeholder distinguished name for generated keys.
pub const PLACEHOLDER_DN: &str = "CN=Unknown,OU=Unknown,O=Unknown,L=Unknown,ST=Unknown,C=US";

/// Check that a keystore exists and opens with the given password.
///
/// A missing path short-circuits to `false` without spawning the keystore
/// tool. Tool failures (wrong password, corrupt store) also yield `false`;
/// this function never errors.
pub async fn validate_keystore(
    backend: &dyn AndroidBackend,
    keystore: &Path,
    password: &str,
) -> bool {
    if !keystore.exists() {
        warn!(keystore = %keystore.display(), "keystore file not found");
        return false;
    }

    match backend.validate_keystore(keystore, password).await {
        Ok(()) => true,
        Err(err) => {
            warn!(keystore = %keystore.display(), %err, "keystore validation failed");
            false
        }
    }
}

/// Generate a new keystore in `dir`, named by the current timestamp.
///
/// On failure, a partially written keystore file is removed best-effort
/// before the error propagates.
pub async fn create_keystore(
    backend: &dyn AndroidBackend,
    dir: &Path,
    password: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let keystore = dir.join(format!(
        "keystore_{}.keystore",
        Local::now().format("%Y%m%d%H%M%S")
    ));

    match backend.generate_keystore(&keystore, password).await {
        Ok(()) => {
            info!(keystore = %keystore.display(), "created keystore");
            Ok(keystore)
        }
        Err(err) => {
            if keystore.exists() {
                if let Err(remove_err) = std::fs::remove_file(&keystore) {
                    warn!(
                        keystore = %keystore.display(),
                        %remove_err,
                        "failed to remove partial keystore"
                    );
                }
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    use crate::SigningError;

    /// Backend that records whether any tool call was made and can be set
    /// to fail keystore generation after creating a partial file.
    struct RecordingBackend {
        invoked: AtomicBool,
        fail_generate: bool,
    }

    impl RecordingBackend {
        fn new(fail_generate: bool) -> Self {
            Self {
                invoked: AtomicBool::new(false),
                fail_generate,
            }
        }
    }

    #[async_trait]
    impl AndroidBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn validate_keystore(&self, _keystore: &Path, password: &str) -> Result<()> {
            self.invoked.store(true, Ordering::SeqCst);
            if password == "correct" {
                Ok(())
            } else {
                Err(SigningError::Io(std::io::Error::other("bad password")))
            }
        }

        async fn generate_keystore(&self, keystore: &Path, _password: &str) -> Result<()> {
            self.invoked.store(true, Ordering::SeqCst);
            std::fs::write(keystore, b"partial keystore bytes").unwrap();
            if self.fail_generate {
                Err(SigningError::Io(std::io::Error::other("generator exploded")))
            } else {
                Ok(())
            }
        }

        async fn is_signed(&self, _archive: &Path) -> Result<bool> {
            Ok(false)
        }

        async fn sign(&self, _archive: &Path, _keystore: &Path, _password: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_validate_missing_path_skips_backend() {
        let backend = RecordingBackend::new(false);
        let temp = TempDir::new().unwrap();

        let valid =
            validate_keystore(&backend, &temp.path().join("absent.keystore"), "pw").await;

        assert!(!valid);
        assert!(!backend.invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_validate_wrong_password_is_false_not_error() {
        let backend = RecordingBackend::new(false);
        let temp = TempDir::new().unwrap();
        let keystore = temp.path().join("store.keystore");
        std::fs::write(&keystore, b"store").unwrap();

        assert!(validate_keystore(&backend, &keystore, "correct").await);
        assert!(!validate_keystore(&backend, &keystore, "wrong").await);
    }

    #[tokio::test]
    async fn test_create_keystore_names_by_timestamp() {
        let backend = RecordingBackend::new(false);
        let temp = TempDir::new().unwrap();

        let keystore = create_keystore(&backend, temp.path(), "pw").await.unwrap();

        let name = keystore.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("keystore_"));
        assert!(name.ends_with(".keystore"));
        assert!(keystore.exists());
    }

    #[tokio::test]
    async fn test_create_keystore_failure_removes_partial_file() {
        let backend = RecordingBackend::new(true);
        let temp = TempDir::new().unwrap();

        let err = create_keystore(&backend, temp.path(), "pw").await.unwrap_err();

        assert!(err.to_string().contains("generator exploded"));
        let leftovers: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
