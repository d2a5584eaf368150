//! Android signing backend using the JDK keytool and jarsigner tools

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use resigner_core::{process, CoreError};

use crate::backend::AndroidBackend;
use crate::error::Result;
use crate::keystore::{KEY_ALGORITHM, KEY_ALIAS, KEY_SIZE_BITS, PLACEHOLDER_DN, VALIDITY_DAYS};

/// Signs APKs with `jarsigner` and manages keystores with `keytool`.
///
/// Both tools ship with the JDK and are resolved from `PATH`.
pub struct JarsignerBackend {
    keytool: String,
    jarsigner: String,
}

impl JarsignerBackend {
    /// Create a backend resolving `keytool` and `jarsigner` from `PATH`.
    pub fn new() -> Self {
        Self {
            keytool: "keytool".to_string(),
            jarsigner: "jarsigner".to_string(),
        }
    }
}

impl Default for JarsignerBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AndroidBackend for JarsignerBackend {
    fn name(&self) -> &str {
        "jarsigner"
    }

    fn is_available(&self) -> bool {
        which::which(&self.keytool).is_ok() && which::which(&self.jarsigner).is_ok()
    }

    async fn validate_keystore(&self, keystore: &Path, password: &str) -> Result<()> {
        let store = keystore.to_string_lossy();
        process::run(
            &self.keytool,
            ["-list", "-v", "-keystore", store.as_ref(), "-storepass", password],
        )
        .await?;
        Ok(())
    }

    async fn generate_keystore(&self, keystore: &Path, password: &str) -> Result<()> {
        let store = keystore.to_string_lossy();
        info!(keystore = %keystore.display(), "generating keystore");
        process::run(
            &self.keytool,
            [
                "-genkey",
                "-v",
                "-keystore",
                store.as_ref(),
                "-alias",
                KEY_ALIAS,
                "-keyalg",
                KEY_ALGORITHM,
                "-keysize",
                KEY_SIZE_BITS,
                "-validity",
                VALIDITY_DAYS,
                "-storepass",
                password,
                "-keypass",
                password,
                "-dname",
                PLACEHOLDER_DN,
            ],
        )
        .await?;
        Ok(())
    }

    async fn is_signed(&self, archive: &Path) -> Result<bool> {
        let target = archive.to_string_lossy();
        match process::run(&self.jarsigner, ["-verify", target.as_ref()]).await {
            Ok(_) => Ok(true),
            // The verifier ran and rejected the archive: unsigned, not an
            // error. A verifier that could not be launched is still an error.
            Err(CoreError::Tool { status, output, .. }) => {
                debug!(status, %output, "jar verification reported unsigned");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn sign(&self, archive: &Path, keystore: &Path, password: &str) -> Result<()> {
        let store = keystore.to_string_lossy();
        let target = archive.to_string_lossy();
        info!(archive = %archive.display(), "signing with jarsigner");
        process::run(
            &self.jarsigner,
            [
                "-verbose",
                "-sigalg",
                "SHA1withRSA",
                "-digestalg",
                "SHA1",
                "-keystore",
                store.as_ref(),
                "-storepass",
                password,
                target.as_ref(),
                KEY_ALIAS,
            ],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name() {
        let backend = JarsignerBackend::new();
        assert_eq!(backend.name(), "jarsigner");
    }
}
