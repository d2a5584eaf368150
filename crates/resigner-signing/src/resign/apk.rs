//! APK resigning pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use resigner_core::{archive, Workspace};

use crate::backend::AndroidBackend;
use crate::error::{Result, SigningError};

use super::{move_file, operation_key, output_path};

/// Temp subtree all APK working directories live under.
const WORKSPACE_KIND: &str = "apk-resign";
/// Reserved archive directory holding jar signature metadata.
const SIGNATURE_DIR: &str = "META-INF";
/// Suffix appended to the input stem for the output archive.
const OUTPUT_SUFFIX: &str = "_signed";

/// Re-signs APK archives with a keystore credential.
pub struct ApkResigner {
    backend: Arc<dyn AndroidBackend>,
}

impl ApkResigner {
    /// Create a resigner on top of the given backend.
    pub fn new(backend: Arc<dyn AndroidBackend>) -> Self {
        Self { backend }
    }

    /// Re-sign `apk` with the key in `keystore`, producing
    /// `<stem>_signed.apk` beside the input.
    ///
    /// All work happens on a private copy in a scoped working directory.
    /// Moving the signed file to the output path is the commit point: an
    /// error anywhere before it leaves no output artifact behind, and the
    /// working directory is removed either way.
    pub async fn resign(&self, apk: &Path, keystore: &Path, password: &str) -> Result<PathBuf> {
        if !apk.is_file() {
            return Err(SigningError::PackageNotFound(apk.to_path_buf()));
        }
        if !keystore.is_file() {
            return Err(SigningError::KeystoreNotFound(keystore.to_path_buf()));
        }
        if !self.backend.is_available() {
            return Err(SigningError::UnsupportedPlatform {
                backend: self.backend.name().to_string(),
            });
        }

        let output = output_path(apk, OUTPUT_SUFFIX, "apk");
        let workspace = Workspace::create(WORKSPACE_KIND, &operation_key(apk))?;
        let result = self
            .resign_in(workspace.path(), apk, keystore, password, &output)
            .await;
        workspace.close();

        match &result {
            Ok(path) => info!(output = %path.display(), "resigned APK"),
            Err(err) => error!(apk = %apk.display(), %err, "failed to resign APK"),
        }
        result
    }

    async fn resign_in(
        &self,
        work: &Path,
        apk: &Path,
        keystore: &Path,
        password: &str,
        output: &Path,
    ) -> Result<PathBuf> {
        let file_name = apk
            .file_name()
            .ok_or_else(|| SigningError::PackageNotFound(apk.to_path_buf()))?;
        let working_apk = work.join(file_name);
        tokio::fs::copy(apk, &working_apk).await?;

        if self.backend.is_signed(&working_apk).await? {
            debug!(apk = %apk.display(), "existing signature detected, stripping");
            strip_signature(&working_apk, work)?;
        }

        self.backend.sign(&working_apk, keystore, password).await?;

        // Commit point: once the signed file lands at the output path the
        // operation has succeeded, whatever later cleanup does.
        if output.exists() {
            tokio::fs::remove_file(output).await?;
        }
        move_file(&working_apk, output).await?;

        Ok(output.to_path_buf())
    }
}

/// Rebuild `apk` without its signature metadata directory.
///
/// The archive is extracted into a scratch directory under `work`, the
/// top-level `META-INF/` tree is deleted if present (its absence is a
/// no-op), and the archive is recreated from the remaining tree. The
/// scratch directory is removed afterward regardless of outcome.
fn strip_signature(apk: &Path, work: &Path) -> Result<()> {
    let scratch = work.join("strip");

    let result = strip_into(apk, &scratch);

    if scratch.exists() {
        if let Err(err) = std::fs::remove_dir_all(&scratch) {
            warn!(scratch = %scratch.display(), %err, "failed to remove scratch directory");
        }
    }

    result
}

fn strip_into(apk: &Path, scratch: &Path) -> Result<()> {
    std::fs::create_dir_all(scratch)?;
    archive::extract(apk, scratch)?;

    let signature_dir = scratch.join(SIGNATURE_DIR);
    if signature_dir.is_dir() {
        std::fs::remove_dir_all(&signature_dir)?;
    }

    std::fs::remove_file(apk)?;
    archive::create(scratch, apk)?;
    Ok(())
}
