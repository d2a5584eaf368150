//! End-to-end resign pipelines, one per package format
//!
//! Both pipelines share a shape: stage a private copy of the input,
//! normalize its signature state, hand it to the signing backend, and move
//! the finished archive next to the input. The input file itself is never
//! touched, and the staged working directory is removed whether the
//! operation succeeds or fails.

mod apk;
mod ipa;

pub use apk::ApkResigner;
pub use ipa::IpaResigner;

use std::path::{Path, PathBuf};

/// `<stem><suffix>.<extension>` next to the input file.
pub(crate) fn output_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.{extension}"))
}

/// Working-directory key for an input file: its base name without
/// extension.
pub(crate) fn operation_key(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package".to_string())
}

/// Move a finished artifact into place, falling back to copy-and-remove
/// when source and target sit on different filesystems.
pub(crate) async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(_) => {
            tokio::fs::copy(from, to).await?;
            tokio::fs::remove_file(from).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            output_path(Path::new("/data/app.apk"), "_signed", "apk"),
            PathBuf::from("/data/app_signed.apk")
        );
        assert_eq!(
            output_path(Path::new("bundle.ipa"), "_resigned", "ipa"),
            PathBuf::from("bundle_resigned.ipa")
        );
    }

    #[test]
    fn test_operation_key_is_stem() {
        assert_eq!(operation_key(Path::new("/data/my.app.apk")), "my.app");
    }
}
