//! IPA resigning pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use resigner_core::{archive, Workspace};

use crate::backend::IosBackend;
use crate::error::{Result, SigningError};
use crate::profile;

use super::{move_file, operation_key, output_path};

/// Temp subtree all IPA working directories live under.
const WORKSPACE_KIND: &str = "ipa-resign";
/// Directory suffix marking the app bundle inside the archive.
const BUNDLE_SUFFIX: &str = ".app";
/// Profile file name expected inside the bundle.
const EMBEDDED_PROFILE: &str = "embedded.mobileprovision";
/// Suffix appended to the input stem for the output archive.
const OUTPUT_SUFFIX: &str = "_resigned";

/// Re-signs IPA archives with an installed identity and a provisioning
/// profile.
pub struct IpaResigner {
    backend: Arc<dyn IosBackend>,
}

impl IpaResigner {
    /// Create a resigner on top of the given backend.
    pub fn new(backend: Arc<dyn IosBackend>) -> Self {
        Self { backend }
    }

    /// Re-sign `ipa` with `profile`, producing `<stem>_resigned.ipa`
    /// beside the input.
    ///
    /// The profile is embedded into the bundle as
    /// `embedded.mobileprovision` and its team identifier selects the
    /// signing identity. Every failure is a typed error; on failure no
    /// output archive exists at the output path, and the working directory
    /// is removed either way.
    pub async fn resign(&self, ipa: &Path, profile_path: &Path) -> Result<PathBuf> {
        if !ipa.is_file() {
            return Err(SigningError::PackageNotFound(ipa.to_path_buf()));
        }
        if !profile_path.is_file() {
            return Err(SigningError::ProfileNotFound(profile_path.to_path_buf()));
        }
        if !self.backend.is_available() {
            return Err(SigningError::UnsupportedPlatform {
                backend: self.backend.name().to_string(),
            });
        }

        let output = output_path(ipa, OUTPUT_SUFFIX, "ipa");
        let workspace = Workspace::create(WORKSPACE_KIND, &operation_key(ipa))?;
        let result = self
            .resign_in(workspace.path(), ipa, profile_path, &output)
            .await;
        workspace.close();

        match &result {
            Ok(path) => info!(output = %path.display(), "resigned IPA"),
            Err(err) => error!(ipa = %ipa.display(), %err, "failed to resign IPA"),
        }
        result
    }

    async fn resign_in(
        &self,
        work: &Path,
        ipa: &Path,
        profile_path: &Path,
        output: &Path,
    ) -> Result<PathBuf> {
        let unzip = work.join("unzip");
        std::fs::create_dir_all(&unzip)?;
        archive::extract(ipa, &unzip)?;

        let bundle = find_bundle_dir(&unzip)?;

        let embedded = bundle.join(EMBEDDED_PROFILE);
        tokio::fs::copy(profile_path, &embedded).await?;

        let identity = profile::team_identifier(self.backend.as_ref(), profile_path)
            .await?
            .ok_or_else(|| SigningError::TeamIdentifierNotFound(profile_path.to_path_buf()))?;

        self.backend
            .sign_bundle(&identity, &embedded, &bundle)
            .await?;

        // Repack into the workspace first so a half-written archive can
        // never be observed at the output path.
        let staged = work.join(
            output
                .file_name()
                .ok_or_else(|| SigningError::PackageNotFound(output.to_path_buf()))?,
        );
        archive::create(&unzip, &staged)?;

        if output.exists() {
            tokio::fs::remove_file(output).await?;
        }
        move_file(&staged, output).await?;

        Ok(output.to_path_buf())
    }
}

/// Locate the app bundle: the immediate subdirectory of `root` whose name
/// ends in `.app` (case-insensitive). No bundle, no resign.
fn find_bundle_dir(root: &Path) -> Result<PathBuf> {
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir()
            && entry
                .file_name()
                .to_string_lossy()
                .to_ascii_lowercase()
                .ends_with(BUNDLE_SUFFIX)
        {
            return Ok(path);
        }
    }
    Err(SigningError::BundleNotFound(root.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{ZipArchive, ZipWriter};

    const PROFILE_BYTES: &[u8] = b"signed profile blob \x00\x01\x02";

    const DECODED_PROFILE: &str = "<key>TeamIdentifier</key>\n<array>\n\t<string>TEAM12345</string>\n</array>\n";

    /// Backend that returns canned decode output and records sign calls.
    struct FakeIosBackend {
        available: bool,
        decoded_profile: Option<String>,
        sign_calls: Mutex<Vec<(String, PathBuf, PathBuf)>>,
    }

    impl FakeIosBackend {
        fn working() -> Self {
            Self {
                available: true,
                decoded_profile: Some(DECODED_PROFILE.to_string()),
                sign_calls: Mutex::new(Vec::new()),
            }
        }

        fn without_team_identifier() -> Self {
            Self {
                available: true,
                decoded_profile: Some("<key>Name</key>\n<string>profile</string>\n".to_string()),
                sign_calls: Mutex::new(Vec::new()),
            }
        }

        fn sign_call_count(&self) -> usize {
            self.sign_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl IosBackend for FakeIosBackend {
        fn name(&self) -> &str {
            "fake"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn list_identities(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn decode_profile(&self, _profile: &Path) -> Result<String> {
            match &self.decoded_profile {
                Some(text) => Ok(text.clone()),
                None => Err(SigningError::Io(std::io::Error::other("decode failed"))),
            }
        }

        async fn sign_bundle(
            &self,
            identity: &str,
            entitlements: &Path,
            bundle: &Path,
        ) -> Result<()> {
            self.sign_calls.lock().unwrap().push((
                identity.to_string(),
                entitlements.to_path_buf(),
                bundle.to_path_buf(),
            ));
            Ok(())
        }
    }

    fn write_ipa(path: &Path, bundle_name: Option<&str>) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        if let Some(bundle) = bundle_name {
            zip.add_directory(format!("{bundle}/"), options).unwrap();
            zip.start_file(format!("{bundle}/Info.plist"), options).unwrap();
            zip.write_all(b"<plist/>").unwrap();
            zip.start_file(
                format!("{bundle}/Runner"),
                SimpleFileOptions::default().unix_permissions(0o755),
            )
            .unwrap();
            zip.write_all(b"executable bytes").unwrap();
        } else {
            zip.start_file("README.txt", options).unwrap();
            zip.write_all(b"no bundle here").unwrap();
        }

        zip.finish().unwrap();
    }

    fn write_profile(dir: &Path) -> PathBuf {
        let profile = dir.join("dist.mobileprovision");
        std::fs::write(&profile, PROFILE_BYTES).unwrap();
        profile
    }

    fn read_entry(archive: &Path, name: &str) -> Vec<u8> {
        let file = File::open(archive).unwrap();
        let mut zip = ZipArchive::new(file).unwrap();
        let mut entry = zip.by_name(name).unwrap();
        let mut bytes = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_resign_embeds_profile_and_signs_bundle() {
        let temp = TempDir::new().unwrap();
        let ipa = temp.path().join("bundleapp.ipa");
        write_ipa(&ipa, Some("Foo.app"));
        let profile = write_profile(temp.path());
        let input_bytes = std::fs::read(&ipa).unwrap();

        let backend = Arc::new(FakeIosBackend::working());
        let resigner = IpaResigner::new(backend.clone());
        let output = resigner.resign(&ipa, &profile).await.unwrap();

        assert_eq!(output, temp.path().join("bundleapp_resigned.ipa"));

        // Embedded profile is byte-for-byte the supplied profile.
        assert_eq!(
            read_entry(&output, "Foo.app/embedded.mobileprovision"),
            PROFILE_BYTES
        );
        assert_eq!(read_entry(&output, "Foo.app/Info.plist"), b"<plist/>");

        // The bundle was signed with the profile's team identifier and the
        // embedded profile as entitlements source.
        let calls = backend.sign_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (identity, entitlements, bundle) = &calls[0];
        assert_eq!(identity, "TEAM12345");
        assert!(entitlements.ends_with("Foo.app/embedded.mobileprovision"));
        assert!(bundle.ends_with("Foo.app"));
        drop(calls);

        assert_eq!(std::fs::read(&ipa).unwrap(), input_bytes);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resign_keeps_bundle_executable_bit() {
        let temp = TempDir::new().unwrap();
        let ipa = temp.path().join("execapp.ipa");
        write_ipa(&ipa, Some("Exec.app"));
        let profile = write_profile(temp.path());

        let resigner = IpaResigner::new(Arc::new(FakeIosBackend::working()));
        let output = resigner.resign(&ipa, &profile).await.unwrap();

        let file = File::open(&output).unwrap();
        let mut zip = ZipArchive::new(file).unwrap();
        let entry = zip.by_name("Exec.app/Runner").unwrap();
        let mode = entry.unix_mode().unwrap();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[tokio::test]
    async fn test_missing_bundle_aborts_before_signing() {
        let temp = TempDir::new().unwrap();
        let ipa = temp.path().join("nobundle.ipa");
        write_ipa(&ipa, None);
        let profile = write_profile(temp.path());

        let backend = Arc::new(FakeIosBackend::working());
        let resigner = IpaResigner::new(backend.clone());
        let err = resigner.resign(&ipa, &profile).await.unwrap_err();

        assert!(matches!(err, SigningError::BundleNotFound(_)));
        assert_eq!(backend.sign_call_count(), 0);
        assert!(!temp.path().join("nobundle_resigned.ipa").exists());
    }

    #[tokio::test]
    async fn test_missing_team_identifier_aborts_before_signing() {
        let temp = TempDir::new().unwrap();
        let ipa = temp.path().join("noteam.ipa");
        write_ipa(&ipa, Some("Foo.app"));
        let profile = write_profile(temp.path());

        let backend = Arc::new(FakeIosBackend::without_team_identifier());
        let resigner = IpaResigner::new(backend.clone());
        let err = resigner.resign(&ipa, &profile).await.unwrap_err();

        assert!(matches!(err, SigningError::TeamIdentifierNotFound(_)));
        assert_eq!(backend.sign_call_count(), 0);
        assert!(!temp.path().join("noteam_resigned.ipa").exists());
    }

    #[tokio::test]
    async fn test_missing_profile_is_precondition_failure() {
        let temp = TempDir::new().unwrap();
        let ipa = temp.path().join("noprofile.ipa");
        write_ipa(&ipa, Some("Foo.app"));

        let resigner = IpaResigner::new(Arc::new(FakeIosBackend::working()));
        let err = resigner
            .resign(&ipa, &temp.path().join("ghost.mobileprovision"))
            .await
            .unwrap_err();

        assert!(matches!(err, SigningError::ProfileNotFound(_)));
    }

    #[test]
    fn test_find_bundle_dir_case_insensitive() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Payload.APP")).unwrap();

        let bundle = find_bundle_dir(temp.path()).unwrap();
        assert!(bundle.ends_with("Payload.APP"));
    }

    #[test]
    fn test_find_bundle_dir_ignores_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("decoy.app"), b"a file, not a dir").unwrap();

        let err = find_bundle_dir(temp.path()).unwrap_err();
        assert!(matches!(err, SigningError::BundleNotFound(_)));
    }
}
