//! iOS signing backend using the Apple security and codesign tools

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use resigner_core::process;

use crate::backend::IosBackend;
use crate::error::Result;

/// Signs app bundles with `codesign` and queries the trust store and
/// provisioning profiles with `security`.
pub struct CodesignBackend {
    codesign: String,
    security: String,
}

impl CodesignBackend {
    /// Create a backend using the standard tool locations.
    pub fn new() -> Self {
        Self {
            codesign: "/usr/bin/codesign".to_string(),
            security: "/usr/bin/security".to_string(),
        }
    }
}

impl Default for CodesignBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IosBackend for CodesignBackend {
    fn name(&self) -> &str {
        "codesign"
    }

    fn is_available(&self) -> bool {
        Path::new(&self.codesign).exists() && Path::new(&self.security).exists()
    }

    async fn list_identities(&self) -> Result<String> {
        let output = process::run(
            &self.security,
            ["find-identity", "-v", "-p", "codesigning"],
        )
        .await?;
        Ok(output)
    }

    async fn decode_profile(&self, profile: &Path) -> Result<String> {
        let path = profile.to_string_lossy();
        let output = process::run(&self.security, ["cms", "-D", "-i", path.as_ref()]).await?;
        Ok(output)
    }

    async fn sign_bundle(&self, identity: &str, entitlements: &Path, bundle: &Path) -> Result<()> {
        let entitlements_path = entitlements.to_string_lossy();
        let bundle_path = bundle.to_string_lossy();
        info!(bundle = %bundle.display(), identity, "signing with codesign");
        process::run(
            &self.codesign,
            [
                "--force",
                "--sign",
                identity,
                "--entitlements",
                entitlements_path.as_ref(),
                bundle_path.as_ref(),
            ],
        )
        .await?;
        Ok(())
    }
}
