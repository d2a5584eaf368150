//! Signing backend capability traits
//!
//! Each resign pipeline talks to its external signing tools through one of
//! these traits. Production implementations live in [`crate::backends`];
//! when a platform lacks the tools, `is_available` reports it and callers
//! fail with [`crate::SigningError::UnsupportedPlatform`] before touching
//! the input, never silently skipping the work.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Capability for signing Android packages with a keystore credential.
#[async_trait]
pub trait AndroidBackend: Send + Sync {
    /// Backend name, for logs and error messages.
    fn name(&self) -> &str;

    /// Whether the backing tools exist on this system.
    fn is_available(&self) -> bool;

    /// Open the keystore with the given password; an error means invalid.
    async fn validate_keystore(&self, keystore: &Path, password: &str) -> Result<()>;

    /// Generate a fresh single-key keystore at `keystore`.
    async fn generate_keystore(&self, keystore: &Path, password: &str) -> Result<()>;

    /// Whether the archive carries a verifiable jar signature.
    async fn is_signed(&self, archive: &Path) -> Result<bool>;

    /// Sign `archive` in place with the key under the fixed alias.
    async fn sign(&self, archive: &Path, keystore: &Path, password: &str) -> Result<()>;
}

/// Capability for signing iOS bundles with an installed identity.
#[async_trait]
pub trait IosBackend: Send + Sync {
    /// Backend name, for logs and error messages.
    fn name(&self) -> &str;

    /// Whether the backing tools exist on this system.
    fn is_available(&self) -> bool;

    /// Raw listing of installed code-signing identities.
    async fn list_identities(&self) -> Result<String>;

    /// Decoded property-list text of a provisioning profile.
    async fn decode_profile(&self, profile: &Path) -> Result<String>;

    /// Sign `bundle` with `identity`, reading entitlements from
    /// `entitlements`.
    async fn sign_bundle(&self, identity: &str, entitlements: &Path, bundle: &Path) -> Result<()>;
}
