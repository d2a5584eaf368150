//! Error types for signing operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Signing-related errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// Input package missing
    #[error("Package not found: {0}")]
    PackageNotFound(PathBuf),

    /// Keystore file missing
    #[error("Keystore not found: {0}")]
    KeystoreNotFound(PathBuf),

    /// Provisioning profile missing
    #[error("Provisioning profile not found: {0}")]
    ProfileNotFound(PathBuf),

    /// No .app bundle inside the extracted package
    #[error("No .app bundle found in {0}")]
    BundleNotFound(PathBuf),

    /// Provisioning profile carries no usable team identifier
    #[error("No team identifier found in provisioning profile {0}")]
    TeamIdentifierNotFound(PathBuf),

    /// No matching signing identity installed
    #[error("Signing identity not found: {0}")]
    IdentityNotFound(String),

    /// Signing backend's tools are absent on this platform
    #[error("Signing backend '{backend}' is not available on this platform")]
    UnsupportedPlatform { backend: String },

    /// Core plumbing failure (tool invocation, archive, staging)
    #[error(transparent)]
    Core(#[from] resigner_core::CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
