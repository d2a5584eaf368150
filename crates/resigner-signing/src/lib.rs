//! Resigner Signing - package re-signing engine
//!
//! This crate re-signs mobile packages with a new identity:
//! - Android: APK archives, signed with a keystore via the JDK jar tools
//! - iOS: IPA archives, signed with an installed certificate and a
//!   provisioning profile via the Apple security tools
//!
//! External signing tools are reached through the capability traits in
//! [`backend`]; platforms without the tools fail loudly instead of
//! pretending to sign.

pub mod backend;
pub mod backends;
pub mod credentials;
pub mod error;
pub mod keystore;
pub mod profile;
pub mod resign;

pub use backend::{AndroidBackend, IosBackend};
pub use backends::{CodesignBackend, JarsignerBackend};
pub use error::{Result, SigningError};
pub use resign::{ApkResigner, IpaResigner};
