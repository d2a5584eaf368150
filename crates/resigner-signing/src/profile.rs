//! iOS signing identity discovery and provisioning profile inspection

use std::path::Path;
use tracing::warn;

use crate::backend::IosBackend;
use crate::error::Result;

/// Substrings marking a development signing certificate in a
/// `find-identity` listing.
const DEVELOPER_CERT_MARKERS: [&str; 2] = ["iPhone Developer", "Apple Development"];

/// Plist key whose following line holds the team identifier.
const TEAM_IDENTIFIER_KEY: &str = "<key>TeamIdentifier</key>";

/// Discover an installed development signing certificate.
///
/// Returns the quoted display name of the first matching identity, or
/// `None` when the trust store lists no development certificate. An absent
/// certificate is a normal answer, not an error.
pub async fn find_development_identity(backend: &dyn IosBackend) -> Result<Option<String>> {
    let listing = backend.list_identities().await?;
    Ok(parse_development_identity(&listing))
}

/// Read the team identifier out of a provisioning profile.
///
/// The profile's signed property list is decoded and scanned line by line.
/// `None` means the profile carries no team identifier or could not be
/// decoded; callers must treat that as a precondition failure and abort
/// before signing.
pub async fn team_identifier(backend: &dyn IosBackend, profile: &Path) -> Result<Option<String>> {
    let decoded = match backend.decode_profile(profile).await {
        Ok(text) => text,
        Err(err) => {
            warn!(profile = %profile.display(), %err, "failed to decode provisioning profile");
            return Ok(None);
        }
    };

    Ok(parse_team_identifier(&decoded))
}

/// Extract the first development certificate name from a
/// `find-identity` listing line like:
/// `  1) ABC123 "Apple Development: Jane Appleseed (TEAM12345)"`
fn parse_development_identity(listing: &str) -> Option<String> {
    let line = listing
        .lines()
        .find(|line| DEVELOPER_CERT_MARKERS.iter().any(|marker| line.contains(marker)))?;

    let mut parts = line.split('"');
    parts.nth(1).map(str::to_string)
}

/// Scan decoded profile text for the value following the `TeamIdentifier`
/// key, stripping its string markup.
fn parse_team_identifier(plist: &str) -> Option<String> {
    let mut lines = plist.lines();
    while let Some(line) = lines.next() {
        if !line.contains(TEAM_IDENTIFIER_KEY) {
            continue;
        }

        // The value sits on the next line, or one further when wrapped in
        // a one-element <array>.
        let mut value = lines.next()?;
        if value.trim() == "<array>" {
            value = lines.next()?;
        }

        let value = value
            .trim()
            .replace("<string>", "")
            .replace("</string>", "");
        return Some(value).filter(|v| !v.is_empty() && !v.starts_with('<'));
    }
    None
}
