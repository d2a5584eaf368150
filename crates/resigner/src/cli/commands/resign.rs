//! Resign command

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use resigner_signing::credentials::{FileCredentialStore, SecureValueStore};
use resigner_signing::{ApkResigner, CodesignBackend, IpaResigner, JarsignerBackend};

use crate::cli::{output, Cli, OutputFormat};

/// Re-sign a package with a new identity
#[derive(Debug, Args)]
pub struct ResignCommand {
    #[command(subcommand)]
    pub command: ResignSubcommand,
}

/// Resign subcommands
#[derive(Debug, Subcommand)]
pub enum ResignSubcommand {
    /// Re-sign an Android package with a keystore
    Apk(ApkArgs),

    /// Re-sign an iOS package with a provisioning profile
    Ipa(IpaArgs),
}

/// Re-sign an Android package
#[derive(Debug, Args)]
pub struct ApkArgs {
    /// Path to the APK to re-sign
    #[arg(required = true)]
    pub apk: PathBuf,

    /// Keystore holding the signing key
    #[arg(short, long)]
    pub keystore: PathBuf,

    /// Keystore password (looked up in the credential store, then
    /// prompted, when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Remember the password for this keystore
    #[arg(long)]
    pub save_password: bool,
}

/// Re-sign an iOS package
#[derive(Debug, Args)]
pub struct IpaArgs {
    /// Path to the IPA to re-sign
    #[arg(required = true)]
    pub ipa: PathBuf,

    /// Provisioning profile to embed and sign with
    #[arg(short = 'P', long)]
    pub profile: PathBuf,
}

impl ResignCommand {
    /// Execute the resign command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;

        match &self.command {
            ResignSubcommand::Apk(cmd) => rt.block_on(cmd.execute(cli)),
            ResignSubcommand::Ipa(cmd) => rt.block_on(cmd.execute(cli)),
        }
    }
}

impl ApkArgs {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let password = self.resolve_password()?;
        info!(apk = %self.apk.display(), "resigning APK");

        let resigner = ApkResigner::new(Arc::new(JarsignerBackend::new()));
        let output_path = resigner.resign(&self.apk, &self.keystore, &password).await?;

        if self.save_password {
            save_password(&self.keystore, &password);
        }

        report_output(cli, &output_path);
        Ok(())
    }

    fn resolve_password(&self) -> anyhow::Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }

        if let Some(path) = FileCredentialStore::default_path() {
            let store = FileCredentialStore::open(path);
            let key = FileCredentialStore::keystore_password_key(&self.keystore);
            if let Some(saved) = store.get(&key) {
                info!(keystore = %self.keystore.display(), "using saved keystore password");
                return Ok(saved);
            }
        }

        Ok(dialoguer::Password::new()
            .with_prompt("Keystore password")
            .interact()?)
    }
}

impl IpaArgs {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(ipa = %self.ipa.display(), "resigning IPA");

        let resigner = IpaResigner::new(Arc::new(CodesignBackend::new()));
        let output_path = resigner.resign(&self.ipa, &self.profile).await?;

        report_output(cli, &output_path);
        Ok(())
    }
}

fn report_output(cli: &Cli, output_path: &Path) {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "output": output_path }));
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(&format!(
                    "Signed package written to {}",
                    output::path_style().apply_to(output_path.display())
                ));
            }
        }
    }
}

fn save_password(keystore: &Path, password: &str) {
    let Some(path) = FileCredentialStore::default_path() else {
        output::warning("No home directory; password not saved");
        return;
    };

    let mut store = FileCredentialStore::open(path);
    let key = FileCredentialStore::keystore_password_key(keystore);
    match store.set(&key, password) {
        Ok(()) => info!(keystore = %keystore.display(), "saved keystore password"),
        Err(err) => output::warning(&format!("Failed to save password: {err}")),
    }
}
