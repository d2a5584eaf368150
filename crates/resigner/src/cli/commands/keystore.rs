//! Keystore command

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use resigner_signing::credentials::{FileCredentialStore, SecureValueStore};
use resigner_signing::{keystore, AndroidBackend, JarsignerBackend, SigningError};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Create or validate Android keystores
#[derive(Debug, Args)]
pub struct KeystoreCommand {
    #[command(subcommand)]
    pub command: KeystoreSubcommand,
}

/// Keystore subcommands
#[derive(Debug, Subcommand)]
pub enum KeystoreSubcommand {
    /// Generate a new keystore with a single signing key
    Create(CreateArgs),

    /// Check that a keystore opens with the given password
    Validate(ValidateArgs),
}

/// Generate a new keystore
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Directory to create the keystore in (defaults to the resigner
    /// temp root)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Keystore password (prompted with confirmation when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Remember the password for the new keystore
    #[arg(long)]
    pub save_password: bool,
}

/// Validate a keystore
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the keystore
    #[arg(required = true)]
    pub keystore: PathBuf,

    /// Keystore password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

impl KeystoreCommand {
    /// Execute the keystore command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;

        match &self.command {
            KeystoreSubcommand::Create(cmd) => rt.block_on(cmd.execute(cli)),
            KeystoreSubcommand::Validate(cmd) => rt.block_on(cmd.execute(cli)),
        }
    }
}

impl CreateArgs {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let backend = JarsignerBackend::new();
        if !backend.is_available() {
            return Err(SigningError::UnsupportedPlatform {
                backend: backend.name().to_string(),
            }
            .into());
        }

        let password = match &self.password {
            Some(password) => password.clone(),
            None => dialoguer::Password::new()
                .with_prompt("New keystore password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
        };

        let dir = self
            .out_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("apk-resign"));

        let keystore_path = keystore::create_keystore(&backend, &dir, &password).await?;

        if self.save_password {
            let Some(store_path) = FileCredentialStore::default_path() else {
                output::warning("No home directory; password not saved");
                return report(cli, &keystore_path);
            };
            let mut store = FileCredentialStore::open(store_path);
            let key = FileCredentialStore::keystore_password_key(&keystore_path);
            store.set(&key, &password)?;
            info!(keystore = %keystore_path.display(), "saved keystore password");
        }

        report(cli, &keystore_path)
    }
}

fn report(cli: &Cli, keystore_path: &std::path::Path) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "keystore": keystore_path }));
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(&format!(
                    "Created keystore at {}",
                    output::path_style().apply_to(keystore_path.display())
                ));
            }
        }
    }
    Ok(())
}

impl ValidateArgs {
    async fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let backend = JarsignerBackend::new();
        if !backend.is_available() {
            return Err(SigningError::UnsupportedPlatform {
                backend: backend.name().to_string(),
            }
            .into());
        }

        let password = match &self.password {
            Some(password) => password.clone(),
            None => dialoguer::Password::new()
                .with_prompt("Keystore password")
                .interact()?,
        };

        let valid = keystore::validate_keystore(&backend, &self.keystore, &password).await;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "valid": valid }));
            }
            OutputFormat::Text => {
                if valid {
                    output::success("Keystore and password are valid");
                } else {
                    output::error("Keystore could not be opened with that password");
                }
            }
        }

        if !valid {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        Ok(())
    }
}
