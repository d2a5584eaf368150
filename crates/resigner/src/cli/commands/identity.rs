//! Identity command

use clap::{Args, Subcommand};
use std::path::PathBuf;

use resigner_signing::{profile, CodesignBackend, IosBackend, SigningError};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Inspect iOS signing identities and provisioning profiles
#[derive(Debug, Args)]
pub struct IdentityCommand {
    #[command(subcommand)]
    pub command: IdentitySubcommand,
}

/// Identity subcommands
#[derive(Debug, Subcommand)]
pub enum IdentitySubcommand {
    /// Show the installed development signing certificate
    List(ListArgs),

    /// Show the team identifier of a provisioning profile
    Team(TeamArgs),
}

/// Show the installed development signing certificate
#[derive(Debug, Args)]
pub struct ListArgs {}

/// Show the team identifier of a provisioning profile
#[derive(Debug, Args)]
pub struct TeamArgs {
    /// Path to the provisioning profile
    #[arg(required = true)]
    pub profile: PathBuf,
}

impl IdentityCommand {
    /// Execute the identity command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let backend = CodesignBackend::new();
        if !backend.is_available() {
            return Err(SigningError::UnsupportedPlatform {
                backend: backend.name().to_string(),
            }
            .into());
        }

        let rt = tokio::runtime::Runtime::new()?;

        match &self.command {
            IdentitySubcommand::List(cmd) => rt.block_on(cmd.execute(cli, &backend)),
            IdentitySubcommand::Team(cmd) => rt.block_on(cmd.execute(cli, &backend)),
        }
    }
}

impl ListArgs {
    async fn execute(&self, cli: &Cli, backend: &CodesignBackend) -> anyhow::Result<()> {
        let identity = profile::find_development_identity(backend).await?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "identity": identity }));
            }
            OutputFormat::Text => match &identity {
                Some(name) => output::success(name),
                None => output::warning("No development signing identity installed"),
            },
        }

        if identity.is_none() {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        Ok(())
    }
}

impl TeamArgs {
    async fn execute(&self, cli: &Cli, backend: &CodesignBackend) -> anyhow::Result<()> {
        if !self.profile.is_file() {
            return Err(SigningError::ProfileNotFound(self.profile.clone()).into());
        }

        let team = profile::team_identifier(backend, &self.profile).await?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "team_identifier": team }));
            }
            OutputFormat::Text => match &team {
                Some(id) => output::success(id),
                None => output::warning("Profile carries no team identifier"),
            },
        }

        if team.is_none() {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }
        Ok(())
    }
}
