//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    CompletionsCommand, DoctorCommand, IdentityCommand, KeystoreCommand, LogsCommand,
    ResignCommand,
};

/// Resigner - re-sign Android and iOS packages with a new identity
#[derive(Debug, Parser)]
#[command(name = "resigner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Re-sign a package
    Resign(ResignCommand),

    /// Create or validate Android keystores
    Keystore(KeystoreCommand),

    /// Inspect iOS signing identities and provisioning profiles
    Identity(IdentityCommand),

    /// Check environment for the required signing tools
    Doctor(DoctorCommand),

    /// Show recent log output
    Logs(LogsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Resign(ref cmd) => cmd.execute(&self),
            Commands::Keystore(ref cmd) => cmd.execute(&self),
            Commands::Identity(ref cmd) => cmd.execute(&self),
            Commands::Doctor(ref cmd) => cmd.execute(&self),
            Commands::Logs(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }
}
