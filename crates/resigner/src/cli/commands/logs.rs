//! Logs command - show recent entries from the persisted log

use clap::Args;
use std::path::PathBuf;

use crate::cli::{output, Cli};

/// Show recent log output
#[derive(Debug, Args)]
pub struct LogsCommand {
    /// Number of lines to show
    #[arg(short = 'n', long, default_value = "100")]
    pub lines: usize,
}

impl LogsCommand {
    /// Execute the logs command
    pub fn execute(&self, _cli: &Cli) -> anyhow::Result<()> {
        let Some(log_file) = newest_log_file() else {
            output::warning("No log files found");
            return Ok(());
        };

        let content = std::fs::read_to_string(&log_file)?;
        let all: Vec<&str> = content.lines().collect();
        let start = all.len().saturating_sub(self.lines);
        for line in &all[start..] {
            println!("{line}");
        }

        Ok(())
    }
}

/// The most recently modified file in the log directory.
fn newest_log_file() -> Option<PathBuf> {
    let log_dir = dirs::home_dir()?.join(".resigner").join("logs");

    std::fs::read_dir(log_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .max_by_key(|entry| {
            entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        })
        .map(|entry| entry.path())
}
