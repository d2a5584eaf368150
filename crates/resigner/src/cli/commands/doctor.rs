//! Doctor command - check environment for the required signing tools

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Check environment for the required signing tools
#[derive(Debug, Args)]
pub struct DoctorCommand {}

/// Result of a single tool check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub tool: String,
    pub pipeline: String,
    pub found: bool,
    pub path: Option<String>,
}

/// Tools each pipeline depends on
const REQUIRED_TOOLS: [(&str, &str); 4] = [
    ("keytool", "apk"),
    ("jarsigner", "apk"),
    ("security", "ipa"),
    ("codesign", "ipa"),
];

impl DoctorCommand {
    /// Execute the doctor command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing doctor command");

        let checks: Vec<CheckResult> = REQUIRED_TOOLS
            .iter()
            .map(|(tool, pipeline)| {
                let path = which::which(tool).ok();
                CheckResult {
                    tool: tool.to_string(),
                    pipeline: pipeline.to_string(),
                    found: path.is_some(),
                    path: path.map(|p| p.display().to_string()),
                }
            })
            .collect();

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&checks)?);
            }
            OutputFormat::Text => {
                for check in &checks {
                    let marker = if check.found {
                        style("✓").green().bold()
                    } else {
                        style("✗").red().bold()
                    };
                    let location = check.path.as_deref().unwrap_or("not found");
                    println!(
                        "{} {:<10} [{}] {}",
                        marker,
                        check.tool,
                        check.pipeline,
                        style(location).dim()
                    );
                }

                let apk_ready = checks.iter().filter(|c| c.pipeline == "apk").all(|c| c.found);
                let ipa_ready = checks.iter().filter(|c| c.pipeline == "ipa").all(|c| c.found);
                println!();
                println!(
                    "APK resigning: {}",
                    if apk_ready { "ready" } else { "unavailable" }
                );
                println!(
                    "IPA resigning: {}",
                    if ipa_ready { "ready" } else { "unavailable" }
                );
            }
        }

        // Either pipeline being usable counts as a healthy environment.
        let any_pipeline = ["apk", "ipa"].iter().any(|pipeline| {
            checks
                .iter()
                .filter(|c| &c.pipeline == pipeline)
                .all(|c| c.found)
        });
        if !any_pipeline {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }

        Ok(())
    }
}
