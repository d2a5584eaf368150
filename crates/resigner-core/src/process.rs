//! External tool invocation

use std::ffi::OsString;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Run an external tool and capture its output.
///
/// Stdout and stderr are merged into a single text blob; the calling task is
/// suspended until the process exits. A zero exit code yields the merged
/// output. A non-zero exit code yields [`CoreError::Tool`] carrying the exit
/// code and the full output. There are no retries: transient tool failures
/// surface directly to the caller.
pub async fn run<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    debug!(program, ?args, "running external tool");

    let output = Command::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| CoreError::ToolLaunch {
            program: program.to_string(),
            source,
        })?;

    let merged = merge_output(&output.stdout, &output.stderr);

    if !output.status.success() {
        return Err(CoreError::Tool {
            program: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            output: merged,
        });
    }

    Ok(merged)
}

fn merge_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut merged = String::from_utf8_lossy(stdout).into_owned();
    let stderr = String::from_utf8_lossy(stderr);

    if !stderr.is_empty() {
        if !merged.is_empty() && !merged.ends_with('\n') {
            merged.push('\n');
        }
        merged.push_str(&stderr);
    }

    merged
}
