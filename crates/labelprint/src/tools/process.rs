//! Subprocess execution.

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::ToolStatus;
use crate::error::{Error, Result};

/// Run `program` with `args` and wait for it to exit.
///
/// The child inherits stdout and stderr so its diagnostics reach the operator
/// verbatim. It is killed if the returned future is dropped before completion,
/// which is how an interrupted dispatch stops its subprocess.
///
/// # Errors
///
/// Returns [`Error::ToolSpawn`] if the program cannot be started or waited on.
pub async fn run_tool<I, S>(program: &str, args: I) -> Result<ToolStatus>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    debug!(?command, "Running external tool");

    let status = command
        .status()
        .await
        .map_err(|source| Error::tool_spawn(program, source))?;

    let status = ToolStatus::from(status);
    debug!(program, %status, "External tool finished");
    Ok(status)
}
