use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{info, warn};

use crate::context::Context;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const TRACE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A fully substituted process invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub arguments: Vec<String>,
    /// `KEY=VALUE` overrides layered on top of the inherited environment.
    pub environment: Vec<String>,
}

impl Invocation {
    fn environment_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.environment
            .iter()
            .filter_map(|entry| entry.split_once('='))
    }
}

impl Display for Invocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        for entry in &self.environment {
            write!(formatter, "{entry} ")?;
        }
        write!(formatter, "{}", self.program.display())?;
        for argument in &self.arguments {
            write!(formatter, " {argument}")?;
        }
        Ok(())
    }
}

/// Spawns `invocation` attached to the launcher's stdio and waits for it.
///
/// A timestamped trace line is printed to stdout before the process starts.
/// If `context` is cancelled while the process runs, the process is killed.
///
/// # Errors
///
/// Returns an error if the process cannot be started, exits with a non-zero
/// status, or is cancelled.
pub fn execute(invocation: &Invocation, context: &Context) -> Result<()> {
    let rendered = invocation.to_string();

    if context.is_cancelled() {
        return Err(Error::Cancelled { command: rendered });
    }

    println!("{} {}", Local::now().format(TRACE_TIME_FORMAT), rendered);

    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.arguments)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if !invocation.environment.is_empty() {
        info!("Executing with environment variables: {:?}", invocation.environment);
        command.envs(invocation.environment_pairs());
    }

    let mut child = command
        .spawn()
        .map_err(|e| Error::sub_process(rendered.clone(), e))?;

    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                return Err(Error::SubProcessExit {
                    command: rendered,
                    status,
                })
            }
            Ok(None) if context.is_cancelled() => {
                warn!("Cancelling `{rendered}`");
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Cancelled { command: rendered });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(Error::sub_process(rendered, e)),
        }
    }
}
