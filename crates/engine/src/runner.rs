//! Catalogue command execution.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use glide_go_core::{GlideError, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command as TokioCommand};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::catalogue::Catalogue;

/// A host request to run a catalogue command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Catalogue name of the command.
    pub name: String,

    /// Extra arguments appended verbatim.
    pub args: Vec<String>,

    /// Working directory; empty means the current directory.
    pub work_dir: String,

    /// Variables overlaid on the inherited environment.
    pub env: BTreeMap<String, String>,
}

/// Result of a command execution. Every failure is encoded here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: i32,

    /// Combined standard output and standard error, in arrival order.
    pub stdout: Vec<u8>,

    /// Always empty: stderr is merged into `stdout`.
    pub stderr: Vec<u8>,

    pub error: Option<String>,
}

/// Runs catalogue commands as child processes.
pub struct CommandRunner {
    catalogue: Arc<Catalogue>,
}

/// Which pipe a chunk of output came from.
enum Pipe {
    Stdout,
    Stderr,
}

impl Invocation {
    /// Creates an invocation with no arguments or overlay.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the extra arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the working directory.
    pub fn with_work_dir(mut self, dir: impl Into<String>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Adds an environment variable to the overlay.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The directory the child runs in.
    pub fn working_dir(&self) -> PathBuf {
        if self.work_dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.work_dir)
        }
    }
}

impl CommandResult {
    /// Builds the response for a failure that prevented or aborted the run.
    pub fn failure(error: &GlideError) -> Self {
        Self {
            success: false,
            exit_code: 1,
            stdout: Vec::new(),
            stderr: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    fn completed(status: ExitStatus, output: Vec<u8>) -> Self {
        // Terminated by a signal: there is no exit code to report.
        let exit_code = status.code().unwrap_or(-1);

        Self {
            success: exit_code == 0,
            exit_code,
            stdout: output,
            stderr: Vec::new(),
            error: None,
        }
    }
}

impl CommandRunner {
    /// Creates a runner over the given catalogue.
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self { catalogue }
    }

    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    /// Executes a catalogue command. Never fails: errors are reported in the
    /// result.
    pub async fn execute(&self, invocation: &Invocation, cancel: &CancelToken) -> CommandResult {
        match self.try_execute(invocation, cancel).await {
            Ok(result) => {
                info!(
                    "Command '{}' exited with code {}",
                    invocation.name, result.exit_code
                );
                result
            }
            Err(e) => {
                warn!("Command '{}' failed: {} ({})", invocation.name, e, e.kind());
                CommandResult::failure(&e)
            }
        }
    }

    async fn try_execute(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<CommandResult> {
        let definition = self
            .catalogue
            .get(&invocation.name)
            .ok_or_else(|| GlideError::UnknownCommand(invocation.name.clone()))?;

        let tokens = definition.tokens();
        let (program, base_args) = tokens
            .split_first()
            .ok_or_else(|| GlideError::EmptyCommand(invocation.name.clone()))?;

        let working_dir = invocation.working_dir();
        let executable = resolve_executable(program, &working_dir, &invocation.env)?;

        if cancel.is_cancelled() {
            return Err(GlideError::Cancelled);
        }

        debug!(
            "Spawning {} {:?} {:?} in {}",
            executable.display(),
            base_args,
            invocation.args,
            working_dir.display()
        );

        let mut child = TokioCommand::new(&executable)
            .args(base_args)
            .args(&invocation.args)
            .current_dir(&working_dir)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GlideError::Spawn {
                command: definition.cmd.clone(),
                message: e.to_string(),
            })?;

        let outcome = tokio::select! {
            result = wait_with_combined_output(&mut child) => Some(result),
            () = cancel.cancelled() => None,
        };

        match outcome {
            Some(result) => {
                let (status, output) = result?;
                Ok(CommandResult::completed(status, output))
            }
            None => {
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill cancelled child: {}", e);
                }
                Err(GlideError::Cancelled)
            }
        }
    }
}

/// Resolves `program` against the effective `PATH`: the overlay's when it
/// sets one, otherwise the inherited one.
fn resolve_executable(
    program: &str,
    working_dir: &Path,
    env: &BTreeMap<String, String>,
) -> Result<PathBuf> {
    let paths = env
        .get("PATH")
        .map(OsString::from)
        .or_else(|| std::env::var_os("PATH"));

    which::which_in(program, paths, working_dir).map_err(|e| GlideError::Spawn {
        command: program.to_string(),
        message: format!("exec: \"{}\": {}", program, e),
    })
}

/// Drains both pipes into one buffer as data arrives, then reaps the child.
async fn wait_with_combined_output(child: &mut Child) -> std::io::Result<(ExitStatus, Vec<u8>)> {
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut out_chunk = [0u8; 4096];
    let mut err_chunk = [0u8; 4096];
    let mut buffer = Vec::new();

    while stdout.is_some() || stderr.is_some() {
        let (pipe, read) = tokio::select! {
            read = read_chunk(&mut stdout, &mut out_chunk) => (Pipe::Stdout, read),
            read = read_chunk(&mut stderr, &mut err_chunk) => (Pipe::Stderr, read),
        };

        let n = read?;
        match pipe {
            Pipe::Stdout if n == 0 => stdout = None,
            Pipe::Stderr if n == 0 => stderr = None,
            Pipe::Stdout => buffer.extend_from_slice(&out_chunk[..n]),
            Pipe::Stderr => buffer.extend_from_slice(&err_chunk[..n]),
        }
    }

    let status = child.wait().await?;
    Ok((status, buffer))
}

/// Reads from an open pipe; a closed pipe never resolves.
async fn read_chunk<R>(pipe: &mut Option<R>, chunk: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match pipe {
        Some(reader) => reader.read(chunk).await,
        None => std::future::pending().await,
    }
}
