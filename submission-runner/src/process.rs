use std::{fmt, path::Path, process::ExitStatus, process::Stdio};
use tokio::{
    io::AsyncWriteExt,
    process::Command,
    time::{self, Duration},
};
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    types::{RunOutcome, RunStatus},
    Result,
};

/// One way of launching a child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Program plus argument vector, no shell involved
    Argv { program: String, args: Vec<String> },
    /// A single command line handed to the platform shell
    Shell(String),
}

impl Invocation {
    pub fn argv<P: Into<String>, S: Into<String>>(
        program: P,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        Invocation::Argv {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The same command joined into one shell line
    pub fn to_shell(&self) -> Self {
        match self {
            Invocation::Argv { program, args } => Invocation::Shell(
                std::iter::once(program)
                    .chain(args)
                    .map(|part| shell_quote(part))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Invocation::Shell(line) => Invocation::Shell(line.clone()),
        }
    }

    /// The argument-vector form followed by its shell-line fallback
    pub fn with_shell_fallback(self) -> Vec<Self> {
        let shell = self.to_shell();
        vec![self, shell]
    }

    pub(crate) fn command(&self, cwd: &Path) -> Command {
        let mut command = match self {
            Invocation::Argv { program, args } => {
                let mut command = Command::new(program);
                command.args(args);
                command
            }
            Invocation::Shell(line) => shell_command(line),
        };
        command.current_dir(cwd);
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Argv { program, args } => {
                write!(f, "{}", program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Invocation::Shell(line) => write!(f, "\"{}\"", line),
        }
    }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(line);
    command
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(line);
    command
}

#[cfg(unix)]
fn shell_quote(part: &str) -> String {
    let plain = !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));
    if plain {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', r"'\''"))
    }
}

#[cfg(windows)]
fn shell_quote(part: &str) -> String {
    if !part.is_empty() && !part.contains(char::is_whitespace) && !part.contains('"') {
        part.to_string()
    } else {
        format!("\"{}\"", part.replace('"', "\\\""))
    }
}

/// Captured output of one child process
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
}

/// Run `invocation` in `cwd`, piping `input` to stdin and capturing stdout.
///
/// Stderr is inherited. A child still running after `timeout` is killed and
/// `Error::Timeout` is returned.
pub async fn execute(
    invocation: &Invocation,
    cwd: &Path,
    input: &str,
    timeout: Duration,
) -> Result<ProcessOutput> {
    debug!("Execute - Command: {}", invocation);
    debug!("Execute - Cwd: {:?}", cwd);

    let mut command = invocation.command(cwd);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    // Own process group so a timeout also reaches children of a shell fallback
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .map_err(|e| Error::Execution(format!("Failed to spawn {}: {}", invocation, e)))?;

    // Input is written concurrently with the wait, both under the timeout
    let stdin = child.stdin.take();
    let input = input.as_bytes().to_vec();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            if let Err(e) = stdin.write_all(&input).await {
                // The child may exit without reading its input
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(Error::Execution(format!("Failed to write input: {}", e)));
                }
                debug!("Child closed stdin before reading input");
            }
            // Dropping stdin signals EOF
        }
        Ok(())
    };

    let child_id = child.id();
    let run = async {
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| Error::Execution(format!("Process error: {}", e)))?;
        fed?;
        Ok::<_, Error>(output)
    };

    match time::timeout(timeout, run).await {
        Ok(output) => {
            let output = output?;
            Ok(ProcessOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            })
        }
        Err(_) => {
            if let Some(id) = child_id {
                kill_group(id);
            }
            Err(Error::Timeout(timeout.as_secs()))
        }
    }
}

#[cfg(unix)]
pub(crate) fn kill_group(id: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(id as i32), Signal::SIGKILL) {
        debug!("Failed to kill process group {}: {}", id, e);
    }
}

#[cfg(not(unix))]
pub(crate) fn kill_group(_id: u32) {
    // The direct child is killed when its handle drops
}

/// Try each invocation in order until one runs to completion.
///
/// A timeout ends the attempt with an empty `TimedOut` outcome; any other
/// failure moves on to the next invocation. The exit code of the completed
/// invocation is reported, not judged.
pub async fn execute_strategies(
    invocations: &[Invocation],
    cwd: &Path,
    input: &str,
    timeout: Duration,
) -> Result<RunOutcome> {
    let mut last_error = None;

    for (index, invocation) in invocations.iter().enumerate() {
        if index > 0 {
            warn!("Execute dropped to fallback: {}", invocation);
        }

        match execute(invocation, cwd, input, timeout).await {
            Ok(output) => {
                if index > 0 {
                    info!("Fallback completed");
                }
                return Ok(RunOutcome {
                    status: RunStatus::Completed {
                        code: output.status.code(),
                    },
                    stdout: output.stdout,
                    strategy: index,
                });
            }
            Err(Error::Timeout(secs)) => {
                warn!("Timeout expired! ({} s) {}", secs, invocation);
                return Ok(RunOutcome::timed_out(index));
            }
            Err(e) => {
                debug!("Invocation {} failed: {}", invocation, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| Error::Execution("No invocation strategies given".to_string())))
}
