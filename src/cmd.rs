use std::process::{Command, Output, Stdio};

use crate::error::{ProvisionError, ProvisionResult};

/// Run a command and capture its output. Fails if the command
/// returns a non-zero exit code.
pub fn run(program: &str, args: &[&str]) -> ProvisionResult<String> {
    capture(spawn(program, args)?, program, args)
}

/// Run a command and capture stdout whether or not it exits zero.
/// For queries where a non-zero exit is part of the answer (package
/// status lookups), not a failure.
pub fn run_unchecked(program: &str, args: &[&str]) -> ProvisionResult<(bool, String)> {
    let output = spawn(program, args)?;
    Ok((output.status.success(), stdout_of(&output)))
}

/// Whether a program resolves on the current `PATH`.
#[must_use]
pub fn command_exists(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Run a command with stdin/stdout/stderr inherited (interactive).
pub fn run_interactive(program: &str, args: &[&str]) -> ProvisionResult<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| spawn_error(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(ProvisionError::CommandFailed {
            command: format_command(program, args),
            status,
        })
    }
}

/// Run a command that pipes its stdin from a byte slice. Used for
/// the database shell bootstrap.
pub fn run_with_stdin(program: &str, args: &[&str], stdin_data: &[u8]) -> ProvisionResult<String> {
    use std::io::Write;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    if let Some(stdin) = &mut child.stdin {
        stdin.write_all(stdin_data)?;
    }
    drop(child.stdin.take());

    capture(child.wait_with_output()?, program, args)
}

fn spawn(program: &str, args: &[&str]) -> ProvisionResult<Output> {
    Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_error(program, e))
}

fn spawn_error(program: &str, error: std::io::Error) -> ProvisionError {
    if error.kind() == std::io::ErrorKind::NotFound {
        ProvisionError::CommandNotFound(program.to_string())
    } else {
        ProvisionError::Io(error)
    }
}

fn capture(output: Output, program: &str, args: &[&str]) -> ProvisionResult<String> {
    if output.status.success() {
        return Ok(stdout_of(&output));
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    eprintln!("stderr: {stderr}");
    Err(ProvisionError::CommandFailed {
        command: format_command(program, args),
        status: output.status,
    })
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn format_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| (*a).to_string()));
    parts.join(" ")
}
