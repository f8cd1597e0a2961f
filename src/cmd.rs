use std::process::{Command, Output, Stdio};

use tracing::{debug, warn};

use crate::error::{DeployError, DeployResult};

/// Run a command and capture its output. Fails if the command
/// returns a non-zero exit code.
pub fn run(program: &str, args: &[&str]) -> DeployResult<String> {
    debug!(command = %format_command(program, args), "running");
    let output = spawn(program, args)?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let command = format_command(program, args);
        warn!("stderr: {stderr}");
        Err(DeployError::CommandFailed {
            command,
            status: output.status,
        })
    }
}

/// Run a command with stdin/stdout/stderr inherited (interactive).
pub fn run_interactive(program: &str, args: &[&str]) -> DeployResult<()> {
    inherit(program, args, format_command(program, args))
}

/// Like [`run_interactive`], but `secret` is masked in the logged
/// command line and in the returned error.
pub fn run_interactive_redacted(program: &str, args: &[&str], secret: &str) -> DeployResult<()> {
    let mut display = format_command(program, args);
    if !secret.is_empty() {
        display = display.replace(secret, "***");
    }
    inherit(program, args, display)
}

/// Run a command that pipes its stdin from a byte slice.
pub fn run_with_stdin(program: &str, args: &[&str], stdin_data: &[u8]) -> DeployResult<String> {
    use std::io::Write;

    debug!(
        command = %format_command(program, args),
        bytes = stdin_data.len(),
        "running with stdin"
    );
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| not_found_or_io(program, e))?;

    if let Some(stdin) = &mut child.stdin {
        stdin.write_all(stdin_data)?;
    }
    drop(child.stdin.take());

    let output = child.wait_with_output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("stderr: {stderr}");
        Err(DeployError::CommandFailed {
            command: format_command(program, args),
            status: output.status,
        })
    }
}

/// Check if a command exists on PATH.
#[must_use]
pub fn command_exists(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Run with inherited stdio. `display` is what gets logged and
/// reported on failure.
fn inherit(program: &str, args: &[&str], display: String) -> DeployResult<()> {
    let command_display = display.as_str();
    debug!(command = %command_display, "running");
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| not_found_or_io(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(DeployError::CommandFailed {
            command: display,
            status,
        })
    }
}

fn spawn(program: &str, args: &[&str]) -> DeployResult<Output> {
    Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| not_found_or_io(program, e))
}

fn not_found_or_io(program: &str, e: std::io::Error) -> DeployError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DeployError::CommandNotFound(program.to_string())
    } else {
        DeployError::Io(e)
    }
}

/// Join a program and its arguments into a single display
/// string.
#[must_use]
pub fn format_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| (*a).to_string()));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_joins_with_spaces() {
        assert_eq!(
            format_command("git", &["clone", "--branch", "main"]),
            "git clone --branch main"
        );
    }

    #[test]
    fn format_without_args() {
        assert_eq!(format_command("nginx", &[]), "nginx");
    }

    #[test]
    fn missing_binary_is_command_not_found() {
        let err = run("shipwright-definitely-not-installed", &[]).unwrap_err();

        assert!(matches!(err, DeployError::CommandNotFound(ref p)
            if p == "shipwright-definitely-not-installed"));
    }

    #[test]
    fn non_zero_exit_is_command_failed() {
        let err = run("sh", &["-c", "exit 3"]).unwrap_err();

        match err {
            DeployError::CommandFailed { command, status } => {
                assert_eq!(command, "sh -c exit 3");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn run_trims_stdout() {
        let out = run("sh", &["-c", "echo '  hello  '"]).unwrap();

        assert_eq!(out, "hello");
    }

    #[test]
    fn redacted_failure_masks_secret() {
        let err = run_interactive_redacted("sh", &["-c", "exit 1", "ghp_hidden"], "ghp_hidden")
            .unwrap_err();

        match err {
            DeployError::CommandFailed { command, status } => {
                assert_eq!(command, "sh -c exit 1 ***");
                assert_eq!(status.code(), Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn redacted_with_empty_secret_is_plain() {
        let err = run_interactive_redacted("sh", &["-c", "exit 2"], "").unwrap_err();

        assert!(err.to_string().contains("sh -c exit 2"));
    }

    #[test]
    fn stdin_is_piped_through() {
        let out = run_with_stdin("cat", &[], b"from stdin\n").unwrap();

        assert_eq!(out, "from stdin");
    }
}
