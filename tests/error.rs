use std::process::Command;

use shipwright::error::DeployError;

#[test]
fn display_command_not_found() {
    let err = DeployError::CommandNotFound("docker".into());
    assert_eq!(err.to_string(), "command not found: docker");
}

#[test]
fn display_ssh_failed() {
    let err = DeployError::SshFailed("timeout".into());
    assert_eq!(err.to_string(), "SSH connection failed: timeout");
}

#[test]
fn display_prerequisite_missing() {
    let err = DeployError::PrerequisiteMissing("scp".into());
    assert_eq!(err.to_string(), "prerequisite missing: scp");
}

#[test]
fn display_invalid_input() {
    let err = DeployError::invalid("server IP", "'x' is not an IPv4 address");
    assert_eq!(err.to_string(), "invalid server IP: 'x' is not an IPv4 address");
}

#[test]
fn display_env_missing() {
    let err = DeployError::EnvMissing("HOME".into());
    assert_eq!(err.to_string(), "environment variable missing: HOME");
}

#[test]
fn display_file_not_found() {
    let err = DeployError::FileNotFound("Dockerfile".into());
    assert_eq!(err.to_string(), "file not found: Dockerfile");
}

#[test]
fn display_container_not_running() {
    let err = DeployError::ContainerNotRunning("site".into(), "exited".into());
    assert_eq!(
        err.to_string(),
        "container 'site' is not running (status: exited)"
    );
}

#[test]
fn display_aborted() {
    assert_eq!(DeployError::Aborted.to_string(), "aborted by operator");
}

#[test]
fn display_other() {
    let err = DeployError::Other("custom error".into());
    assert_eq!(err.to_string(), "custom error");
}

#[test]
fn from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err: DeployError = io_err.into();
    assert!(matches!(err, DeployError::Io(_)));
}

#[test]
fn from_json_error() {
    let json_err = serde_json::from_str::<Vec<u64>>("invalid").unwrap_err();
    let err: DeployError = json_err.into();
    assert!(matches!(err, DeployError::Json(_)));
}

#[test]
fn redact_masks_command_line() {
    let status = Command::new("sh").args(["-c", "exit 1"]).status().unwrap();
    let err = DeployError::CommandFailed {
        command: "git clone https://ghp_secret@github.com/acme/site.git site".into(),
        status,
    };

    let redacted = err.redact("ghp_secret");

    assert_eq!(
        redacted.to_string(),
        "command failed: git clone https://***@github.com/acme/site.git site"
    );
}

#[test]
fn redact_with_empty_secret_is_noop() {
    let err = DeployError::Other("nothing to hide".into()).redact("");
    assert_eq!(err.to_string(), "nothing to hide");
}

#[test]
fn redact_leaves_other_variants() {
    let err = DeployError::FileNotFound("secret.yml".into()).redact("secret");
    assert_eq!(err.to_string(), "file not found: secret.yml");
}
