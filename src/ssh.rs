use tracing::info;

use crate::cmd;
use crate::error::{DeployError, DeployResult};

/// SSH session wrapper for executing commands and transferring
/// files to a remote host.
pub struct SshSession {
    host: String,
    user: String,
    key: Option<String>,
}

impl SshSession {
    #[must_use]
    pub fn new(host: &str, user: &str) -> Self {
        Self {
            host: host.to_string(),
            user: user.to_string(),
            key: None,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key_path: &str) -> Self {
        self.key = Some(key_path.to_string());
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Prefix a command with `sudo` unless logged in as root.
    #[must_use]
    pub fn privileged(&self, command: &str) -> String {
        privileged(&self.user, command)
    }

    /// Execute a command on the remote host and capture output.
    pub fn exec(&self, command: &str) -> DeployResult<String> {
        let args = self.build_ssh_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run("ssh", &refs)
    }

    /// Execute a command on the remote host interactively.
    pub fn exec_interactive(&self, command: &str) -> DeployResult<()> {
        let args = self.build_ssh_args(command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_interactive("ssh", &refs)
    }

    /// Recursively copy a local directory to the remote host. The
    /// directory lands as `<remote_parent>/<basename>`.
    pub fn scp_dir_to(&self, local_dir: &str, remote_parent: &str) -> DeployResult<()> {
        let mut args = self.scp_base_args();
        args.push("-r".to_string());
        args.push(local_dir.to_string());
        args.push(format!("{}:{remote_parent}/", self.destination()));

        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_interactive("scp", &refs)
    }

    /// Write content to a remote file via stdin pipe. Goes through
    /// `sudo tee` for non-root users so system paths are writable.
    pub fn write_remote_file(&self, content: &str, remote_path: &str) -> DeployResult<()> {
        let command = format!("{} > /dev/null", self.privileged(&format!("tee {remote_path}")));
        let args = self.build_ssh_args(&command);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        cmd::run_with_stdin("ssh", &refs, content.as_bytes())?;
        Ok(())
    }

    /// Make a single connection attempt. Fails fast after the
    /// connect timeout.
    pub fn check_connection(&self) -> DeployResult<()> {
        info!("Checking SSH connection to {}...", self.destination());
        self.exec("echo ok").map_err(|e| {
            DeployError::SshFailed(format!("cannot reach {}: {e}", self.destination()))
        })?;
        info!("SSH connection OK");
        Ok(())
    }

    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn build_ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.ssh_base_args();
        args.push(self.destination());
        args.push(command.to_string());
        args
    }

    #[must_use]
    pub fn ssh_base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
        ];
        if let Some(key) = &self.key {
            args.push("-i".to_string());
            args.push(key.clone());
        }
        args
    }

    fn scp_base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
        ];
        if let Some(key) = &self.key {
            args.push("-i".to_string());
            args.push(key.clone());
        }
        args
    }
}

/// Prefix a command with `sudo` unless `user` is root.
#[must_use]
pub fn privileged(user: &str, command: &str) -> String {
    if user == "root" {
        command.to_string()
    } else {
        format!("sudo {command}")
    }
}

/// Single-quote a value for a POSIX shell.
///
/// ```
/// use shipwright::ssh::quote;
///
/// assert_eq!(quote("it's"), "'it'\\''s'");
/// ```
#[must_use]
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_args_carry_timeout() {
        let ssh = SshSession::new("203.0.113.10", "deploy");

        let args = ssh.ssh_base_args();

        assert!(args.contains(&"ConnectTimeout=10".to_string()));
        assert!(!args.contains(&"-i".to_string()));
    }

    #[test]
    fn key_is_passed_with_dash_i() {
        let ssh = SshSession::new("203.0.113.10", "deploy").with_key("/keys/id_ed25519");

        let args = ssh.ssh_base_args();
        let pos = args.iter().position(|a| a == "-i").unwrap();

        assert_eq!(args[pos + 1], "/keys/id_ed25519");
    }

    #[test]
    fn root_runs_without_sudo() {
        assert_eq!(privileged("root", "apt-get update"), "apt-get update");
        assert_eq!(privileged("deploy", "apt-get update"), "sudo apt-get update");
    }

    #[test]
    fn destination_is_user_at_host() {
        let ssh = SshSession::new("10.0.0.5", "ubuntu");

        assert_eq!(ssh.destination(), "ubuntu@10.0.0.5");
    }

    #[test]
    fn quote_plain_value() {
        assert_eq!(quote("hello world"), "'hello world'");
    }
}
