use tracing::info;

use crate::config::DeployConfig;
use crate::error::DeployResult;
use crate::ssh::{SshSession, privileged};

/// Commands that prepare a fresh host: packages, docker group
/// membership for the SSH user, services enabled at boot.
#[must_use]
pub fn commands(config: &DeployConfig) -> Vec<String> {
    let user = &config.ssh_user;
    vec![
        privileged(user, "apt-get update"),
        privileged(
            user,
            &format!(
                "env DEBIAN_FRONTEND=noninteractive apt-get install -y {}",
                config.packages.join(" ")
            ),
        ),
        privileged(user, &format!("usermod -aG docker {user}")),
        privileged(user, "systemctl enable --now docker nginx"),
    ]
}

/// Run the provisioning commands in order. The first failure
/// aborts.
pub fn run(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    info!("Provisioning {}...", ssh.host());

    for command in commands(config) {
        info!("  $ {command}");
        ssh.exec_interactive(&command)?;
    }

    info!("Host provisioned");
    Ok(())
}
