use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::ssh::{SshSession, privileged, quote};

/// Subset of `docker inspect --format '{{json .State}}'`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    pub status: String,
    pub running: bool,
    #[serde(default)]
    pub restarting: bool,
    #[serde(default)]
    pub exit_code: i64,
}

/// Parse the JSON state printed by `docker inspect`.
pub fn parse_state(json: &str) -> DeployResult<ContainerState> {
    Ok(serde_json::from_str(json.trim())?)
}

#[must_use]
pub fn image_tag(config: &DeployConfig) -> String {
    format!("{}:latest", config.app_name())
}

#[must_use]
pub fn build_command(config: &DeployConfig) -> String {
    format!(
        "docker build -t {} {}",
        image_tag(config),
        config.remote_build_dir()
    )
}

#[must_use]
pub fn remove_command(config: &DeployConfig) -> String {
    format!("docker rm -f {} >/dev/null 2>&1 || true", config.app_name())
}

/// `docker run` publishing the container on loopback only; nginx
/// is the public entry point.
#[must_use]
pub fn run_command(config: &DeployConfig) -> String {
    let mut parts = vec![
        "docker run -d".to_string(),
        format!("--name {}", config.app_name()),
        "--restart unless-stopped".to_string(),
        format!(
            "-p 127.0.0.1:{}:{}",
            config.app_port, config.container_port
        ),
    ];
    for (key, value) in &config.env {
        parts.push(format!("-e {}", quote(&format!("{key}={value}"))));
    }
    parts.push(image_tag(config));
    parts.join(" ")
}

/// Remote commands preparing `remote_dir` for a fresh build
/// context. Run before the copy.
#[must_use]
pub fn upload_commands(config: &DeployConfig) -> Vec<String> {
    let remote_dir = &config.remote_dir;
    vec![
        privileged(&config.ssh_user, &format!("mkdir -p {remote_dir}")),
        privileged(
            &config.ssh_user,
            &format!("chown {} {remote_dir}", config.ssh_user),
        ),
        format!("rm -rf {}", config.remote_build_dir()),
    ]
}

#[must_use]
pub fn verify_command(config: &DeployConfig) -> String {
    format!(
        "docker inspect --format '{{{{json .State}}}}' {}",
        config.app_name()
    )
}

/// Copy the checkout to the host, replacing any previous build
/// context.
pub fn upload(ssh: &SshSession, config: &DeployConfig, checkout: &Path) -> DeployResult<()> {
    let dockerfile = checkout.join("Dockerfile");
    if !dockerfile.is_file() {
        return Err(DeployError::FileNotFound(format!(
            "{} (the repository must contain a Dockerfile)",
            dockerfile.display()
        )));
    }

    info!(
        "Copying build files to {}:{}...",
        ssh.host(),
        config.remote_build_dir()
    );
    for command in upload_commands(config) {
        ssh.exec(&command)?;
    }
    ssh.scp_dir_to(&checkout.display().to_string(), &config.remote_dir)?;

    Ok(())
}

pub fn build(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    info!("Building image {} on {}...", image_tag(config), ssh.host());
    ssh.exec_interactive(&build_command(config))
}

/// Stop and remove the old container, then start the new one.
pub fn replace(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    info!("Starting container {}...", config.app_name());
    ssh.exec(&remove_command(config))?;
    let id = ssh.exec(&run_command(config))?;
    info!("Container started: {}", id.chars().take(12).collect::<String>());
    Ok(())
}

/// Confirm the container is running.
pub fn verify(ssh: &SshSession, config: &DeployConfig) -> DeployResult<ContainerState> {
    let name = config.app_name();
    let output = ssh.exec(&verify_command(config))?;
    let state = parse_state(&output)?;

    if !state.running || state.restarting {
        return Err(DeployError::ContainerNotRunning(name, state.status));
    }

    info!("Container {name} is {}", state.status);
    Ok(state)
}
