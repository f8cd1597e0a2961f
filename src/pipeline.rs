use tracing::info;

use crate::cmd;
use crate::config::DeployConfig;
use crate::container;
use crate::error::{DeployError, DeployResult};
use crate::git;
use crate::nginx;
use crate::provision;
use crate::ssh::SshSession;

/// Local tools every run shells out to.
const REQUIRED_TOOLS: [&str; 3] = ["git", "ssh", "scp"];

/// The deployment procedure: clone, provision, run the container,
/// put nginx in front of it. Steps run strictly in order and the
/// first failure aborts the run.
pub struct Pipeline {
    config: DeployConfig,
    dry_run: bool,
}

impl Pipeline {
    #[must_use]
    pub const fn new(config: DeployConfig) -> Self {
        Self {
            config,
            dry_run: false,
        }
    }

    /// Print the generated nginx site and planned actions instead of
    /// executing them.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn run(&self) -> DeployResult<()> {
        self.config.validate()?;

        if self.dry_run {
            self.print_dry_run();
            return Ok(());
        }

        check_prerequisites()?;

        let checkout = git::clone_or_update(&self.config)?;

        let ssh = self.session()?;
        ssh.check_connection()?;

        provision::run(&ssh, &self.config)?;

        container::upload(&ssh, &self.config, &checkout)?;
        container::build(&ssh, &self.config)?;
        container::replace(&ssh, &self.config)?;
        container::verify(&ssh, &self.config)?;

        nginx::configure(&ssh, &self.config)?;

        info!("Deployment complete!");
        info!(
            "Application available at: http://{}",
            self.config.server_name()
        );
        Ok(())
    }

    /// Every action a real run performs, in order.
    #[must_use]
    pub fn plan(&self) -> Vec<String> {
        let config = &self.config;
        let host = format!("{}@{}", config.ssh_user, config.server_ip);
        let checkout = config.checkout_dir();

        let mut steps = vec![format!(
            "Clone or update {} ({}) in {}",
            config.repo_url,
            config.branch,
            checkout.display()
        )];
        steps.push(format!("Check SSH connection to {host}"));
        steps.extend(
            provision::commands(config)
                .into_iter()
                .map(|c| format!("[{host}] {c}")),
        );
        steps.extend(
            container::upload_commands(config)
                .into_iter()
                .map(|c| format!("[{host}] {c}")),
        );
        steps.push(format!(
            "Copy {} to {host}:{}",
            checkout.display(),
            config.remote_build_dir()
        ));
        steps.push(format!("[{host}] {}", container::build_command(config)));
        steps.push(format!("[{host}] {}", container::remove_command(config)));
        steps.push(format!("[{host}] {}", container::run_command(config)));
        steps.push(format!("[{host}] {}", container::verify_command(config)));
        steps.push(format!("Write {}", nginx::site_path(config)));
        steps.extend(
            nginx::activate_commands(config)
                .into_iter()
                .map(|c| format!("[{host}] {c}")),
        );
        steps
    }

    fn print_dry_run(&self) {
        eprintln!("=== Dry run: no changes will be made ===");
        eprintln!();

        eprintln!("--- {} ---", nginx::site_path(&self.config));
        println!("{}", nginx::render(&self.config));

        eprintln!("--- Actions that would be performed ---");
        for (i, step) in self.plan().iter().enumerate() {
            eprintln!("{}. {step}", i + 1);
        }
    }

    fn session(&self) -> DeployResult<SshSession> {
        let ssh = SshSession::new(&self.config.server_ip, &self.config.ssh_user);
        Ok(match self.config.ssh_key_path()? {
            Some(key) => ssh.with_key(&key),
            None => ssh,
        })
    }
}

fn check_prerequisites() -> DeployResult<()> {
    info!("Checking prerequisites...");

    for tool in REQUIRED_TOOLS {
        if !cmd::command_exists(tool) {
            return Err(DeployError::PrerequisiteMissing(format!(
                "{tool} is not installed"
            )));
        }
    }

    info!("Prerequisites OK");
    Ok(())
}
