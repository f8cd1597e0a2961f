use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error, info};

use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::logging;
use crate::pipeline::Pipeline;
use crate::prompt::{self, TerminalPrompter};

#[derive(Parser, Debug)]
#[command(name = "shipwright")]
#[command(about = "Clone a repository, provision a server and run its container behind nginx")]
#[command(version)]
pub struct Cli {
    /// YAML file pre-filling the deployment parameters
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Take every parameter from --config and skip all prompts
    #[arg(long, requires = "config")]
    pub non_interactive: bool,

    /// Print the nginx site and planned actions without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the timestamped log file
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Also show debug output, including every command, on stderr
    #[arg(long, short)]
    pub verbose: bool,

    /// Personal access token for HTTPS clones
    #[arg(long, env = "SHIPWRIGHT_GIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl Cli {
    /// Config file values with the command-line token applied.
    pub fn base_config(&self) -> DeployResult<DeployConfig> {
        let mut config = match &self.config {
            Some(path) => DeployConfig::load(path)?,
            None => DeployConfig::default(),
        };
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            config.token = Some(token.clone());
        }
        Ok(config)
    }
}

/// Parse arguments, set up logging, gather parameters and run the
/// pipeline. Errors are reported before they are returned.
pub fn run() -> DeployResult<()> {
    let cli = Cli::parse();

    let log_path = logging::init(&cli.log_dir, cli.verbose).inspect_err(|e| {
        eprintln!("error: {e}");
    })?;
    info!("Logging to {}", log_path.display());

    deploy(&cli).inspect_err(|e| match e {
        DeployError::Aborted => info!("Aborted by operator"),
        e => error!("{e}"),
    })
}

fn deploy(cli: &Cli) -> DeployResult<()> {
    let base = cli.base_config()?;

    let config = if cli.non_interactive {
        base.validate()?;
        base
    } else {
        let prompter = TerminalPrompter::new();
        let config = prompt::collect(&prompter, base)?;
        if !cli.dry_run {
            prompt::confirm_summary(&prompter, &config)?;
        }
        config
    };
    debug!(?config, "parameters collected");

    Pipeline::new(config).dry_run(cli.dry_run).run()
}
