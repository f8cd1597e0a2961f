use std::path::Path;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};

use crate::config::{DeployConfig, expand_home, repo_name};
use crate::error::{DeployError, DeployResult};
use crate::validate;

/// Source of operator answers.
pub trait Prompter {
    /// Ask for a line of text. An empty answer selects `default`
    /// when one is given.
    fn input(&self, prompt: &str, default: Option<&str>) -> DeployResult<String>;

    /// Ask for a value without echoing it.
    fn secret(&self, prompt: &str) -> DeployResult<String>;

    fn confirm(&self, prompt: &str, default: bool) -> DeployResult<bool>;
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> DeployResult<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    fn secret(&self, prompt: &str) -> DeployResult<String> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> DeployResult<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Ask for every deployment parameter, offering the values in
/// `base` as defaults.
///
/// Each answer is checked as soon as it is given; the first invalid
/// one aborts collection.
pub fn collect(prompter: &dyn Prompter, base: DeployConfig) -> DeployResult<DeployConfig> {
    let mut config = base;

    let repo_url = prompter.input("Git repository URL", non_empty(&config.repo_url))?;
    if !validate::is_valid_repo_url(&repo_url) {
        return Err(DeployError::invalid(
            "repository URL",
            format!("'{repo_url}' must start with http://, https:// or git://"),
        ));
    }
    config.repo_url = repo_url;

    if config.token.is_none() {
        let token = prompter.secret("Personal access token (empty for public repositories)")?;
        if !token.is_empty() && !validate::is_valid_token(&token) {
            return Err(DeployError::invalid(
                "access token",
                "may only contain letters, digits and '-', '.', '_', '~'",
            ));
        }
        config.token = Some(token).filter(|t| !t.is_empty());
    }

    let branch = prompter.input("Branch", Some(&config.branch))?;
    if !validate::is_valid_branch(&branch) {
        return Err(DeployError::invalid(
            "branch",
            format!("'{branch}' is not a safe branch name"),
        ));
    }
    config.branch = branch;

    let ssh_user = prompter.input("SSH user", Some(&config.ssh_user))?;
    if !validate::is_valid_ssh_user(&ssh_user) {
        return Err(DeployError::invalid(
            "SSH user",
            format!("'{ssh_user}' is not a valid user name"),
        ));
    }
    config.ssh_user = ssh_user;

    let server_ip = prompter.input("Server IP", non_empty(&config.server_ip))?;
    if !validate::is_valid_ip(&server_ip) {
        return Err(DeployError::invalid(
            "server IP",
            format!("'{server_ip}' is not an IPv4 address"),
        ));
    }
    config.server_ip = server_ip;

    let ssh_key = prompter.input(
        "SSH private key (empty for ssh defaults)",
        config.ssh_key.as_deref(),
    )?;
    if ssh_key.is_empty() {
        config.ssh_key = None;
    } else {
        let expanded = expand_home(&ssh_key)?;
        if !Path::new(&expanded).is_file() {
            return Err(DeployError::FileNotFound(format!("SSH key {expanded}")));
        }
        config.ssh_key = Some(ssh_key);
    }

    let port = prompter.input("Application port", Some(&config.app_port.to_string()))?;
    config.app_port = validate::parse_port(&port).ok_or_else(|| {
        DeployError::invalid(
            "application port",
            format!("'{port}' must be an integer in 1-65535"),
        )
    })?;

    let default_name = config
        .app_name
        .clone()
        .unwrap_or_else(|| repo_name(&config.repo_url));
    let app_name = prompter.input("Application name", Some(&default_name))?;
    if !validate::is_valid_app_name(&app_name) {
        return Err(DeployError::invalid(
            "application name",
            format!("'{app_name}' is not a valid container name"),
        ));
    }
    config.app_name = Some(app_name);

    let domain = prompter.input(
        "Domain (empty to use the server IP)",
        config.domain.as_deref(),
    )?;
    if domain.is_empty() {
        config.domain = None;
    } else if validate::is_valid_domain(&domain) {
        config.domain = Some(domain);
    } else {
        return Err(DeployError::invalid(
            "domain",
            format!("'{domain}' is not a valid hostname"),
        ));
    }

    config.validate()?;
    Ok(config)
}

/// Print what is about to happen and ask for confirmation.
pub fn confirm_summary(prompter: &dyn Prompter, config: &DeployConfig) -> DeployResult<()> {
    for line in summary(config) {
        eprintln!("{line}");
    }
    eprintln!();
    if prompter.confirm("Proceed with deployment?", true)? {
        Ok(())
    } else {
        Err(DeployError::Aborted)
    }
}

/// Human-readable parameter summary. The token is masked.
#[must_use]
pub fn summary(config: &DeployConfig) -> Vec<String> {
    let token = if config.token().is_empty() {
        "(none)"
    } else {
        "********"
    };
    vec![
        format!("Repository:  {} ({})", config.repo_url, config.branch),
        format!("Token:       {token}"),
        format!("Server:      {}@{}", config.ssh_user, config.server_ip),
        format!(
            "SSH key:     {}",
            config.ssh_key.as_deref().unwrap_or("(ssh default)")
        ),
        format!("Application: {}", config.app_name()),
        format!(
            "Proxy:       http://{} -> 127.0.0.1:{}",
            config.server_name(),
            config.app_port
        ),
    ]
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}
