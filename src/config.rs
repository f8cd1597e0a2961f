use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{DeployError, DeployResult};
use crate::validate;

/// Port nginx listens on. The container must be published on a
/// different host port.
pub const PROXY_PORT: u16 = 80;

/// Everything one deployment run needs.
///
/// Values come from the interactive prompts, optionally pre-filled
/// from a YAML file:
///
/// ```
/// use shipwright::DeployConfig;
///
/// let config = DeployConfig::from_yaml(
///     "repo_url: https://github.com/acme/site.git\n\
///      server_ip: 203.0.113.10\n\
///      app_port: 8080\n",
/// )
/// .unwrap();
///
/// assert_eq!(config.branch, "main");
/// assert_eq!(config.app_name(), "site");
/// ```
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub repo_url: String,
    pub token: Option<String>,
    pub branch: String,
    pub ssh_user: String,
    pub server_ip: String,
    pub ssh_key: Option<String>,
    pub app_port: u16,
    pub app_name: Option<String>,
    pub container_port: u16,
    pub domain: Option<String>,
    pub remote_dir: String,
    pub workdir: PathBuf,
    pub env: IndexMap<String, String>,
    pub packages: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            token: None,
            branch: "main".to_string(),
            ssh_user: "root".to_string(),
            server_ip: String::new(),
            ssh_key: None,
            app_port: 8080,
            app_name: None,
            container_port: 80,
            domain: None,
            remote_dir: "/opt/app".to_string(),
            workdir: PathBuf::from("."),
            env: IndexMap::new(),
            packages: vec!["docker.io".to_string(), "nginx".to_string()],
        }
    }
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("repo_url", &self.repo_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("branch", &self.branch)
            .field("ssh_user", &self.ssh_user)
            .field("server_ip", &self.server_ip)
            .field("ssh_key", &self.ssh_key)
            .field("app_port", &self.app_port)
            .field("app_name", &self.app_name)
            .field("container_port", &self.container_port)
            .field("domain", &self.domain)
            .field("remote_dir", &self.remote_dir)
            .field("workdir", &self.workdir)
            .field("env", &self.env)
            .field("packages", &self.packages)
            .finish()
    }
}

impl DeployConfig {
    /// Load a config file. Fields left out keep their defaults.
    pub fn load(path: &Path) -> DeployResult<Self> {
        if !path.exists() {
            return Err(DeployError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> DeployResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Container, image and nginx site name. Falls back to the
    /// repository name.
    #[must_use]
    pub fn app_name(&self) -> String {
        self.app_name
            .clone()
            .unwrap_or_else(|| repo_name(&self.repo_url))
    }

    /// `server_name` used in the nginx site.
    #[must_use]
    pub fn server_name(&self) -> &str {
        self.domain.as_deref().unwrap_or(&self.server_ip)
    }

    /// Local directory the repository is cloned into.
    #[must_use]
    pub fn checkout_dir(&self) -> PathBuf {
        self.workdir.join(repo_name(&self.repo_url))
    }

    /// Remote directory holding the build context.
    #[must_use]
    pub fn remote_build_dir(&self) -> String {
        format!(
            "{}/{}",
            self.remote_dir.trim_end_matches('/'),
            repo_name(&self.repo_url)
        )
    }

    #[must_use]
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }

    /// The SSH key with a leading `~/` expanded.
    pub fn ssh_key_path(&self) -> DeployResult<Option<String>> {
        self.ssh_key.as_deref().map(expand_home).transpose()
    }

    /// Check every field. The first failure is returned.
    pub fn validate(&self) -> DeployResult<()> {
        if !validate::is_valid_repo_url(&self.repo_url) {
            return Err(DeployError::invalid(
                "repository URL",
                format!(
                    "'{}' must start with http://, https:// or git://",
                    self.repo_url
                ),
            ));
        }
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            if !validate::is_valid_token(token) {
                return Err(DeployError::invalid(
                    "access token",
                    "may only contain letters, digits and '-', '.', '_', '~'",
                ));
            }
        }
        let repo = repo_name(&self.repo_url);
        if !validate::is_valid_app_name(&repo) {
            return Err(DeployError::invalid(
                "repository URL",
                format!("repository name '{repo}' contains unsupported characters"),
            ));
        }
        if !validate::is_valid_branch(&self.branch) {
            return Err(DeployError::invalid(
                "branch",
                format!("'{}' is not a safe branch name", self.branch),
            ));
        }
        if !validate::is_valid_ssh_user(&self.ssh_user) {
            return Err(DeployError::invalid(
                "SSH user",
                format!("'{}' is not a valid user name", self.ssh_user),
            ));
        }
        if !validate::is_valid_ip(&self.server_ip) {
            return Err(DeployError::invalid(
                "server IP",
                format!("'{}' is not an IPv4 address", self.server_ip),
            ));
        }
        if let Some(key) = self.ssh_key_path()? {
            if !Path::new(&key).is_file() {
                return Err(DeployError::FileNotFound(format!("SSH key {key}")));
            }
        }
        validate_port("application port", self.app_port)?;
        validate_port("container port", self.container_port)?;
        if self.app_port == PROXY_PORT {
            return Err(DeployError::invalid(
                "application port",
                format!("port {PROXY_PORT} is reserved for nginx"),
            ));
        }
        let name = self.app_name();
        if !validate::is_valid_app_name(&name) {
            return Err(DeployError::invalid(
                "application name",
                format!("'{name}' is not a valid container name"),
            ));
        }
        if let Some(domain) = &self.domain {
            if !validate::is_valid_domain(domain) {
                return Err(DeployError::invalid(
                    "domain",
                    format!("'{domain}' is not a valid hostname"),
                ));
            }
        }
        if !validate::is_valid_remote_dir(&self.remote_dir) {
            return Err(DeployError::invalid(
                "remote directory",
                format!("'{}' must be an absolute path", self.remote_dir),
            ));
        }
        for key in self.env.keys() {
            if !validate::is_valid_env_key(key) {
                return Err(DeployError::invalid(
                    "environment variable",
                    format!("'{key}' is not a valid name"),
                ));
            }
        }
        if self.packages.is_empty() {
            return Err(DeployError::invalid("packages", "at least one is required"));
        }
        for package in &self.packages {
            if !validate::is_valid_package(package) {
                return Err(DeployError::invalid(
                    "packages",
                    format!("'{package}' is not a valid apt package name"),
                ));
            }
        }
        Ok(())
    }
}

fn validate_port(field: &'static str, port: u16) -> DeployResult<()> {
    if port == 0 {
        return Err(DeployError::invalid(field, "must be in 1-65535"));
    }
    Ok(())
}

/// Last path segment of a repository URL, without `.git`.
///
/// ```
/// use shipwright::config::repo_name;
///
/// assert_eq!(repo_name("https://github.com/acme/site.git"), "site");
/// assert_eq!(repo_name("git://example.org/tools/"), "tools");
/// ```
#[must_use]
pub fn repo_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "app".to_string()
    } else {
        name.to_string()
    }
}

/// Expand a leading `~/` using `HOME`.
pub fn expand_home(path: &str) -> DeployResult<String> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home =
                std::env::var("HOME").map_err(|_| DeployError::EnvMissing("HOME".into()))?;
            Ok(PathBuf::from(home).join(rest).display().to_string())
        }
        None => Ok(path.to_string()),
    }
}
