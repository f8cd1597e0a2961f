//! Interactive deployment of a containerized repository to a
//! single VPS.
//!
//! Shipwright asks the operator for a git URL, an optional personal
//! access token, an SSH target and a port, checks every answer, and
//! then runs one linear procedure:
//!
//! 1. **Clone** - clone the repository, or update an existing
//!    checkout to the tip of the branch
//! 2. **Provision** - install docker and nginx over SSH, add the
//!    SSH user to the `docker` group, enable both services
//! 3. **Container** - copy the build files, `docker build`, replace
//!    the running container
//! 4. **Proxy** - write an nginx site proxying to the container,
//!    `nginx -t`, reload
//!
//! Every step shells out to `git`, `ssh`, `scp`, `apt-get`,
//! `docker`, `nginx` or `systemctl` and checks the exit code. The
//! first failure aborts the run with exit code 1; nothing is
//! retried or rolled back.
//!
//! # Examples
//!
//! ## Interactive
//!
//! ```sh
//! shipwright
//! ```
//!
//! ## Pre-filled from a file
//!
//! ```yaml
//! # deploy.yml
//! repo_url: https://github.com/acme/site.git
//! branch: main
//! ssh_user: deploy
//! server_ip: 203.0.113.10
//! ssh_key: ~/.ssh/id_ed25519
//! app_port: 8080
//! domain: site.example.com
//! env:
//!   TZ: Europe/Lisbon
//! ```
//!
//! ```sh
//! SHIPWRIGHT_GIT_TOKEN=ghp_... shipwright --config deploy.yml --non-interactive
//! shipwright --config deploy.yml --dry-run
//! ```
//!
//! ## As a library
//!
//! ```rust,no_run
//! use shipwright::{DeployConfig, Pipeline};
//!
//! fn main() -> Result<(), shipwright::error::DeployError> {
//!     let config = DeployConfig::load("deploy.yml".as_ref())?;
//!     Pipeline::new(config).run()
//! }
//! ```

// Allow noisy pedantic lints that don't add value for a
// deployment tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod container;
pub mod error;
pub mod git;
pub mod logging;
pub mod nginx;
pub mod pipeline;
pub mod prompt;
pub mod provision;
pub mod ssh;
pub mod validate;

pub use config::DeployConfig;
pub use error::{DeployError, DeployResult};
pub use pipeline::Pipeline;
pub use prompt::{Prompter, TerminalPrompter};
pub use ssh::SshSession;
