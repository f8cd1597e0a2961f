use tracing::info;

use crate::config::{DeployConfig, PROXY_PORT};
use crate::error::DeployResult;
use crate::ssh::{SshSession, privileged};

pub const SITES_AVAILABLE: &str = "/etc/nginx/sites-available";
pub const SITES_ENABLED: &str = "/etc/nginx/sites-enabled";

/// Render the reverse-proxy site for the deployed container.
#[must_use]
pub fn render(config: &DeployConfig) -> String {
    let server_name = config.server_name();
    let app_port = config.app_port;
    format!(
        "server {{
    listen {PROXY_PORT};
    listen [::]:{PROXY_PORT};
    server_name {server_name};

    location / {{
        proxy_pass http://127.0.0.1:{app_port};
        proxy_http_version 1.1;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
    }}
}}
"
    )
}

#[must_use]
pub fn site_path(config: &DeployConfig) -> String {
    format!("{SITES_AVAILABLE}/{}", config.app_name())
}

/// Commands run after the site file is written: enable it, drop the
/// stock default site, check syntax, reload. Prefixed with `sudo`
/// for non-root users.
#[must_use]
pub fn activate_commands(config: &DeployConfig) -> Vec<String> {
    let available = site_path(config);
    let enabled = format!("{SITES_ENABLED}/{}", config.app_name());
    [
        format!("ln -sf {available} {enabled}"),
        format!("rm -f {SITES_ENABLED}/default"),
        "nginx -t".to_string(),
        "systemctl reload nginx".to_string(),
    ]
    .iter()
    .map(|command| privileged(&config.ssh_user, command))
    .collect()
}

/// Install the site and reload nginx. A failing `nginx -t` aborts
/// before the reload.
pub fn configure(ssh: &SshSession, config: &DeployConfig) -> DeployResult<()> {
    let path = site_path(config);
    info!("Writing nginx site {path}...");
    ssh.write_remote_file(&render(config), &path)?;

    for command in activate_commands(config) {
        info!("  $ {command}");
        ssh.exec_interactive(&command)?;
    }

    info!("nginx reloaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig {
            repo_url: "https://github.com/acme/site.git".into(),
            server_ip: "203.0.113.10".into(),
            app_port: 8081,
            ..DeployConfig::default()
        }
    }

    #[test]
    fn proxies_to_app_port() {
        let site = render(&config());

        assert!(site.contains("listen 80;"));
        assert!(site.contains("proxy_pass http://127.0.0.1:8081;"));
        assert!(site.contains("proxy_set_header X-Forwarded-Proto $scheme;"));
    }

    #[test]
    fn server_name_falls_back_to_ip() {
        let site = render(&config());

        assert!(site.contains("server_name 203.0.113.10;"));
    }

    #[test]
    fn server_name_uses_domain() {
        let cfg = DeployConfig {
            domain: Some("site.example.com".into()),
            ..config()
        };

        assert!(render(&cfg).contains("server_name site.example.com;"));
    }

    #[test]
    fn braces_balance() {
        let site = render(&config());

        assert_eq!(site.matches('{').count(), site.matches('}').count());
    }

    #[test]
    fn non_root_activation_uses_sudo() {
        let cfg = DeployConfig {
            ssh_user: "deploy".into(),
            ..config()
        };

        let cmds = activate_commands(&cfg);

        assert!(cmds.iter().all(|c| c.starts_with("sudo ")));
        assert!(cmds.contains(&"sudo nginx -t".to_string()));
    }

    #[test]
    fn test_runs_before_reload() {
        let cmds = activate_commands(&config());

        let test = cmds.iter().position(|c| c == "nginx -t").unwrap();
        let reload = cmds.iter().position(|c| c == "systemctl reload nginx").unwrap();

        assert!(test < reload);
        assert_eq!(
            cmds[0],
            "ln -sf /etc/nginx/sites-available/site /etc/nginx/sites-enabled/site"
        );
    }
}
