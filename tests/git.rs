use std::path::Path;

use shipwright::cmd;
use shipwright::git::{authenticated_url, clone_or_update};
use shipwright::DeployConfig;

#[test]
fn token_goes_into_user_info() {
    assert_eq!(
        authenticated_url("https://github.com/acme/site.git", "ghp_abc"),
        "https://ghp_abc@github.com/acme/site.git"
    );
}

#[test]
fn git_scheme_is_untouched() {
    assert_eq!(
        authenticated_url("git://example.org/site.git", "ghp_abc"),
        "git://example.org/site.git"
    );
}

fn git(dir: &Path, args: &[&str]) {
    let dir = dir.display().to_string();
    let mut full = vec![
        "-C",
        dir.as_str(),
        "-c",
        "user.name=Test",
        "-c",
        "user.email=test@example.com",
    ];
    full.extend_from_slice(args);
    cmd::run("git", &full).unwrap();
}

/// A local repository with one commit on `main` holding a
/// Dockerfile.
fn origin(root: &Path) -> String {
    let origin = root.join("origin");
    std::fs::create_dir_all(&origin).unwrap();
    git(&origin, &["init", "-q"]);
    git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    std::fs::write(origin.join("Dockerfile"), "FROM nginx:alpine\nCOPY . /usr/share/nginx/html\n")
        .unwrap();
    git(&origin, &["add", "Dockerfile"]);
    git(&origin, &["commit", "-q", "-m", "initial"]);
    origin.display().to_string()
}

#[test]
fn clones_then_updates() {
    if !cmd::command_exists("git") {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let origin_path = origin(root.path());
    let workdir = root.path().join("work");
    let config = DeployConfig {
        repo_url: origin_path.clone(),
        workdir: workdir.clone(),
        ..DeployConfig::default()
    };

    let checkout = clone_or_update(&config).unwrap();

    assert_eq!(checkout, workdir.join("origin"));
    assert!(checkout.join("Dockerfile").is_file());

    std::fs::write(root.path().join("origin/index.html"), "<h1>v2</h1>").unwrap();
    git(&root.path().join("origin"), &["add", "index.html"]);
    git(&root.path().join("origin"), &["commit", "-q", "-m", "v2"]);

    let again = clone_or_update(&config).unwrap();

    assert_eq!(again, checkout);
    assert_eq!(
        std::fs::read_to_string(checkout.join("index.html")).unwrap(),
        "<h1>v2</h1>"
    );
}

#[test]
fn refuses_non_git_directory() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("site")).unwrap();
    let config = DeployConfig {
        repo_url: "https://github.com/acme/site.git".into(),
        workdir: root.path().to_path_buf(),
        ..DeployConfig::default()
    };

    let err = clone_or_update(&config).unwrap_err();

    assert!(err.to_string().contains("is not a git checkout"));
}
