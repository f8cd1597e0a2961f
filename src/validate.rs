//! Input checks applied to every operator-supplied value.
//!
//! Values that pass these checks are interpolated into remote
//! command lines, so the expanded checks (branch, user, app name)
//! also reject shell metacharacters.

use std::sync::LazyLock;

use regex::Regex;

static IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(\.[0-9]{1,3}){3}$").expect("ip regex must compile"));

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits regex must compile"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?|git)://").expect("url regex must compile"));

static SSH_USER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("ssh user regex must compile")
});

static APP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("app name regex must compile")
});

static ENV_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env key regex must compile"));

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9+.-]+$").expect("package regex must compile"));

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._~-]+$").expect("token regex must compile"));

static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s;&|`$()<>'\x22\\]").expect("unsafe chars regex must compile"));

/// Four dot-separated groups of one to three digits. Octet values
/// are not range-checked.
#[must_use]
pub fn is_valid_ip(s: &str) -> bool {
    IP_RE.is_match(s)
}

/// Parse a decimal port in `[1, 65535]`.
#[must_use]
pub fn parse_port(s: &str) -> Option<u16> {
    if !DIGITS_RE.is_match(s) {
        return None;
    }
    s.parse::<u16>().ok().filter(|&port| port >= 1)
}

#[must_use]
pub fn is_valid_port(s: &str) -> bool {
    parse_port(s).is_some()
}

/// Repository URLs must start with `http://`, `https://` or
/// `git://`.
#[must_use]
pub fn is_valid_repo_url(s: &str) -> bool {
    URL_RE.is_match(s)
}

/// Access token made of URL-unreserved characters only, so it can
/// sit in the user-info part of a URL without encoding.
#[must_use]
pub fn is_valid_token(s: &str) -> bool {
    TOKEN_RE.is_match(s)
}

#[must_use]
pub fn is_valid_branch(s: &str) -> bool {
    !s.is_empty()
        && !UNSAFE_CHARS_RE.is_match(s)
        && !s.starts_with('-')
        && !s.contains("..")
        && !s.contains("//")
        && !s.ends_with('/')
        && !s.ends_with(".lock")
}

#[must_use]
pub fn is_valid_ssh_user(s: &str) -> bool {
    SSH_USER_RE.is_match(s)
}

/// Container, image and nginx site name.
#[must_use]
pub fn is_valid_app_name(s: &str) -> bool {
    APP_NAME_RE.is_match(s)
}

/// Hostname or IP usable as an nginx `server_name`.
#[must_use]
pub fn is_valid_domain(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[must_use]
pub fn is_valid_env_key(s: &str) -> bool {
    ENV_KEY_RE.is_match(s)
}

/// Debian package name.
#[must_use]
pub fn is_valid_package(s: &str) -> bool {
    PACKAGE_RE.is_match(s)
}

/// Absolute remote path without shell metacharacters.
#[must_use]
pub fn is_valid_remote_dir(s: &str) -> bool {
    s.starts_with('/') && s.len() > 1 && !UNSAFE_CHARS_RE.is_match(s) && !s.contains("..")
}
