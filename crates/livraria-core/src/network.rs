//! Container-aware URL handling.
//!
//! Inside a container `localhost` names the container itself, not the host
//! machine where a development API usually runs. When a container runtime is
//! detected, loopback hosts are rewritten to `host.docker.internal`.

use std::env;
use std::fs;
use std::path::Path;

pub const DOCKER_HOST_ALIAS: &str = "host.docker.internal";

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Where the process is running, as far as URL rewriting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    Host,
    Container,
}

impl RuntimeEnvironment {
    /// Detect a container from the Docker marker file, the
    /// `DOCKER_CONTAINER` variable, or a hostname mentioning docker.
    pub fn detect() -> Self {
        let marker = Path::new("/.dockerenv").exists();
        let flagged = env::var_os("DOCKER_CONTAINER").is_some();
        let hostname = env::var("HOSTNAME")
            .ok()
            .or_else(|| fs::read_to_string("/etc/hostname").ok())
            .unwrap_or_default();

        if marker || flagged || hostname.to_ascii_lowercase().contains("docker") {
            Self::Container
        } else {
            Self::Host
        }
    }

    /// Rewrite `url` for this environment. Host URLs pass through unchanged.
    pub fn resolve_url(self, url: &str) -> String {
        match self {
            Self::Host => url.to_owned(),
            Self::Container => rewrite_loopback(url).unwrap_or_else(|| url.to_owned()),
        }
    }
}

/// Replace a leading `localhost`/`127.0.0.1` host (with optional port) by the
/// Docker host alias. Returns `None` when the URL has no loopback host.
pub fn rewrite_loopback(url: &str) -> Option<String> {
    let scheme_len = ["http://", "https://"]
        .iter()
        .find(|scheme| {
            url.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })
        .map(|scheme| scheme.len())?;

    let (scheme, rest) = url.split_at(scheme_len);
    let host = LOOPBACK_HOSTS.iter().find(|host| {
        rest.get(..host.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(host))
    })?;

    let tail = &rest[host.len()..];
    // `localhost.example.com` or `127.0.0.10` are different hosts.
    if !(tail.is_empty() || tail.starts_with([':', '/', '?', '#'])) {
        return None;
    }

    Some(format!("{scheme}{DOCKER_HOST_ALIAS}{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_localhost_and_keeps_port_and_path() {
        assert_eq!(
            rewrite_loopback("http://localhost:3000/api"),
            Some(String::from("http://host.docker.internal:3000/api"))
        );
        assert_eq!(
            rewrite_loopback("HTTPS://127.0.0.1"),
            Some(String::from("HTTPS://host.docker.internal"))
        );
    }

    #[test]
    fn leaves_other_hosts_alone() {
        assert_eq!(rewrite_loopback("https://api.courier.test/"), None);
        assert_eq!(rewrite_loopback("http://localhost.example.com"), None);
        assert_eq!(rewrite_loopback("http://127.0.0.10:80"), None);
        assert_eq!(rewrite_loopback("ftp://localhost"), None);
    }

    #[test]
    fn host_environment_never_rewrites() {
        assert_eq!(
            RuntimeEnvironment::Host.resolve_url("http://localhost:3000"),
            "http://localhost:3000"
        );
        assert_eq!(
            RuntimeEnvironment::Container.resolve_url("http://localhost:3000"),
            "http://host.docker.internal:3000"
        );
    }
}
