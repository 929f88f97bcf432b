//! Site identity: base address, payload host and the localhost guard

use crate::error::{Error, Result};
use url::{Host, Url};

/// Host names that identify a site which crawlers cannot reach
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1"];

/// The site whose content is announced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base: Url,
    /// Host exactly as written in the configured address, before normalisation
    raw_host: String,
}

impl Site {
    /// Parse the site's canonical base address
    ///
    /// The base is normalised to end with `/` so that relative joins stay
    /// beneath it, e.g. `https://example.com/blog` roots key files at
    /// `https://example.com/blog/`.
    pub fn parse(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if base.host_str().is_none() {
            return Err(Error::InvalidUrl(format!("{}: missing host", base_url)));
        }
        let raw_host = raw_host(base_url.trim()).to_string();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self { base, raw_host })
    }

    /// The normalised base address
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Host component sent as the payload's `host` field
    ///
    /// IPv6 hosts are returned without brackets.
    pub fn host(&self) -> String {
        match self.base.host() {
            Some(Host::Ipv6(addr)) => addr.to_string(),
            Some(host) => host.to_string(),
            None => String::new(),
        }
    }

    /// Whether the site is only reachable from this machine
    ///
    /// Checks the host as configured. Shorthand loopback forms such as
    /// `127.1` are rewritten by URL parsing, so the normalised host is not used.
    pub fn is_local(&self) -> bool {
        is_local_host(&self.raw_host)
    }

    /// Resolve a path relative to the site root
    pub fn join(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Address of the key file, `{site-root}/{key}.txt`
    pub fn key_file_url(&self, key: &str) -> Result<Url> {
        self.join(&format!("{}.txt", key))
    }
}

/// Host portion of an absolute address as written: no userinfo, no port
fn raw_host(address: &str) -> &str {
    let rest = address
        .split_once("://")
        .map_or(address, |(_, rest)| rest);
    let authority = rest
        .split(['/', '?', '#', '\\'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if host_port.starts_with('[') {
        match host_port.find(']') {
            Some(end) => &host_port[..=end],
            None => host_port,
        }
    } else {
        host_port.split(':').next().unwrap_or_default()
    }
}

/// Localhost guard
///
/// True only for an exact, case-insensitive match of `localhost`,
/// `127.0.0.1` or `::1` (brackets around IPv6 literals are ignored). No DNS
/// lookup is made; private ranges and other loopback spellings count as public.
pub fn is_local_host(host: &str) -> bool {
    let host = host
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');
    LOCAL_HOSTS
        .iter()
        .any(|local| host.eq_ignore_ascii_case(local))
}
