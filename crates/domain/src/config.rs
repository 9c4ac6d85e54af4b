use crate::errors::ArgumentError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Scheme used to reach the DoH endpoints. `http` exists for talking to a
/// local proxy or test server; production resolvers use `https`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DohProtocol {
    Http,
    #[default]
    Https,
}

impl DohProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// RFC 8484 request style.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// Query-id provider. RFC 8484 recommends a constant zero so responses stay
/// HTTP-cacheable; `Random` draws a fresh id per call.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryIdMode {
    Fixed(u16),
    Random,
}

impl Default for QueryIdMode {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

/// Ordering applied to `lookup` results when `verbatim` is off.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DnsOrder {
    #[default]
    Verbatim,
    Ipv4First,
}

/// Resolver construction options. Every field has a default.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Upstream DoH endpoints: a host or IP (bracketed IPv6 accepted),
    /// queried at `/dns-query`. Ordered; order is mutated by smart rotation.
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Base per-attempt timeout in milliseconds; attempt `i` against a
    /// server waits `timeout_ms << i`.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts per server before moving to the next one.
    #[serde(default = "default_tries")]
    pub tries: u32,

    #[serde(default)]
    pub protocol: DohProtocol,

    #[serde(default)]
    pub method: HttpMethod,

    /// Extra request headers, appended after the RFC 8484 set.
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    #[serde(default)]
    pub query_id: QueryIdMode,

    /// Fan-out width of `resolve_any`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Local address to bind outgoing HTTPS connections to.
    #[serde(default)]
    pub local_address_v4: Option<IpAddr>,

    #[serde(default)]
    pub local_address_v6: Option<IpAddr>,

    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// TTL written when a response carries no finite answer TTL.
    #[serde(default = "default_ttl_seconds")]
    pub default_ttl_seconds: u32,

    /// Upper clamp for cache TTLs.
    #[serde(default = "default_max_ttl_seconds")]
    pub max_ttl_seconds: u32,

    #[serde(default)]
    pub dns_order: DnsOrder,

    /// Demote a server to the tail of the rotation after it fails a query.
    #[serde(default = "default_false")]
    pub smart_rotate: bool,

    /// Surface non-2xx DoH responses verbatim (status, headers, body)
    /// instead of folding them into the DNS error taxonomy.
    #[serde(default = "default_false")]
    pub return_http_errors: bool,

    /// Override the platform hosts file location.
    #[serde(default)]
    pub hosts_path: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: default_servers(),
            timeout_ms: default_timeout_ms(),
            tries: default_tries(),
            protocol: DohProtocol::Https,
            method: HttpMethod::Get,
            headers: Vec::new(),
            query_id: QueryIdMode::default(),
            concurrency: default_concurrency(),
            local_address_v4: None,
            local_address_v6: None,
            cache_enabled: true,
            default_ttl_seconds: default_ttl_seconds(),
            max_ttl_seconds: default_max_ttl_seconds(),
            dns_order: DnsOrder::Verbatim,
            smart_rotate: false,
            return_http_errors: false,
            hosts_path: None,
        }
    }
}

impl ResolverConfig {
    /// De-duplicates servers (keeping first occurrence) and checks the
    /// invariants the resolver relies on.
    pub fn validate(&mut self) -> Result<(), ArgumentError> {
        let mut seen = Vec::with_capacity(self.servers.len());
        for server in self.servers.drain(..) {
            if !seen.contains(&server) {
                seen.push(server);
            }
        }
        self.servers = seen;

        if self.servers.is_empty() {
            return Err(ArgumentError::MissingArgs(
                "servers must contain at least one endpoint".into(),
            ));
        }
        if self.tries < 1 {
            return Err(ArgumentError::InvalidArgValue(
                "tries must be >= 1".into(),
            ));
        }
        if self.concurrency < 1 {
            return Err(ArgumentError::InvalidArgValue(
                "concurrency must be >= 1".into(),
            ));
        }
        if self.default_ttl_seconds < 1 || self.max_ttl_seconds < 1 {
            return Err(ArgumentError::InvalidArgValue(
                "ttl bounds must be >= 1 second".into(),
            ));
        }
        Ok(())
    }
}

fn default_servers() -> Vec<String> {
    vec!["1.1.1.1".to_string(), "1.0.0.1".to_string()]
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_tries() -> u32 {
    4
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

fn default_ttl_seconds() -> u32 {
    300
}

fn default_max_ttl_seconds() -> u32 {
    86_400
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let mut config = ResolverConfig::default();
        config.validate().unwrap();
        assert_eq!(config.servers, vec!["1.1.1.1", "1.0.0.1"]);
        assert_eq!(config.tries, 4);
        assert_eq!(config.query_id, QueryIdMode::Fixed(0));
    }

    #[test]
    fn validate_dedupes_preserving_order() {
        let mut config = ResolverConfig {
            servers: vec!["1.1.1.1".into(), "8.8.8.8".into(), "1.1.1.1".into()],
            ..Default::default()
        };
        config.validate().unwrap();
        assert_eq!(config.servers, vec!["1.1.1.1", "8.8.8.8"]);
    }

    #[test]
    fn validate_rejects_empty_servers() {
        let mut config = ResolverConfig {
            servers: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_tries() {
        let mut config = ResolverConfig {
            tries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
