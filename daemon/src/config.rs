//! Service configuration with TOML file support.

use serde::Deserialize;
use std::path::PathBuf;

use txtrail_enrich::ForkPolicy;

/// Configuration for the txtrail service.
///
/// Can be loaded from a TOML file (CLI flags and env vars override file
/// values) or built programmatically.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceConfig {
    /// Port the HTTP API listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Directory of the LMDB cache environment.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Name of the container ("bucket") records live in.
    #[serde(default = "default_container_name")]
    pub container_name: String,

    /// Base URL of the ledger data source API.
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,

    /// Per-call HTTP timeout towards the ledger, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Cap on concurrent block-height lookups per request.
    #[serde(default = "default_max_concurrent_heights")]
    pub max_concurrent_heights: usize,

    /// Per-request enrichment deadline, in seconds.
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,

    /// Tie-break rule for fork-ambiguous heights: "first-returned" or
    /// "reject".
    #[serde(default)]
    pub fork_policy: ForkPolicy,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            cache_path: default_cache_path(),
            container_name: default_container_name(),
            ledger_url: default_ledger_url(),
            http_timeout_secs: default_http_timeout_secs(),
            max_concurrent_heights: default_max_concurrent_heights(),
            request_deadline_secs: default_request_deadline_secs(),
            fork_policy: ForkPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_listen_port() -> u16 {
    8080
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./txtrail_cache")
}

fn default_container_name() -> String {
    "transactions".to_string()
}

fn default_ledger_url() -> String {
    "https://blockchain.info".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_heights() -> usize {
    8
}

fn default_request_deadline_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.container_name, "transactions");
        assert_eq!(config.fork_policy, ForkPolicy::FirstReturned);
    }

    #[test]
    fn fork_policy_parses_kebab_case() {
        let config: ServiceConfig = toml::from_str(r#"fork_policy = "reject""#).unwrap();
        assert_eq!(config.fork_policy, ForkPolicy::Reject);
    }
}
