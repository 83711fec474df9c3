//! txtrail daemon — entry point for running the address-transaction service.

mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use txtrail_client::{HttpLedgerClient, LedgerClient};
use txtrail_enrich::{EnrichConfig, Enricher, ForkPolicy};
use txtrail_rpc::{AppState, RpcServer};
use txtrail_store::TxCacheStore;
use txtrail_store_lmdb::LmdbCacheStore;

use config::ServiceConfig;

#[derive(Parser)]
#[command(name = "txtrail-daemon", about = "txtrail address-transaction service")]
struct Cli {
    /// Port the HTTP API listens on.
    #[arg(long, env = "TXTRAIL_PORT")]
    port: Option<u16>,

    /// Directory of the LMDB cache environment.
    #[arg(long, env = "TXTRAIL_CACHE_PATH")]
    cache_path: Option<PathBuf>,

    /// Name of the container ("bucket") records live in.
    #[arg(long, env = "TXTRAIL_CONTAINER_NAME")]
    container_name: Option<String>,

    /// Base URL of the ledger data source API.
    #[arg(long, env = "TXTRAIL_LEDGER_URL")]
    ledger_url: Option<String>,

    /// Cap on concurrent block-height lookups per request.
    #[arg(long, env = "TXTRAIL_MAX_CONCURRENT_HEIGHTS")]
    max_concurrent_heights: Option<usize>,

    /// Per-request enrichment deadline, in seconds.
    #[arg(long, env = "TXTRAIL_REQUEST_DEADLINE_SECS")]
    request_deadline_secs: Option<u64>,

    /// Tie-break rule for fork-ambiguous heights: "first-returned" or
    /// "reject".
    #[arg(long, env = "TXTRAIL_FORK_POLICY")]
    fork_policy: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TXTRAIL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_fork_policy(s: &str) -> ForkPolicy {
    match s.to_lowercase().as_str() {
        "reject" => ForkPolicy::Reject,
        _ => ForkPolicy::FirstReturned,
    }
}

impl Cli {
    /// Resolve the effective configuration: file as base, CLI/env on top.
    /// An unreadable or malformed config file is startup-fatal.
    fn into_config(self) -> anyhow::Result<ServiceConfig> {
        let mut config = if let Some(ref path) = self.config {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("read config file {}", path.display()))?;
            toml::from_str::<ServiceConfig>(&contents)
                .with_context(|| format!("parse config file {}", path.display()))?
        } else {
            ServiceConfig::default()
        };

        if let Some(port) = self.port {
            config.listen_port = port;
        }
        if let Some(path) = self.cache_path {
            config.cache_path = path;
        }
        if let Some(name) = self.container_name {
            config.container_name = name;
        }
        if let Some(url) = self.ledger_url {
            config.ledger_url = url;
        }
        if let Some(n) = self.max_concurrent_heights {
            config.max_concurrent_heights = n;
        }
        if let Some(secs) = self.request_deadline_secs {
            config.request_deadline_secs = secs;
        }
        if let Some(ref policy) = self.fork_policy {
            config.fork_policy = parse_fork_policy(policy);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.into_config()?;
    logging::init_tracing(&config.log_level);

    tracing::info!(
        "Starting txtrail (port {}, cache {}, ledger {})",
        config.listen_port,
        config.cache_path.display(),
        config.ledger_url,
    );

    // Startup-fatal section: without the cache environment and its container
    // no request can be served.
    let store = Arc::new(
        LmdbCacheStore::open(&config.cache_path, &config.container_name)
            .context("open cache environment")?,
    );
    store
        .ensure_container()
        .context("create cache container")?;

    let client = Arc::new(HttpLedgerClient::with_timeout(
        &config.ledger_url,
        Duration::from_secs(config.http_timeout_secs),
    ));

    let enrich_config = EnrichConfig {
        max_concurrent_heights: config.max_concurrent_heights,
        deadline: Duration::from_secs(config.request_deadline_secs),
        fork_policy: config.fork_policy,
    };
    let client: Arc<dyn LedgerClient> = client;
    let store: Arc<dyn TxCacheStore> = store;
    let enricher = Enricher::new(Arc::clone(&client), Arc::clone(&store), enrich_config);

    let state = Arc::new(AppState {
        client,
        store,
        enricher,
    });

    RpcServer::new(config.listen_port, state).start().await?;

    Ok(())
}
