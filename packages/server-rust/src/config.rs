//! Command-line and environment configuration for the server binary.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::network::NetworkConfig;
use crate::storage::MemoryInvoiceStore;
use crate::traits::InvoiceStore;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "invoicedesk_server=info,tower_http=info";

/// `InvoiceDesk` server -- invoice create/update/delete over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "invoicedesk-server", version, about)]
pub struct ServerArgs {
    /// Bind address.
    #[arg(long, env = "INVOICEDESK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port (0 picks a free port).
    #[arg(long, env = "INVOICEDESK_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated allowed CORS origins, or `*`.
    #[arg(
        long,
        env = "INVOICEDESK_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "INVOICEDESK_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Seconds to wait for in-flight mutations on shutdown.
    #[arg(long, env = "INVOICEDESK_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,

    /// `PostgreSQL` connection URL. Without it invoices are kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "INVOICEDESK_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Emit logs as JSON lines.
    #[arg(long, env = "INVOICEDESK_LOG_JSON")]
    pub log_json: bool,
}

impl ServerArgs {
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }

    /// Opens the configured store and runs its one-time initialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable, table creation
    /// fails, or `DATABASE_URL` is set on a build without `postgres`.
    pub async fn open_store(&self) -> anyhow::Result<Arc<dyn InvoiceStore>> {
        let store: Arc<dyn InvoiceStore> = match self.database_url.as_deref() {
            None => {
                tracing::warn!("DATABASE_URL not set; invoices are kept in memory");
                Arc::new(MemoryInvoiceStore::new())
            }
            #[cfg(feature = "postgres")]
            Some(url) => Arc::new(
                crate::storage::PostgresInvoiceStore::connect(url, self.db_max_connections).await?,
            ),
            #[cfg(not(feature = "postgres"))]
            Some(_) => {
                anyhow::bail!("DATABASE_URL is set but this build lacks the `postgres` feature")
            }
        };
        store.initialize().await?;
        Ok(store)
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`].
///
/// # Errors
///
/// Returns an error if the filter is malformed or a subscriber is already set.
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_LOG_FILTER)?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_onto_network_config() {
        let args = ServerArgs::try_parse_from(["invoicedesk-server"]).unwrap();
        let config = args.network_config();
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!args.log_json);
    }

    #[test]
    fn flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "invoicedesk-server",
            "--port",
            "8080",
            "--cors-origins",
            "http://a.test,http://b.test",
            "--request-timeout-secs",
            "5",
            "--log-json",
        ])
        .unwrap();
        let config = args.network_config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(args.log_json);
    }

    #[tokio::test]
    async fn no_database_url_opens_memory_store() {
        let mut args = ServerArgs::try_parse_from(["invoicedesk-server"]).unwrap();
        args.database_url = None;
        let store = args.open_store().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
