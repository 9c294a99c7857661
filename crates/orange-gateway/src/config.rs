//! Service configuration.

use anyhow::{Context, Result};
use gateway_store::QrOptions;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Gateway storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// QR image rendering
    #[serde(default)]
    pub qr: QrOptions,

    /// Checkout flow configuration
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Wallet bridge configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin that shareable links are built on
    #[serde(default = "default_public_origin")]
    pub public_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the gateway and stats slots
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Enable persistence (if false, gateways live in memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Simulated processing time before a checkout succeeds
    #[serde(default = "default_processing_delay", with = "humantime_serde")]
    pub processing_delay: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet; unset means no wallet is available
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Request timeout
    #[serde(default = "default_wallet_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            public_origin: default_public_origin(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            persist: true,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            processing_delay: default_processing_delay(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            timeout: default_wallet_timeout(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_public_origin() -> String {
    "http://localhost:3000".into()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("/data/orange-gateway")
}

fn default_true() -> bool {
    true
}

fn default_processing_delay() -> Duration {
    Duration::from_secs(3)
}

fn default_wallet_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_global_rpm() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
