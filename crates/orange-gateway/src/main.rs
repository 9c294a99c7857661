//! Orange Gateway - Entry point.

use gateway_store::{FileStorage, GatewayStore, MemoryStorage, Storage, SvgQrEncoder};
use orange_gateway::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wallet_client::WalletClient;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log.level);

    info!("Starting Orange Gateway");

    // Initialize storage
    let storage: Arc<dyn Storage> = if config.storage.persist {
        let files = FileStorage::new(config.storage.dir.clone());
        info!("Persisting gateways under {:?}", files.dir());
        Arc::new(files)
    } else {
        warn!("Persistence disabled, using in-memory storage (data will be lost on restart)");
        Arc::new(MemoryStorage::new())
    };

    let qr = Arc::new(SvgQrEncoder::new(config.qr.clone()));
    info!(
        width = qr.options().width,
        margin = qr.options().margin,
        "QR encoder ready"
    );
    let store = GatewayStore::new(storage, qr, &config.server.public_origin);
    info!("Shareable links served under {}/pay/", store.origin());

    let snapshot = store.load_all().await;
    info!(
        "Loaded {} gateways ({} payments recorded)",
        snapshot.len(),
        snapshot.total_transactions()
    );

    // Initialize wallet bridge
    let wallet = match &config.wallet.rpc_url {
        Some(url) => match WalletClient::new(url, config.wallet.timeout) {
            Ok(client) => {
                info!("Wallet bridge configured at {}", client.rpc_url());
                Some(client)
            }
            Err(e) => {
                error!("Failed to create wallet client: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No wallet bridge configured, web3 payments unavailable");
            None
        }
    };

    let state = AppState::new(store, wallet, config.checkout.processing_delay);
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);
    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
