//! examrizz-billing server binary.
//!
//! Loads configuration, connects to PostgreSQL and serves the Stripe
//! webhook endpoint until Ctrl-C or SIGTERM.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use examrizz_billing::adapters::cache::{HttpCacheInvalidator, NoopCacheInvalidator};
use examrizz_billing::adapters::http::{billing_router, BillingAppState};
use examrizz_billing::adapters::postgres::PostgresSubscriptionRepository;
use examrizz_billing::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use examrizz_billing::application::handlers::billing::{
    CancelSubscriptionHandler, HandleStripeWebhookHandler, LinkCheckoutHandler,
    SyncSubscriptionHandler,
};
use examrizz_billing::config::AppConfig;
use examrizz_billing::domain::subscription::StripeWebhookVerifier;
use examrizz_billing::ports::{CacheInvalidator, PaymentProvider, SubscriptionRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "Starting examrizz-billing"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let repository: Arc<dyn SubscriptionRepository> =
        Arc::new(PostgresSubscriptionRepository::new(pool));

    let stripe_config = StripeConfig::new(config.payment.api_key())
        .with_base_url(config.payment.stripe_api_base_url.clone());
    let payment_provider: Arc<dyn PaymentProvider> =
        Arc::new(StripePaymentAdapter::new(stripe_config)?);

    let cache: Arc<dyn CacheInvalidator> = match config.cache.invalidation_url.as_deref() {
        Some(url) if config.cache.is_enabled() => {
            tracing::info!(endpoint = %url, "Cache invalidation enabled");
            Arc::new(HttpCacheInvalidator::new(url, config.cache.timeout())?)
        }
        _ => {
            tracing::info!("Cache invalidation disabled");
            Arc::new(NoopCacheInvalidator)
        }
    };

    let verifier = StripeWebhookVerifier::new(config.payment.webhook_secret())
        .with_tolerance_secs(config.payment.webhook_tolerance_secs)
        .with_require_livemode(config.payment.require_livemode);

    let price_table = Arc::new(config.payment.price_tier_table());
    tracing::debug!(prices = price_table.len(), "Price table loaded");

    let sync = Arc::new(SyncSubscriptionHandler::new(
        repository.clone(),
        cache.clone(),
        price_table,
    ));
    let cancel = Arc::new(CancelSubscriptionHandler::new(
        repository.clone(),
        cache.clone(),
    ));
    let checkout = Arc::new(LinkCheckoutHandler::new(
        repository,
        payment_provider,
        sync.clone(),
        cache,
    ));
    let webhook_handler = Arc::new(HandleStripeWebhookHandler::new(
        Arc::new(verifier),
        sync,
        cancel,
        checkout,
    ));

    let app: Router = billing_router()
        .with_state(BillingAppState::new(webhook_handler))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
