use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use backend::{
    AppState,
    config::Config,
    gateway::{ChatGateway, WebhookGateway},
    party::{DepartureNotifier, PartyRegistry},
    routes,
    routes::auction::CatalogClient,
};
use tokio::sync::{Mutex, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // All party state lives in this one registry; a restart loses it
    // on purpose.
    let registry = Arc::new(Mutex::new(PartyRegistry::new()));
    let gateway: Arc<dyn ChatGateway> =
        Arc::new(WebhookGateway::new(config.chat_webhook_url.clone()));
    let catalog = CatalogClient::new(
        config.catalog_api_base_url.clone(),
        config.catalog_api_key.clone(),
    );

    let state = AppState {
        registry: registry.clone(),
        gateway: gateway.clone(),
        catalog,
        config: config.clone(),
    };

    // Departure reminder scan, stopped through the watch channel on
    // shutdown.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let notifier = DepartureNotifier::new(registry, gateway, &config);
    let notifier_handle = tokio::spawn(notifier.run(shutdown_rx));

    let api_routes = Router::new()
        // party lifecycle routes
        .route("/parties/create", post(routes::party::create_party))
        .route("/parties/join", post(routes::party::join_party))
        .route("/parties/leave", post(routes::party::leave_party))
        .route("/parties/complete", post(routes::party::complete_party))
        .route("/parties/cancel", post(routes::party::cancel_party))
        .route("/parties/by-id", get(routes::party::find_by_id))
        // auction catalog passthrough
        .route("/auction/search", get(routes::auction::search_items))
        .route("/auction/history", get(routes::auction::search_history));

    let router = Router::new()
        .route("/health", get(routes::health::ping))
        .nest(&config.api_base_uri, api_routes);

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        let cors = tower_http::cors::CorsLayer::permissive();
        router.layer(cors)
    };

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    })
    .await
    .expect("Failed to start server");

    let _ = shutdown_tx.send(true);
    let _ = notifier_handle.await;
}
