use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tokio::sync::mpsc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use herbcart_api::{
    auth::AuthService,
    config::{init_tracing, load_config, AppConfig},
    db,
    events::{process_events, EventSender},
    handlers::AppServices,
    payments::{RazorpayClient, RazorpayConfig},
    services::NotificationService,
    api_routes, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);
    info!(environment = %config.environment, "starting herbcart api");

    let db = Arc::new(
        db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?,
    );
    if config.auto_migrate {
        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }

    let auth = Arc::new(AuthService::new(
        &config.jwt_secret,
        config.jwt_expiration_secs as i64,
        config.is_production(),
    ));

    let razorpay = match RazorpayConfig::from_app_config(&config) {
        Some(rp_config) => Some(Arc::new(
            RazorpayClient::new(rp_config).context("failed to build payment client")?,
        )),
        None => {
            warn!("razorpay credentials not set; online payments disabled");
            None
        }
    };

    let (tx, rx) = mpsc::channel(config.event_channel_capacity);
    let event_sender = EventSender::new(tx);

    let notifications = Arc::new(
        NotificationService::from_config(&config).context("failed to build notifier")?,
    );
    tokio::spawn(process_events(rx, db.clone(), notifications));

    let services = AppServices::new(
        db.clone(),
        event_sender.clone(),
        auth.clone(),
        razorpay,
        &config,
    );
    let state = AppState {
        db,
        config: config.clone(),
        auth,
        services,
        event_sender,
    };

    let cors = build_cors(&config)?;
    let app = api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shutdown complete");
    Ok(())
}

fn build_cors(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if let Some(raw) = config
        .cors_allowed_origins
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin: {}", origin))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        return Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(config.cors_allow_credentials));
    }

    if config.should_allow_permissive_cors() {
        warn!("CORS is mirroring request origins; do not use this outside development");
        // Mirroring keeps credentialed requests working where a wildcard
        // origin would be rejected by the browser.
        return Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(config.cors_allow_credentials));
    }

    anyhow::bail!("CORS origins must be configured outside development");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received terminate signal"),
    }
}
