use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use dora_shared::clients::db::DbPool;
use dora_shared::clients::email::ResendClient;
use dora_shared::clients::sms::TwilioClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub sms: TwilioClient,
    pub email: ResendClient,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dora_shared::middleware::init_tracing("dora-api");

    let config = AppConfig::load()?;
    let port = config.port;

    // Set JWT_SECRET env var for the auth extractor middleware
    std::env::set_var("JWT_SECRET", &config.jwt_secret);

    let db = dora_shared::clients::db::create_pool(&config.database_url)?;

    // Initialize Prometheus metrics
    let metrics_handle = dora_shared::middleware::init_metrics();

    let sms = TwilioClient::new(
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_from_number,
    );
    let email = ResendClient::new(&config.resend_api_key, &config.from_email, "Dora");

    let state = Arc::new(AppState {
        db,
        config,
        sms,
        email,
        metrics_handle,
    });

    let app = Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/users", post(routes::users::register).get(routes::users::list_users))
        .route("/users/:username", get(routes::users::get_user))
        .route("/login", post(routes::auth::login))
        .route("/subscribe", post(routes::subscribers::subscribe))
        .route("/subscribers", get(routes::subscribers::list_subscribers))
        .route("/alerts", post(routes::alerts::create_alerts).get(routes::alerts::list_alerts))
        .layer(axum::middleware::from_fn(
            dora_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "dora-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
