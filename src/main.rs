mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod middleware;
mod models;
mod routes;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    config::Config,
    db::{db::DBClient, otpdb::OtpExt},
    mail::sendmail::Mailer,
    routes::create_router,
};

#[derive(Debug)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let mailer = Arc::new(Mailer::from_config(&config));

        Self {
            env: config,
            db_client: Arc::new(db_client),
            mailer,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = tokio::fs::create_dir_all(&config.upload_dir).await {
        tracing::error!("Failed to create upload directory {}: {}", config.upload_dir, err);
        std::process::exit(1);
    }

    let db_client = DBClient::new(pool);

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    // Expired OTP rows are swept periodically; verification also checks
    // expiry, so the sweeper is purely housekeeping.
    let cleanup_client = app_state.db_client.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            match cleanup_client.cleanup_expired_otps().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Removed {} expired OTP rows", n),
                Err(e) => tracing::warn!("OTP cleanup failed: {}", e),
            }
        }
    });

    let app = create_router(app_state.clone()).layer(cors);

    tracing::info!("Server is running on http://localhost:{}", config.port);
    if app_state.mailer.is_degraded() {
        tracing::warn!("Mailer is in degraded mode - outbound email is logged, not sent");
    }

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
