use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};
use serde_json::json;

use crate::{
    handler::{
        admin::admin_handler, admin_chat::admin_chat_handler, alerts::alerts_handler,
        auth::auth_handler, chat::chat_handler, otp::otp_handler, users::users_handler,
    },
    middleware::{admin_only, auth},
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/otp", otp_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/repair-alerts",
            alerts_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/chat", chat_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/admin-chat",
            admin_chat_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/admin",
            // auth is the outer layer so the role guard sees the resolved user
            admin_handler()
                .layer(middleware::from_fn(admin_only))
                .layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .nest_service(
            "/uploads",
            ServeDir::new(app_state.env.upload_dir.clone()),
        )
}
