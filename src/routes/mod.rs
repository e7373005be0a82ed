use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod bills;
pub mod doc;
pub mod health;
pub mod kitchen;
pub mod menu;
pub mod params;
pub mod reservations;
pub mod reviews;
pub mod tables;
pub mod waiter;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/reservation", reservations::router())
        .nest("/waiter", waiter::router())
        .nest("/bill", bills::router())
        .nest("/kitchen", kitchen::router())
        .nest("/menu", menu::router())
        .nest("/reviews", reviews::router())
        .nest("/tables", tables::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}

/// Full application router with state bound; transport layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
