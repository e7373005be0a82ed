use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::bills::MarkCookedRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{CookedStatus, KitchenTicket},
    response::{ApiResponse, Listing},
    services::kitchen_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue", get(queue))
        .route("/mark-cooked/{bill_plate_id}", post(mark_cooked))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/queue",
    responses(
        (status = 200, description = "Plates waiting to be cooked", body = ApiResponse<Listing<KitchenTicket>>),
        (status = 403, description = "Kitchen role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn queue(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Listing<KitchenTicket>>>> {
    let resp = kitchen_service::queue(&state, &user).await?;
    Ok(Json(resp))
}

/// An empty body marks the plate as cooked.
#[utoipa::path(
    post,
    path = "/api/kitchen/mark-cooked/{bill_plate_id}",
    params(("bill_plate_id" = Uuid, Path, description = "Bill line id")),
    request_body(content = MarkCookedRequest, description = "Defaults to cooked = true"),
    responses(
        (status = 200, description = "Cooked status", body = ApiResponse<CookedStatus>),
        (status = 403, description = "Bill is closed, or kitchen role required"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn mark_cooked(
    State(state): State<AppState>,
    user: AuthUser,
    Path(bill_plate_id): Path<Uuid>,
    payload: Option<Json<MarkCookedRequest>>,
) -> AppResult<Json<ApiResponse<CookedStatus>>> {
    let cooked = payload.map(|Json(p)| p.cooked).unwrap_or(true);
    let resp = kitchen_service::mark_cooked(&state, &user, bill_plate_id, cooked).await?;
    Ok(Json(resp))
}
