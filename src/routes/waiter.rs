use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::reservations::AssignTableRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Reservation,
    response::{ApiResponse, Listing},
    services::{reservation_service, table_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations/today", get(today))
        .route("/reservations/{id}/assign-table", post(assign_table))
}

#[utoipa::path(
    get,
    path = "/api/waiter/reservations/today",
    responses(
        (status = 200, description = "Active reservations for the current local day", body = ApiResponse<Listing<Reservation>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Waiter"
)]
pub async fn today(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Listing<Reservation>>>> {
    let resp = reservation_service::list_today(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/waiter/reservations/{id}/assign-table",
    params(("id" = Uuid, Path, description = "Reservation id")),
    request_body = AssignTableRequest,
    responses(
        (status = 200, description = "Table assigned", body = ApiResponse<Reservation>),
        (status = 400, description = "Reservation or table not eligible"),
        (status = 403, description = "Waiter role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Waiter"
)]
pub async fn assign_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignTableRequest>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    let resp = table_service::assign_table_to_reservation(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
