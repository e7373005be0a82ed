use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Table, TableArea},
    response::{ApiResponse, Listing},
    services::table_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables))
        .route("/areas", get(list_areas))
}

#[utoipa::path(
    get,
    path = "/api/tables/areas",
    responses((status = 200, description = "Table areas", body = ApiResponse<Listing<TableArea>>)),
    tag = "Tables"
)]
pub async fn list_areas(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Listing<TableArea>>>> {
    Ok(Json(table_service::list_areas(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/tables",
    responses(
        (status = 200, description = "Floor plan with status and open bill", body = ApiResponse<Listing<Table>>),
        (status = 403, description = "Waiter role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Listing<Table>>>> {
    Ok(Json(table_service::list_tables(&state, &user).await?))
}
