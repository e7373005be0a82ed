use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult,
    models::{Plate, PlateCategory},
    response::{ApiResponse, Listing},
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plates", get(list_plates))
        .route("/categories", get(list_categories))
}

#[utoipa::path(
    get,
    path = "/api/menu/plates",
    responses((status = 200, description = "Menu plates", body = ApiResponse<Listing<Plate>>)),
    tag = "Menu"
)]
pub async fn list_plates(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Listing<Plate>>>> {
    Ok(Json(menu_service::list_plates(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    responses((status = 200, description = "Plate categories", body = ApiResponse<Listing<PlateCategory>>)),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Listing<PlateCategory>>>> {
    Ok(Json(menu_service::list_categories(&state).await?))
}
