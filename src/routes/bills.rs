use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::bills::{AddPlateRequest, BillListQuery, FinalizeBillRequest, OpenBillRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Bill,
    response::{ApiResponse, Listing},
    services::bill_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills))
        .route("/open", post(open_bill))
        .route("/{id}", get(get_bill))
        .route("/add-plate/{bill_id}", post(add_plate))
        .route("/{bill_id}/plates/{bill_plate_id}", delete(remove_plate))
        .route("/finalize/{bill_id}", post(finalize_bill))
}

#[utoipa::path(
    get,
    path = "/api/bill",
    params(BillListQuery),
    responses(
        (status = 200, description = "Bills visible to the caller", body = ApiResponse<Listing<Bill>>),
        (status = 403, description = "Waiter role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BillListQuery>,
) -> AppResult<Json<ApiResponse<Listing<Bill>>>> {
    let resp = bill_service::list_bills(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bill/{id}",
    params(("id" = Uuid, Path, description = "Bill id")),
    responses(
        (status = 200, description = "Bill with its plates", body = ApiResponse<Bill>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn get_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let resp = bill_service::get_bill(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bill/open",
    request_body = OpenBillRequest,
    responses(
        (status = 201, description = "Bill opened", body = ApiResponse<Bill>),
        (status = 400, description = "Unknown table or waiter"),
        (status = 409, description = "The table already has a current bill")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn open_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OpenBillRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Bill>>)> {
    let resp = bill_service::open_bill(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/bill/add-plate/{bill_id}",
    params(("bill_id" = Uuid, Path, description = "Bill id")),
    request_body = AddPlateRequest,
    responses(
        (status = 200, description = "Plate added, total recomputed", body = ApiResponse<Bill>),
        (status = 400, description = "One or more fields failed validation")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn add_plate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<AddPlateRequest>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let resp = bill_service::add_plate(&state, &user, bill_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bill/{bill_id}/plates/{bill_plate_id}",
    params(
        ("bill_id" = Uuid, Path, description = "Bill id"),
        ("bill_plate_id" = Uuid, Path, description = "Bill line id")
    ),
    responses(
        (status = 200, description = "Plate removed, total recomputed", body = ApiResponse<Bill>),
        (status = 400, description = "Bill is closed"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn remove_plate(
    State(state): State<AppState>,
    user: AuthUser,
    Path((bill_id, bill_plate_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let resp = bill_service::remove_plate(&state, &user, bill_id, bill_plate_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bill/finalize/{bill_id}",
    params(("bill_id" = Uuid, Path, description = "Bill id")),
    request_body = FinalizeBillRequest,
    responses(
        (status = 200, description = "Bill closed", body = ApiResponse<Bill>),
        (status = 400, description = "Invalid payment, tip, or bill state")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn finalize_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<FinalizeBillRequest>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let resp = bill_service::finalize_bill(&state, &user, bill_id, payload).await?;
    Ok(Json(resp))
}
