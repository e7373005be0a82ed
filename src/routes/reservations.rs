use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::reservations::{
        CancelReservationRequest, CreateReservationRequest, EditReservationRequest,
        ReservationLookup,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Reservation,
    response::{ApiResponse, Listing},
    services::reservation_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(lookup))
        .route("/mine", get(mine))
        .route("/create", post(create))
        .route("/edit", post(edit))
        .route("/cancel", post(cancel))
}

#[utoipa::path(
    post,
    path = "/api/reservation/create",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ApiResponse<Reservation>),
        (status = 400, description = "One or more fields failed validation")
    ),
    tag = "Reservations"
)]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reservation>>)> {
    let resp = reservation_service::create_reservation(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/reservation",
    params(ReservationLookup),
    responses(
        (status = 200, description = "Matching reservations", body = ApiResponse<Listing<Reservation>>),
        (status = 400, description = "Neither code nor contact details supplied"),
        (status = 404, description = "No reservation matched")
    ),
    tag = "Reservations"
)]
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<ReservationLookup>,
) -> AppResult<Json<ApiResponse<Listing<Reservation>>>> {
    let resp = reservation_service::lookup(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/reservation/edit",
    request_body = EditReservationRequest,
    responses(
        (status = 201, description = "Reservation updated", body = ApiResponse<Reservation>),
        (status = 400, description = "One or more fields failed validation"),
        (status = 403, description = "Contact details do not match, or the reservation is no longer active or already past"),
        (status = 404, description = "Unknown reservation code")
    ),
    tag = "Reservations"
)]
pub async fn edit(
    State(state): State<AppState>,
    Json(payload): Json<EditReservationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reservation>>)> {
    let resp = reservation_service::edit_reservation(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/reservation/cancel",
    request_body = CancelReservationRequest,
    responses(
        (status = 201, description = "Reservation cancelled", body = ApiResponse<Reservation>),
        (status = 403, description = "Contact details do not match, or already cancelled"),
        (status = 404, description = "Unknown reservation code")
    ),
    tag = "Reservations"
)]
pub async fn cancel(
    State(state): State<AppState>,
    Json(payload): Json<CancelReservationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Reservation>>)> {
    let resp = reservation_service::cancel_reservation(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/reservation/mine",
    responses(
        (status = 200, description = "Reservations booked under the caller's email, newest first", body = ApiResponse<Listing<Reservation>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Reservations"
)]
pub async fn mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Listing<Reservation>>>> {
    Ok(Json(reservation_service::list_mine(&state, &user).await?))
}
