use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        bills::BillListQuery,
        menu::{CategoryRequest, PlateRequest},
        reservations::{CreateReservationRequest, ReservationListQuery},
        tables::{AreaRequest, TableRequest},
        users::CreateUserRequest,
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Bill, Plate, PlateCategory, Reservation, Table, TableArea, User},
    response::{ApiResponse, Listing},
    services::{bill_service, menu_service, reservation_service, table_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", delete(delete_user))
        .route("/table-areas", post(create_area))
        .route("/table-areas/{id}", put(update_area).delete(delete_area))
        .route("/tables", get(list_tables).post(create_table))
        .route("/tables/{id}", put(update_table).delete(delete_table))
        .route("/plate-categories", post(create_category))
        .route("/plate-categories/{id}", put(rename_category))
        .route("/plates", post(create_plate))
        .route("/plates/{id}", put(update_plate).delete(delete_plate))
        .route("/reservations", get(list_reservations))
        .route(
            "/reservations/{id}",
            put(edit_reservation).delete(delete_reservation),
        )
        .route("/bills", get(list_bills))
        .route("/bills/{id}/cancel", post(cancel_bill))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = ApiResponse<Listing<User>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Listing<User>>>> {
    Ok(Json(user_service::list_users(&state, &user).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<User>),
        (status = 400, description = "One or more fields failed validation"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = user_service::create_user(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Cannot delete your own account"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "User is referenced by bills")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    Ok(Json(user_service::delete_user(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/table-areas",
    request_body = AreaRequest,
    responses(
        (status = 201, description = "Table area created", body = ApiResponse<TableArea>),
        (status = 400, description = "Missing or duplicate label")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_area(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AreaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TableArea>>)> {
    let resp = table_service::create_area(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/table-areas/{id}",
    params(("id" = Uuid, Path, description = "Table area id")),
    request_body = AreaRequest,
    responses(
        (status = 200, description = "Table area renamed", body = ApiResponse<TableArea>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_area(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AreaRequest>,
) -> AppResult<Json<ApiResponse<TableArea>>> {
    Ok(Json(table_service::update_area(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/table-areas/{id}",
    params(("id" = Uuid, Path, description = "Table area id")),
    responses(
        (status = 200, description = "Table area deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Tables still belong to the area")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_area(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    Ok(Json(table_service::delete_area(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/tables",
    responses((status = 200, description = "All tables", body = ApiResponse<Listing<Table>>)),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Listing<Table>>>> {
    ensure_admin(&user)?;
    Ok(Json(table_service::list_tables(&state, &user).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/tables",
    request_body = TableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<Table>),
        (status = 400, description = "One or more fields failed validation")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TableRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Table>>)> {
    let resp = table_service::create_table(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id")),
    request_body = TableRequest,
    responses(
        (status = 200, description = "Table updated", body = ApiResponse<Table>),
        (status = 400, description = "One or more fields failed validation"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TableRequest>,
) -> AppResult<Json<ApiResponse<Table>>> {
    Ok(Json(table_service::update_table(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tables/{id}",
    params(("id" = Uuid, Path, description = "Table id")),
    responses(
        (status = 200, description = "Table deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Table is referenced by bills or reservations")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    Ok(Json(table_service::delete_table(&state, &user, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/plate-categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Plate category created", body = ApiResponse<PlateCategory>),
        (status = 400, description = "Missing or duplicate label")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlateCategory>>)> {
    let resp = menu_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/plate-categories/{id}",
    params(("id" = Uuid, Path, description = "Plate category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Plate category renamed", body = ApiResponse<PlateCategory>),
        (status = 400, description = "Missing or duplicate label"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn rename_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<Json<ApiResponse<PlateCategory>>> {
    Ok(Json(menu_service::rename_category(&state, &user, id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/plates",
    request_body = PlateRequest,
    responses(
        (status = 201, description = "Plate created", body = ApiResponse<Plate>),
        (status = 400, description = "One or more fields failed validation")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_plate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Plate>>)> {
    let resp = menu_service::create_plate(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/plates/{id}",
    params(("id" = Uuid, Path, description = "Plate id")),
    request_body = PlateRequest,
    responses(
        (status = 200, description = "Plate updated", body = ApiResponse<Plate>),
        (status = 400, description = "One or more fields failed validation"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_plate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlateRequest>,
) -> AppResult<Json<ApiResponse<Plate>>> {
    Ok(Json(menu_service::update_plate(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/plates/{id}",
    params(("id" = Uuid, Path, description = "Plate id")),
    responses(
        (status = 200, description = "Plate deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Plate appears on bills")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_plate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    Ok(Json(menu_service::delete_plate(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/reservations",
    params(ReservationListQuery),
    responses(
        (status = 200, description = "All reservations", body = ApiResponse<Listing<Reservation>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ReservationListQuery>,
) -> AppResult<Json<ApiResponse<Listing<Reservation>>>> {
    Ok(Json(reservation_service::list_all(&state, &user, query).await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation id")),
    request_body = CreateReservationRequest,
    responses(
        (status = 200, description = "Reservation replaced", body = ApiResponse<Reservation>),
        (status = 400, description = "One or more fields failed validation"),
        (status = 403, description = "Reservation is no longer active"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn edit_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    Ok(Json(
        reservation_service::admin_edit_reservation(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/reservations/{id}",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation deleted"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    Ok(Json(reservation_service::delete_reservation(&state, &user, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/bills",
    params(BillListQuery),
    responses(
        (status = 200, description = "All bills", body = ApiResponse<Listing<Bill>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BillListQuery>,
) -> AppResult<Json<ApiResponse<Listing<Bill>>>> {
    ensure_admin(&user)?;
    Ok(Json(bill_service::list_bills(&state, &user, query).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/bills/{id}/cancel",
    params(("id" = Uuid, Path, description = "Bill id")),
    responses(
        (status = 200, description = "Bill cancelled and table released", body = ApiResponse<Bill>),
        (status = 403, description = "Bill is already closed or cancelled"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn cancel_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    Ok(Json(bill_service::cancel_bill(&state, &user, id).await?))
}
