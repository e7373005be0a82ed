use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::reviews::CreateReviewRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Review, ReviewBoard},
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<ReviewBoard>),
        (status = 401, description = "A token was sent but is invalid")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Json<ApiResponse<ReviewBoard>>> {
    Ok(Json(review_service::list_reviews(&state, user.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "One or more fields failed validation"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "The user has already left a review")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::create_review(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
