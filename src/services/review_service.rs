use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    db::now,
    dto::reviews::CreateReviewRequest,
    entity::{
        Reviews, Users,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Model as ReviewModel},
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Review, ReviewBoard},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{FieldErrors, MAX_REVIEW_TITLE, non_blank},
};

/// Public. `user_has_reviewed` is only ever true for a signed-in caller.
pub async fn list_reviews(
    state: &AppState,
    user: Option<&AuthUser>,
) -> AppResult<ApiResponse<ReviewBoard>> {
    let models = Reviews::find()
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let user_has_reviewed = match user {
        Some(user) => models.iter().any(|r| r.user_id == user.user_id),
        None => false,
    };

    let author_ids: Vec<Uuid> = models.iter().map(|r| r.user_id).collect();
    let authors: HashMap<Uuid, String> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(author_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    };

    let reviews = models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.user_id).cloned().unwrap_or_default();
            review_from_entity(model, author)
        })
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewBoard {
            reviews,
            user_has_reviewed,
        },
        Some(Meta::empty()),
    ))
}

/// One review per account; a second attempt is a conflict.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let author = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    let existing = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(
            "User has already created a review".into(),
        ));
    }

    let mut errors = FieldErrors::new();
    let title = non_blank(payload.title.as_deref()).map(str::to_string);
    if title
        .as_deref()
        .is_some_and(|t| t.chars().count() > MAX_REVIEW_TITLE)
    {
        errors.add(
            "title",
            format!("title must be at most {MAX_REVIEW_TITLE} characters"),
        );
    }
    let content = non_blank(payload.content.as_deref()).map(str::to_string);
    if content.is_none() {
        errors.add("content", "content is required");
    }
    if payload.score.is_some_and(|score| !(1..=5).contains(&score)) {
        errors.add("score", "score must be between 1 and 5");
    }

    let (Some(content), true) = (content, errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        title: Set(title),
        content: Set(content),
        score: Set(payload.score),
        created_at: Set(now()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review, author.name),
        Some(Meta::empty()),
    ))
}

fn review_from_entity(model: ReviewModel, user_name: String) -> Review {
    Review {
        id: model.id,
        user_id: model.user_id,
        user_name,
        title: model.title,
        content: model.content,
        score: model.score,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}
