use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// 1 to 5.
    pub score: Option<i32>,
}
