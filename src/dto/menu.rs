use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PlateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "115.00")]
    pub price: Option<Decimal>,
    /// Category label.
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub label: String,
}
