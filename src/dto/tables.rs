use serde::Deserialize;
use utoipa::ToSchema;

use crate::lifecycle::TableStatus;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TableRequest {
    pub code: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
    /// Area label; `null` leaves the table without an area.
    pub area: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AreaRequest {
    pub label: String,
}
