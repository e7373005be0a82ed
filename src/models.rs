use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::lifecycle::{BillState, ReservationState, TableStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_waiter: bool,
    pub is_kitchen: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_customer(&self) -> bool {
        !(self.is_admin || self.is_waiter || self.is_kitchen)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TableArea {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Table {
    pub id: Uuid,
    pub code: String,
    pub capacity: i32,
    pub status: TableStatus,
    pub area: Option<TableArea>,
    pub notes: Option<String>,
    pub active_bill_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlateCategory {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Plate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "115.00")]
    pub price: Decimal,
    pub category: Option<PlateCategory>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_time: DateTime<Utc>,
    pub table_area: Option<String>,
    pub table_code: Option<String>,
    pub amount_people: i32,
    pub notes: Option<String>,
    pub state: ReservationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillPlate {
    pub id: Uuid,
    pub plate_id: Uuid,
    pub plate_name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "115.00")]
    pub unit_price: Decimal,
    #[schema(value_type = String, example = "230.00")]
    pub line_total: Decimal,
    pub notes: String,
    pub cooked: bool,
    pub cooked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bill {
    pub id: Uuid,
    pub code: String,
    pub table_code: Option<String>,
    pub waiter_id: Option<Uuid>,
    pub state: BillState,
    #[schema(value_type = String, example = "230.00")]
    pub total: Decimal,
    #[schema(value_type = String, example = "300.00")]
    pub total_paid: Decimal,
    #[schema(value_type = String, example = "10.00")]
    pub tip_percentage: Decimal,
    #[schema(value_type = String, example = "23.00")]
    pub tip_amount: Decimal,
    #[schema(value_type = String, example = "253.00")]
    pub total_with_tip: Decimal,
    /// Present once the bill is closed.
    #[schema(value_type = Option<String>, example = "47.00")]
    pub change: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub plates: Vec<BillPlate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CookedStatus {
    pub id: Uuid,
    pub cooked: bool,
    pub cooked_at: Option<DateTime<Utc>>,
}

/// One uncooked line on the kitchen board.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KitchenTicket {
    pub bill_plate_id: Uuid,
    pub bill_code: String,
    pub table_code: Option<String>,
    pub plate_name: String,
    pub quantity: i32,
    pub notes: String,
    pub ordered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub title: Option<String>,
    pub content: String,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Newest reviews first, with whether the caller has already left one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewBoard {
    pub reviews: Vec<Review>,
    pub user_has_reviewed: bool,
}
