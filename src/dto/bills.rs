use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{lifecycle::BillState, routes::params::Pagination};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenBillRequest {
    pub table_code: Option<String>,
    /// Admins may open a bill on behalf of a waiter; waiters always open their own.
    pub waiter_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddPlateRequest {
    pub plate_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct FinalizeBillRequest {
    #[schema(value_type = Option<String>, example = "300.00")]
    pub amount_paid: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "10")]
    pub tip_percentage: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkCookedRequest {
    #[serde(default = "default_cooked")]
    pub cooked: bool,
}

fn default_cooked() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BillListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub state: Option<BillState>,
}

impl BillListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
