use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{lifecycle::ReservationState, routes::params::{Pagination, SortOrder}};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// ISO-8601 with offset, e.g. `2025-12-05T19:13:00-06:00`.
    pub date_time: Option<String>,
    /// Table area label.
    pub table_area: Option<String>,
    pub amount_people: Option<i32>,
    pub notes: Option<String>,
}

/// Either a code, or contact details to list matching reservations.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReservationLookup {
    pub code: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// Email or phone that must match the stored reservation.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct IdentityProof {
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EditReservationRequest {
    pub code: String,
    #[serde(flatten)]
    pub identity: IdentityProof,
    pub date_time: Option<String>,
    pub table_area: Option<String>,
    pub amount_people: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelReservationRequest {
    pub code: String,
    #[serde(flatten)]
    pub identity: IdentityProof,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTableRequest {
    pub table_code: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReservationListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub state: Option<ReservationState>,
    pub sort_order: Option<SortOrder>,
}

impl ReservationListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}
