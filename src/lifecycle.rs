//! Reservation, table and bill state machines.
//!
//! Each enum is persisted as a short string column. Transitions go through the
//! methods below; services never compare raw state strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} a {from} {entity}")]
pub struct InvalidTransition {
    pub entity: &'static str,
    pub from: &'static str,
    pub action: &'static str,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    // Stored by older records; nothing transitions into these.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "finalized")]
    Finalized,
}

impl ReservationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationState::Active => "active",
            ReservationState::Cancelled => "cancelled",
            ReservationState::InProgress => "in_progress",
            ReservationState::Completed => "completed",
            ReservationState::Finalized => "finalized",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, ReservationState::Active)
    }

    /// Edits keep the state; only active reservations may be edited.
    pub fn edit(self) -> Result<Self, InvalidTransition> {
        self.require_active("edit")
    }

    pub fn assign_table(self) -> Result<Self, InvalidTransition> {
        self.require_active("assign a table to")
    }

    pub fn cancel(self) -> Result<Self, InvalidTransition> {
        self.require_active("cancel").map(|_| ReservationState::Cancelled)
    }

    fn require_active(self, action: &'static str) -> Result<Self, InvalidTransition> {
        match self {
            ReservationState::Active => Ok(self),
            ReservationState::Cancelled
            | ReservationState::InProgress
            | ReservationState::Completed
            | ReservationState::Finalized => Err(InvalidTransition {
                entity: "reservation",
                from: self.as_str(),
                action,
            }),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "occupied")]
    Occupied,
    #[sea_orm(string_value = "reserved")]
    Reserved,
}

impl TableStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
        }
    }

    pub fn reserve(self) -> Result<Self, InvalidTransition> {
        match self {
            TableStatus::Available => Ok(TableStatus::Reserved),
            TableStatus::Occupied | TableStatus::Reserved => Err(self.refuse("reserve")),
        }
    }

    /// Seating a party: walk-ins take available tables, reservations their reserved one.
    pub fn occupy(self) -> Result<Self, InvalidTransition> {
        match self {
            TableStatus::Available | TableStatus::Reserved => Ok(TableStatus::Occupied),
            TableStatus::Occupied => Err(self.refuse("occupy")),
        }
    }

    pub fn release(self) -> Self {
        TableStatus::Available
    }

    fn refuse(self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            entity: "table",
            from: self.as_str(),
            action,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BillState {
    #[sea_orm(string_value = "current")]
    Current,
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Voided by an admin before payment.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BillState {
    pub fn as_str(self) -> &'static str {
        match self {
            BillState::Current => "current",
            BillState::Closed => "closed",
            BillState::Cancelled => "cancelled",
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, BillState::Current)
    }

    /// Adding, removing or cooking plates all require an open bill.
    pub fn modify(self) -> Result<Self, InvalidTransition> {
        self.require_current("modify")
    }

    pub fn close(self) -> Result<Self, InvalidTransition> {
        self.require_current("close").map(|_| BillState::Closed)
    }

    pub fn cancel(self) -> Result<Self, InvalidTransition> {
        self.require_current("cancel").map(|_| BillState::Cancelled)
    }

    fn require_current(self, action: &'static str) -> Result<Self, InvalidTransition> {
        match self {
            BillState::Current => Ok(self),
            BillState::Closed | BillState::Cancelled => Err(InvalidTransition {
                entity: "bill",
                from: self.as_str(),
                action,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_cancels_once() {
        let cancelled = ReservationState::Active.cancel().unwrap();
        assert_eq!(cancelled, ReservationState::Cancelled);

        let err = cancelled.cancel().unwrap_err();
        assert_eq!(err.to_string(), "cannot cancel a cancelled reservation");
    }

    #[test]
    fn only_active_reservations_are_editable() {
        assert_eq!(ReservationState::Active.edit(), Ok(ReservationState::Active));
        for state in [
            ReservationState::Cancelled,
            ReservationState::InProgress,
            ReservationState::Completed,
            ReservationState::Finalized,
        ] {
            assert!(state.edit().is_err());
            assert!(state.assign_table().is_err());
        }
    }

    #[test]
    fn table_reserve_then_occupy_then_release() {
        let reserved = TableStatus::Available.reserve().unwrap();
        assert!(reserved.reserve().is_err());
        let occupied = reserved.occupy().unwrap();
        assert!(occupied.occupy().is_err());
        assert_eq!(occupied.release(), TableStatus::Available);
    }

    #[test]
    fn bill_close_is_terminal() {
        let closed = BillState::Current.close().unwrap();
        assert_eq!(closed, BillState::Closed);
        assert!(closed.close().is_err());
        assert!(closed.modify().is_err());
        assert!(BillState::Cancelled.modify().is_err());
        assert_eq!(
            closed.modify().unwrap_err().to_string(),
            "cannot modify a closed bill"
        );
    }

    #[test]
    fn only_current_bills_can_be_cancelled() {
        assert_eq!(BillState::Current.cancel(), Ok(BillState::Cancelled));
        assert!(BillState::Closed.cancel().is_err());
        assert!(BillState::Cancelled.cancel().is_err());
        assert!(BillState::Cancelled.close().is_err());
    }

    #[test]
    fn states_serialize_snake_case() {
        let json = serde_json::to_string(&ReservationState::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&BillState::Current).unwrap();
        assert_eq!(json, "\"current\"");
    }
}
