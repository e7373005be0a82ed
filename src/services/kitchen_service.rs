use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::now,
    entity::{
        BillPlates, Bills, Plates, Tables,
        bill_plates::{ActiveModel as BillPlateActive, Column as BillPlateCol},
        bills::Column as BillCol,
        plates::Column as PlateCol,
        tables::Column as TableCol,
    },
    error::{AppError, AppResult},
    lifecycle::BillState,
    middleware::auth::{AuthUser, ensure_kitchen},
    models::{CookedStatus, KitchenTicket},
    response::{ApiResponse, Listing, Meta},
    state::AppState,
};

/// Uncooked lines of open bills, oldest first.
pub async fn queue(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Listing<KitchenTicket>>> {
    ensure_kitchen(user)?;

    let bills = Bills::find()
        .filter(BillCol::State.eq(BillState::Current))
        .all(&state.orm)
        .await?;
    if bills.is_empty() {
        return Ok(ApiResponse::listing("Kitchen queue", Vec::new()));
    }

    let table_ids: Vec<Uuid> = bills.iter().filter_map(|b| b.table_id).collect();
    let tables: HashMap<Uuid, String> = Tables::find()
        .filter(TableCol::Id.is_in(table_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|t| (t.id, t.code))
        .collect();
    let bills: HashMap<Uuid, (String, Option<String>)> = bills
        .into_iter()
        .map(|b| {
            let table = b.table_id.and_then(|id| tables.get(&id).cloned());
            (b.id, (b.code, table))
        })
        .collect();

    let lines = BillPlates::find()
        .filter(BillPlateCol::BillId.is_in(bills.keys().copied().collect::<Vec<_>>()))
        .filter(BillPlateCol::Cooked.eq(false))
        .order_by_asc(BillPlateCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let plate_ids: Vec<Uuid> = lines.iter().map(|l| l.plate_id).collect();
    let plates: HashMap<Uuid, String> = Plates::find()
        .filter(PlateCol::Id.is_in(plate_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let items = lines
        .into_iter()
        .filter_map(|line| {
            let (bill_code, table_code) = bills.get(&line.bill_id)?.clone();
            Some(KitchenTicket {
                bill_plate_id: line.id,
                bill_code,
                table_code,
                plate_name: plates.get(&line.plate_id).cloned().unwrap_or_default(),
                quantity: line.quantity,
                notes: line.notes,
                ordered_at: line.created_at.with_timezone(&chrono::Utc),
            })
        })
        .collect();

    Ok(ApiResponse::listing("Kitchen queue", items))
}

/// Marking an already cooked line keeps its original `cooked_at`.
pub async fn mark_cooked(
    state: &AppState,
    user: &AuthUser,
    bill_plate_id: Uuid,
    cooked: bool,
) -> AppResult<ApiResponse<CookedStatus>> {
    ensure_kitchen(user)?;

    let txn = state.orm.begin().await?;
    let line = BillPlates::find_by_id(bill_plate_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let bill = Bills::find_by_id(line.bill_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    bill.state
        .modify()
        .map_err(|err| AppError::Forbidden(err.to_string()))?;

    let line = match (cooked, line.cooked) {
        (true, true) | (false, false) => line,
        (true, false) => {
            let mut active: BillPlateActive = line.into();
            active.cooked = Set(true);
            active.cooked_at = Set(Some(now()));
            active.update(&txn).await?
        }
        (false, true) => {
            let mut active: BillPlateActive = line.into();
            active.cooked = Set(false);
            active.cooked_at = Set(None);
            active.update(&txn).await?
        }
    };
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "bill_plate_cooked",
        "bill_plates",
        serde_json::json!({ "bill_plate_id": line.id, "cooked": line.cooked }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cooked status updated",
        CookedStatus {
            id: line.id,
            cooked: line.cooked,
            cooked_at: line.cooked_at.map(|at| at.with_timezone(&chrono::Utc)),
        },
        Some(Meta::empty()),
    ))
}
