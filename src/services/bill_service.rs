use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    codes::{BILL_PREFIX, MAX_CODE_ATTEMPTS, random_code},
    db::now,
    dto::bills::{AddPlateRequest, BillListQuery, FinalizeBillRequest, OpenBillRequest},
    entity::{
        BillPlates, Bills, Plates, Tables, Users,
        bill_plates::{
            ActiveModel as BillPlateActive, Column as BillPlateCol, Model as BillPlateModel,
        },
        bills::{ActiveModel as BillActive, Column as BillCol, Model as BillModel},
        plates::Column as PlateCol,
        tables::{ActiveModel as TableActive, Column as TableCol},
    },
    error::{AppError, AppResult},
    lifecycle::BillState,
    middleware::auth::{AuthUser, ensure_admin, ensure_waiter},
    models::{Bill, BillPlate},
    money,
    response::{ApiResponse, Listing, Meta},
    state::AppState,
    validation::{FieldErrors, MAX_BILL_PLATE_NOTES, non_blank, validate_notes},
};

pub async fn open_bill(
    state: &AppState,
    user: &AuthUser,
    payload: OpenBillRequest,
) -> AppResult<ApiResponse<Bill>> {
    ensure_waiter(user)?;

    let waiter_id = match payload.waiter_id {
        Some(id) if user.is_admin => id,
        _ => user.user_id,
    };
    let table_code = non_blank(payload.table_code.as_deref()).map(str::to_uppercase);

    let txn = state.orm.begin().await?;
    let mut errors = FieldErrors::new();

    let table = match &table_code {
        None => {
            errors.add("table_code", "table_code is required");
            None
        }
        Some(code) => {
            let table = Tables::find()
                .filter(TableCol::Code.eq(code.as_str()))
                .lock(LockType::Update)
                .one(&txn)
                .await?;
            if table.is_none() {
                errors.add("table_code", format!("table '{code}' does not exist"));
            }
            table
        }
    };

    match Users::find_by_id(waiter_id).one(&txn).await? {
        Some(waiter) if waiter.is_waiter => {}
        Some(_) => errors.add("waiter", "user does not hold the waiter role"),
        None => errors.add("waiter", "waiter does not exist"),
    }

    let (Some(table), true) = (table, errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };

    let open = Bills::find()
        .filter(BillCol::TableId.eq(table.id))
        .filter(BillCol::State.eq(BillState::Current))
        .count(&txn)
        .await?;
    if open > 0 {
        return Err(AppError::Conflict(format!(
            "table '{}' already has an open bill",
            table.code
        )));
    }

    let next_status = table.status.occupy().map_err(|err| {
        AppError::Validation(FieldErrors::single("table_code", err.to_string()))
    })?;

    let code = unique_code(&txn).await?;
    let bill = BillActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        table_id: Set(Some(table.id)),
        waiter_id: Set(Some(waiter_id)),
        state: Set(BillState::Current),
        total: Set(0),
        total_paid: Set(0),
        tip_amount: Set(0),
        tip_basis_points: Set(0),
        opened_at: Set(now()),
        closed_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut table: TableActive = table.into();
    table.status = Set(next_status);
    table.update(&txn).await?;

    let bill = load_bill(&txn, bill).await?;
    txn.commit().await?;

    tracing::info!(code = %bill.code, table = ?bill.table_code, "bill opened");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "bill_open",
        "bills",
        serde_json::json!({ "bill_id": bill.id, "code": bill.code }),
    )
    .await;

    Ok(ApiResponse::success("Bill opened", bill, Some(Meta::empty())))
}

pub async fn add_plate(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    payload: AddPlateRequest,
) -> AppResult<ApiResponse<Bill>> {
    ensure_waiter(user)?;

    let txn = state.orm.begin().await?;
    let mut errors = FieldErrors::new();

    let bill = Bills::find_by_id(bill_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let bill = match bill {
        None => {
            errors.add("bill", "bill does not exist");
            None
        }
        Some(bill) if !owns(user, &bill) => {
            errors.add("bill", "bill belongs to another waiter");
            None
        }
        Some(bill) => match bill.state.modify() {
            Ok(_) => Some(bill),
            Err(err) => {
                errors.add("bill", err.to_string());
                None
            }
        },
    };

    let plate = match payload.plate_id {
        None => {
            errors.add("plate", "plate_id is required");
            None
        }
        Some(plate_id) => {
            let plate = Plates::find_by_id(plate_id).one(&txn).await?;
            if plate.is_none() {
                errors.add("plate", "plate does not exist");
            }
            plate
        }
    };

    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        errors.add("quantity", "quantity must be at least 1");
    }
    let notes = payload.notes.as_deref().map(str::trim).unwrap_or_default();
    validate_notes(&mut errors, "notes", Some(notes), MAX_BILL_PLATE_NOTES);

    let (Some(bill), Some(plate), true) = (bill, plate, errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };
    if money::line_total(plate.price, quantity)
        .and_then(|line| bill.total.checked_add(line))
        .is_none_or(|total| total > money::MAX_CENTS)
    {
        return Err(FieldErrors::single("quantity", "quantity is out of range").into());
    }

    BillPlateActive {
        id: Set(Uuid::new_v4()),
        bill_id: Set(bill.id),
        plate_id: Set(plate.id),
        quantity: Set(quantity),
        unit_price: Set(plate.price),
        notes: Set(notes.to_string()),
        cooked: Set(false),
        cooked_at: Set(None),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;

    let bill = recompute_total(&txn, bill).await?;
    let bill = load_bill(&txn, bill).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "bill_add_plate",
        "bills",
        serde_json::json!({ "bill_id": bill.id, "plate_id": plate.id, "quantity": quantity }),
    )
    .await;

    Ok(ApiResponse::success("Plate added", bill, Some(Meta::empty())))
}

pub async fn remove_plate(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    bill_plate_id: Uuid,
) -> AppResult<ApiResponse<Bill>> {
    ensure_waiter(user)?;

    let txn = state.orm.begin().await?;
    let bill = Bills::find_by_id(bill_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if !owns(user, &bill) {
        return Err(AppError::Forbidden("bill belongs to another waiter".into()));
    }
    if let Err(err) = bill.state.modify() {
        return Err(FieldErrors::single("bill", err.to_string()).into());
    }

    let line = BillPlates::find_by_id(bill_plate_id)
        .filter(BillPlateCol::BillId.eq(bill.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    line.delete(&txn).await?;

    let bill = recompute_total(&txn, bill).await?;
    let bill = load_bill(&txn, bill).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "bill_remove_plate",
        "bills",
        serde_json::json!({ "bill_id": bill.id, "bill_plate_id": bill_plate_id }),
    )
    .await;

    Ok(ApiResponse::success("Plate removed", bill, Some(Meta::empty())))
}

/// Closes a bill once the payment covers the total plus tip, and frees its table.
pub async fn finalize_bill(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
    payload: FinalizeBillRequest,
) -> AppResult<ApiResponse<Bill>> {
    ensure_waiter(user)?;

    let txn = state.orm.begin().await?;
    let mut errors = FieldErrors::new();

    let bill = Bills::find_by_id(bill_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let (bill, next_state) = match bill {
        None => {
            errors.add("bill", "bill does not exist");
            (None, None)
        }
        Some(bill) if !owns(user, &bill) => {
            errors.add("bill", "bill belongs to another waiter");
            (None, None)
        }
        Some(bill) => match bill.state.close() {
            Ok(next) => (Some(bill), Some(next)),
            Err(err) => {
                errors.add("bill", err.to_string());
                (None, None)
            }
        },
    };

    let paid = match payload.amount_paid {
        None => {
            errors.add("amount_paid", "amount_paid is required");
            None
        }
        Some(amount) if amount < Decimal::ZERO => {
            errors.add("amount_paid", "amount_paid cannot be negative");
            None
        }
        Some(amount) => match money::to_cents(amount) {
            Ok(cents) => Some(cents),
            Err(err) => {
                errors.add("amount_paid", format!("amount_paid {err}"));
                None
            }
        },
    };

    let tip_percentage = payload.tip_percentage.unwrap_or(Decimal::ZERO);
    let tip_basis_points = if tip_percentage < Decimal::ZERO
        || tip_percentage > Decimal::ONE_HUNDRED
    {
        errors.add("tip_percentage", "tip_percentage must be between 0 and 100");
        None
    } else {
        match money::to_basis_points(tip_percentage) {
            Ok(basis_points) => Some(basis_points),
            Err(err) => {
                errors.add("tip_percentage", format!("tip_percentage {err}"));
                None
            }
        }
    };

    let (Some(bill), Some(next_state), Some(paid), Some(tip_basis_points), true) =
        (bill, next_state, paid, tip_basis_points, errors.is_empty())
    else {
        return Err(AppError::Validation(errors));
    };

    let settlement = money::settle(bill.total, tip_percentage, paid).map_err(|owed| {
        FieldErrors::single(
            "amount_sufficient",
            format!("Amount paid must be at least ${}", money::from_cents(owed)),
        )
    })?;

    if let Some(table_id) = bill.table_id {
        if let Some(table) = Tables::find_by_id(table_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
        {
            let released = table.status.release();
            let mut table: TableActive = table.into();
            table.status = Set(released);
            table.update(&txn).await?;
        }
    }

    let mut active: BillActive = bill.into();
    active.state = Set(next_state);
    active.total_paid = Set(paid);
    active.tip_amount = Set(settlement.tip_amount);
    active.tip_basis_points = Set(tip_basis_points);
    active.closed_at = Set(Some(now()));
    let bill = active.update(&txn).await?;
    let bill = load_bill(&txn, bill).await?;
    txn.commit().await?;

    tracing::info!(
        code = %bill.code,
        total_with_tip = %bill.total_with_tip,
        change = %money::from_cents(settlement.change),
        "bill finalized"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "bill_finalize",
        "bills",
        serde_json::json!({
            "bill_id": bill.id,
            "total_paid": bill.total_paid,
            "tip_amount": bill.tip_amount,
        }),
    )
    .await;

    Ok(ApiResponse::success("Bill finalized", bill, Some(Meta::empty())))
}

/// Voids an unpaid bill and frees its table. Lines stay on the bill for the
/// record but leave the kitchen queue.
pub async fn cancel_bill(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
) -> AppResult<ApiResponse<Bill>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let bill = Bills::find_by_id(bill_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let next_state = bill
        .state
        .cancel()
        .map_err(|e| AppError::Forbidden(e.to_string()))?;

    if let Some(table_id) = bill.table_id {
        if let Some(table) = Tables::find_by_id(table_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
        {
            let released = table.status.release();
            let mut table: TableActive = table.into();
            table.status = Set(released);
            table.update(&txn).await?;
        }
    }

    let mut active: BillActive = bill.into();
    active.state = Set(next_state);
    active.closed_at = Set(Some(now()));
    let bill = active.update(&txn).await?;
    let bill = load_bill(&txn, bill).await?;
    txn.commit().await?;

    tracing::info!(code = %bill.code, "bill cancelled");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "bill_cancel",
        "bills",
        serde_json::json!({ "bill_id": bill.id, "code": bill.code }),
    )
    .await;

    Ok(ApiResponse::success("Bill cancelled", bill, Some(Meta::empty())))
}

/// Waiters see their own bills; admins see every bill.
pub async fn list_bills(
    state: &AppState,
    user: &AuthUser,
    query: BillListQuery,
) -> AppResult<ApiResponse<Listing<Bill>>> {
    ensure_waiter(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if !user.is_admin {
        condition = condition.add(BillCol::WaiterId.eq(user.user_id));
    }
    if let Some(bill_state) = query.state {
        condition = condition.add(BillCol::State.eq(bill_state));
    }

    let finder = Bills::find()
        .filter(condition)
        .order_by_desc(BillCol::OpenedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = hydrate(&state.orm, models).await?;
    Ok(ApiResponse::page("Bills", items, Meta::new(page, limit, total)))
}

pub async fn get_bill(
    state: &AppState,
    user: &AuthUser,
    bill_id: Uuid,
) -> AppResult<ApiResponse<Bill>> {
    ensure_waiter(user)?;
    let bill = Bills::find_by_id(bill_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !owns(user, &bill) {
        return Err(AppError::Forbidden("bill belongs to another waiter".into()));
    }
    Ok(ApiResponse::ok(load_bill(&state.orm, bill).await?))
}

fn owns(user: &AuthUser, bill: &BillModel) -> bool {
    user.is_admin || bill.waiter_id == Some(user.user_id)
}

/// Rewrites `total` as the sum of the bill's current lines.
async fn recompute_total<C: ConnectionTrait>(conn: &C, bill: BillModel) -> AppResult<BillModel> {
    let total = BillPlates::find()
        .filter(BillPlateCol::BillId.eq(bill.id))
        .all(conn)
        .await?
        .iter()
        .try_fold(0i64, |sum, line| {
            money::line_total(line.unit_price, line.quantity)
                .and_then(|line_total| sum.checked_add(line_total))
        })
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("bill {} total overflowed", bill.id)))?;

    if total == bill.total {
        return Ok(bill);
    }
    let mut active: BillActive = bill.into();
    active.total = Set(total);
    Ok(active.update(conn).await?)
}

async fn unique_code<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = random_code(BILL_PREFIX);
        let taken = Bills::find()
            .filter(BillCol::Code.eq(code.as_str()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not generate a unique bill code"
    )))
}

pub(crate) async fn load_bill<C: ConnectionTrait>(conn: &C, model: BillModel) -> AppResult<Bill> {
    let mut bills = hydrate(conn, vec![model]).await?;
    bills.pop().ok_or(AppError::NotFound)
}

async fn hydrate<C: ConnectionTrait>(conn: &C, models: Vec<BillModel>) -> AppResult<Vec<Bill>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let bill_ids: Vec<Uuid> = models.iter().map(|b| b.id).collect();
    let table_ids: Vec<Uuid> = models.iter().filter_map(|b| b.table_id).collect();

    let tables: HashMap<Uuid, String> = if table_ids.is_empty() {
        HashMap::new()
    } else {
        Tables::find()
            .filter(TableCol::Id.is_in(table_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|t| (t.id, t.code))
            .collect()
    };

    let lines = BillPlates::find()
        .filter(BillPlateCol::BillId.is_in(bill_ids))
        .order_by_asc(BillPlateCol::CreatedAt)
        .all(conn)
        .await?;
    let plate_ids: Vec<Uuid> = lines.iter().map(|l| l.plate_id).collect();
    let plate_names: HashMap<Uuid, String> = if plate_ids.is_empty() {
        HashMap::new()
    } else {
        Plates::find()
            .filter(PlateCol::Id.is_in(plate_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect()
    };

    let mut lines_by_bill: HashMap<Uuid, Vec<BillPlate>> = HashMap::new();
    for line in lines {
        let name = plate_names.get(&line.plate_id).cloned().unwrap_or_default();
        lines_by_bill
            .entry(line.bill_id)
            .or_default()
            .push(bill_plate_from_entity(line, name));
    }

    Ok(models
        .into_iter()
        .map(|b| {
            let table_code = b.table_id.and_then(|id| tables.get(&id).cloned());
            let plates = lines_by_bill.remove(&b.id).unwrap_or_default();
            bill_from_entity(b, table_code, plates)
        })
        .collect())
}

fn bill_from_entity(model: BillModel, table_code: Option<String>, plates: Vec<BillPlate>) -> Bill {
    let total_with_tip = model.total + model.tip_amount;
    let change = match model.state {
        BillState::Closed => Some(money::from_cents(model.total_paid - total_with_tip)),
        BillState::Current | BillState::Cancelled => None,
    };
    Bill {
        id: model.id,
        code: model.code,
        table_code,
        waiter_id: model.waiter_id,
        state: model.state,
        total: money::from_cents(model.total),
        total_paid: money::from_cents(model.total_paid),
        tip_percentage: money::from_basis_points(model.tip_basis_points),
        tip_amount: money::from_cents(model.tip_amount),
        total_with_tip: money::from_cents(total_with_tip),
        change,
        opened_at: model.opened_at.with_timezone(&chrono::Utc),
        closed_at: model.closed_at.map(|at| at.with_timezone(&chrono::Utc)),
        plates,
    }
}

fn bill_plate_from_entity(model: BillPlateModel, plate_name: String) -> BillPlate {
    BillPlate {
        id: model.id,
        plate_id: model.plate_id,
        plate_name,
        quantity: model.quantity,
        unit_price: money::from_cents(model.unit_price),
        line_total: money::from_cents(model.unit_price.saturating_mul(i64::from(model.quantity))),
        notes: model.notes,
        cooked: model.cooked,
        cooked_at: model.cooked_at.map(|at| at.with_timezone(&chrono::Utc)),
    }
}
