use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::now,
    dto::{
        reservations::AssignTableRequest,
        tables::{AreaRequest, TableRequest},
    },
    entity::{
        Bills, Reservations, TableAreas, Tables,
        bills::Column as BillCol,
        reservations::{ActiveModel as ReservationActive, Column as ResCol},
        table_areas::{ActiveModel as AreaActive, Column as AreaCol, Model as AreaModel},
        tables::{ActiveModel as TableActive, Column as TableCol, Model as TableModel},
    },
    error::{AppError, AppResult},
    lifecycle::{BillState, TableStatus},
    middleware::auth::{AuthUser, ensure_admin, ensure_waiter},
    models::{Reservation, Table, TableArea},
    response::{ApiResponse, Listing, Meta},
    services::reservation_service,
    state::AppState,
    validation::{FieldErrors, non_blank},
};

/// Seats an active reservation at an available table, holding it as reserved.
pub async fn assign_table_to_reservation(
    state: &AppState,
    user: &AuthUser,
    reservation_id: Uuid,
    payload: AssignTableRequest,
) -> AppResult<ApiResponse<Reservation>> {
    ensure_waiter(user)?;

    let Some(table_code) = non_blank(payload.table_code.as_deref()).map(str::to_uppercase) else {
        return Err(FieldErrors::single("table_code", "table_code is required").into());
    };

    let txn = state.orm.begin().await?;

    let reservation = Reservations::find_by_id(reservation_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let table = Tables::find()
        .filter(TableCol::Code.eq(table_code.as_str()))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let mut errors = FieldErrors::new();
    let next_state = match &reservation {
        None => {
            errors.add("reservation", "reservation does not exist");
            None
        }
        Some(r) => match r.state.assign_table() {
            Ok(next) => Some(next),
            Err(err) => {
                errors.add("reservation", err.to_string());
                None
            }
        },
    };
    let held_table = reservation.as_ref().and_then(|r| r.table_id);
    let next_status = match &table {
        None => {
            errors.add("table_code", format!("table '{table_code}' does not exist"));
            None
        }
        // Re-assigning the table the reservation already holds changes nothing.
        Some(t) if held_table == Some(t.id) && t.status == TableStatus::Reserved => {
            Some(TableStatus::Reserved)
        }
        Some(t) => match t.status.reserve() {
            Ok(next) => Some(next),
            Err(_) => {
                errors.add(
                    "table_code",
                    format!("table '{table_code}' is {}", t.status.as_str()),
                );
                None
            }
        },
    };

    let (Some(reservation), Some(table), Some(next_state), Some(next_status), true) = (
        reservation,
        table,
        next_state,
        next_status,
        errors.is_empty(),
    ) else {
        return Err(AppError::Validation(errors));
    };

    // A previously held table goes back to the floor.
    if let Some(previous) = reservation.table_id.filter(|id| *id != table.id) {
        if let Some(previous) = Tables::find_by_id(previous).one(&txn).await? {
            if previous.status == TableStatus::Reserved {
                let released = previous.status.release();
                let mut previous: TableActive = previous.into();
                previous.status = Set(released);
                previous.update(&txn).await?;
            }
        }
    }

    let table_id = table.id;
    let mut table: TableActive = table.into();
    table.status = Set(next_status);
    table.update(&txn).await?;

    let mut active: ReservationActive = reservation.into();
    active.table_id = Set(Some(table_id));
    active.state = Set(next_state);
    active.updated_at = Set(now());
    let updated = active.update(&txn).await?;
    let reservation = reservation_service::hydrate_one(&txn, updated).await?;
    txn.commit().await?;

    tracing::info!(code = %reservation.code, table = %table_code, "table assigned");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "reservation_assign_table",
        "reservations",
        serde_json::json!({ "reservation_id": reservation.id, "table_id": table_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Table assigned",
        reservation,
        Some(Meta::empty()),
    ))
}

pub async fn list_areas(state: &AppState) -> AppResult<ApiResponse<Listing<TableArea>>> {
    let items = TableAreas::find()
        .order_by_asc(AreaCol::Label)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(area_from_entity)
        .collect();
    Ok(ApiResponse::listing("Table areas", items))
}

pub async fn create_area(
    state: &AppState,
    user: &AuthUser,
    payload: AreaRequest,
) -> AppResult<ApiResponse<TableArea>> {
    ensure_admin(user)?;
    let label = unique_area_label(&state.orm, &payload.label, None).await?;

    let area = AreaActive {
        id: Set(Uuid::new_v4()),
        label: Set(label),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "table_area_create",
        "table_areas",
        serde_json::json!({ "area_id": area.id }),
    )
    .await;
    Ok(ApiResponse::success(
        "Table area created",
        area_from_entity(area),
        Some(Meta::empty()),
    ))
}

pub async fn update_area(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AreaRequest,
) -> AppResult<ApiResponse<TableArea>> {
    ensure_admin(user)?;
    let area = TableAreas::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let label = unique_area_label(&state.orm, &payload.label, Some(id)).await?;

    let mut active: AreaActive = area.into();
    active.label = Set(label);
    let area = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Table area updated",
        area_from_entity(area),
        Some(Meta::empty()),
    ))
}

/// Refused while any table or reservation still points at the area.
pub async fn delete_area(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let area = TableAreas::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let in_use = Tables::find()
        .filter(TableCol::AreaId.eq(id))
        .count(&state.orm)
        .await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "table area '{}' still has {in_use} table(s)",
            area.label
        )));
    }
    let requested = Reservations::find()
        .filter(ResCol::TableAreaId.eq(id))
        .count(&state.orm)
        .await?;
    if requested > 0 {
        return Err(AppError::Conflict(format!(
            "table area '{}' is requested by {requested} reservation(s)",
            area.label
        )));
    }

    area.delete(&state.orm).await?;
    audit::record(
        &state.orm,
        Some(user.user_id),
        "table_area_delete",
        "table_areas",
        serde_json::json!({ "area_id": id }),
    )
    .await;
    Ok(ApiResponse::success("Table area deleted", (), Some(Meta::empty())))
}

pub async fn list_tables(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Listing<Table>>> {
    ensure_waiter(user)?;
    let models = Tables::find()
        .order_by_asc(TableCol::Code)
        .all(&state.orm)
        .await?;
    let items = hydrate(&state.orm, models).await?;
    Ok(ApiResponse::listing("Tables", items))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    payload: TableRequest,
) -> AppResult<ApiResponse<Table>> {
    ensure_admin(user)?;
    let fields = validate_table(&state.orm, &payload, None).await?;

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        code: Set(fields.code),
        capacity: Set(fields.capacity),
        status: Set(payload.status.unwrap_or(TableStatus::Available)),
        area_id: Set(fields.area.as_ref().map(|a| a.id)),
        notes: Set(fields.notes),
        created_at: Set(now()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "table_create",
        "tables",
        serde_json::json!({ "table_id": table.id, "code": table.code }),
    )
    .await;
    Ok(ApiResponse::success(
        "Table created",
        table_from_entity(table, fields.area, None),
        Some(Meta::empty()),
    ))
}

pub async fn update_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: TableRequest,
) -> AppResult<ApiResponse<Table>> {
    ensure_admin(user)?;
    let table = Tables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let fields = validate_table(&state.orm, &payload, Some(id)).await?;

    let mut active: TableActive = table.into();
    active.code = Set(fields.code);
    active.capacity = Set(fields.capacity);
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.area_id = Set(fields.area.as_ref().map(|a| a.id));
    active.notes = Set(fields.notes);
    let table = active.update(&state.orm).await?;

    let bill_code = open_bill_code(&state.orm, table.id).await?;
    Ok(ApiResponse::success(
        "Table updated",
        table_from_entity(table, fields.area, bill_code),
        Some(Meta::empty()),
    ))
}

/// Tables with bill history or reservations stay; only unused tables can be removed.
pub async fn delete_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let table = Tables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let bills = Bills::find()
        .filter(BillCol::TableId.eq(id))
        .count(&state.orm)
        .await?;
    let reservations = Reservations::find()
        .filter(ResCol::TableId.eq(id))
        .count(&state.orm)
        .await?;
    if bills > 0 || reservations > 0 {
        return Err(AppError::Conflict(format!(
            "table '{}' is referenced by bills or reservations",
            table.code
        )));
    }

    table.delete(&state.orm).await?;
    audit::record(
        &state.orm,
        Some(user.user_id),
        "table_delete",
        "tables",
        serde_json::json!({ "table_id": id }),
    )
    .await;
    Ok(ApiResponse::success("Table deleted", (), Some(Meta::empty())))
}

struct TableFields {
    code: String,
    capacity: i32,
    area: Option<AreaModel>,
    notes: Option<String>,
}

async fn validate_table<C: ConnectionTrait>(
    conn: &C,
    payload: &TableRequest,
    existing_id: Option<Uuid>,
) -> AppResult<TableFields> {
    let mut errors = FieldErrors::new();

    let code = non_blank(payload.code.as_deref()).map(str::to_uppercase);
    match &code {
        None => errors.add("code", "code is required"),
        Some(code) => {
            let mut clash = Tables::find().filter(TableCol::Code.eq(code.as_str()));
            if let Some(id) = existing_id {
                clash = clash.filter(TableCol::Id.ne(id));
            }
            if clash.count(conn).await? > 0 {
                errors.add("code", format!("table '{code}' already exists"));
            }
        }
    }

    let capacity = match payload.capacity {
        Some(c) if c > 0 => c,
        _ => {
            errors.add("capacity", "capacity must be greater than 0");
            0
        }
    };

    let area = match non_blank(payload.area.as_deref()) {
        None => None,
        Some(label) => {
            let area = TableAreas::find()
                .filter(AreaCol::Label.eq(label))
                .one(conn)
                .await?;
            if area.is_none() {
                errors.add("area", format!("table area '{label}' does not exist"));
            }
            area
        }
    };

    let (Some(code), true) = (code, errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };
    Ok(TableFields {
        code,
        capacity,
        area,
        notes: non_blank(payload.notes.as_deref()).map(str::to_string),
    })
}

async fn unique_area_label<C: ConnectionTrait>(
    conn: &C,
    label: &str,
    existing_id: Option<Uuid>,
) -> AppResult<String> {
    let Some(label) = non_blank(Some(label)) else {
        return Err(FieldErrors::single("label", "label is required").into());
    };
    let mut clash = TableAreas::find().filter(AreaCol::Label.eq(label));
    if let Some(id) = existing_id {
        clash = clash.filter(AreaCol::Id.ne(id));
    }
    if clash.count(conn).await? > 0 {
        return Err(FieldErrors::single("label", format!("table area '{label}' already exists")).into());
    }
    Ok(label.to_string())
}

async fn open_bill_code<C: ConnectionTrait>(conn: &C, table_id: Uuid) -> AppResult<Option<String>> {
    Ok(Bills::find()
        .filter(BillCol::TableId.eq(table_id))
        .filter(BillCol::State.eq(BillState::Current))
        .one(conn)
        .await?
        .map(|b| b.code))
}

async fn hydrate<C: ConnectionTrait>(conn: &C, models: Vec<TableModel>) -> AppResult<Vec<Table>> {
    let areas: HashMap<Uuid, AreaModel> = TableAreas::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let open_bills: HashMap<Uuid, String> = Bills::find()
        .filter(BillCol::State.eq(BillState::Current))
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|b| b.table_id.map(|t| (t, b.code)))
        .collect();

    Ok(models
        .into_iter()
        .map(|t| {
            let area = t.area_id.and_then(|id| areas.get(&id).cloned());
            let bill = open_bills.get(&t.id).cloned();
            table_from_entity(t, area, bill)
        })
        .collect())
}

fn table_from_entity(
    model: TableModel,
    area: Option<AreaModel>,
    active_bill_code: Option<String>,
) -> Table {
    Table {
        id: model.id,
        code: model.code,
        capacity: model.capacity,
        status: model.status,
        area: area.map(area_from_entity),
        notes: model.notes,
        active_bill_code,
    }
}

pub(crate) fn area_from_entity(model: AreaModel) -> TableArea {
    TableArea {
        id: model.id,
        label: model.label,
    }
}
