use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    codes::{MAX_CODE_ATTEMPTS, RESERVATION_PREFIX, random_code},
    db::{db_time, now},
    dto::reservations::{
        CancelReservationRequest, CreateReservationRequest, EditReservationRequest, IdentityProof,
        ReservationListQuery, ReservationLookup,
    },
    entity::{
        TableAreas, Tables, Users,
        reservations::{
            ActiveModel as ReservationActive, Column as ResCol, Entity as Reservations,
            Model as ReservationModel,
        },
        table_areas::{Column as AreaCol, Model as AreaModel},
        tables::{ActiveModel as TableActive, Column as TableCol},
    },
    error::{AppError, AppResult},
    lifecycle::{ReservationState, TableStatus},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::Reservation,
    response::{ApiResponse, Listing, Meta},
    routes::params::SortOrder,
    state::AppState,
    validation::{
        FieldErrors, MAX_NAME_LEN, MAX_RESERVATION_NOTES, is_valid_email, non_blank,
        parse_future_date_time, validate_notes, validate_party_size,
    },
};

pub async fn create_reservation(
    state: &AppState,
    payload: CreateReservationRequest,
) -> AppResult<ApiResponse<Reservation>> {
    let ReservationFields {
        name,
        email,
        phone_number,
        date_time,
        area,
        amount_people,
        notes,
    } = validate_reservation(&state.orm, payload).await?;

    let txn = state.orm.begin().await?;
    let code = unique_code(&txn).await?;
    let created_at = now();
    let reservation = ReservationActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        name: Set(name),
        email: Set(email),
        phone_number: Set(phone_number),
        date_time: Set(db_time(&date_time)),
        table_area_id: Set(area.as_ref().map(|a| a.id)),
        table_id: Set(None),
        amount_people: Set(amount_people),
        notes: Set(notes),
        state: Set(ReservationState::Active),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(code = %reservation.code, "reservation created");
    audit::record(
        &state.orm,
        None,
        "reservation_create",
        "reservations",
        serde_json::json!({ "reservation_id": reservation.id, "code": reservation.code }),
    )
    .await;

    let reservation = reservation_from_entity(reservation, area.map(|a| a.label), None);
    state.notifier.reservation_created(&reservation);

    Ok(ApiResponse::success(
        "Reservation created",
        reservation,
        Some(Meta::empty()),
    ))
}

/// Any state; codes are matched case-insensitively.
pub async fn search_by_code(state: &AppState, code: &str) -> AppResult<Reservation> {
    let model = Reservations::find()
        .filter(ResCol::Code.eq(normalize_code(code)))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    hydrate_one(&state.orm, model).await
}

/// Newest first. Email wins when both contact fields are supplied.
pub async fn search_by_contact(
    state: &AppState,
    email: Option<&str>,
    phone_number: Option<&str>,
) -> AppResult<Vec<Reservation>> {
    let condition = match (non_blank(email), non_blank(phone_number)) {
        (Some(email), _) => ResCol::Email.eq(normalize_email(email)),
        (None, Some(phone)) => ResCol::PhoneNumber.eq(phone),
        (None, None) => {
            return Err(FieldErrors::single(
                "contact",
                "Either email or phone_number is required",
            )
            .into());
        }
    };

    let models = Reservations::find()
        .filter(condition)
        .order_by_desc(ResCol::DateTime)
        .all(&state.orm)
        .await?;
    hydrate(&state.orm, models).await
}

pub async fn lookup(
    state: &AppState,
    query: ReservationLookup,
) -> AppResult<ApiResponse<Listing<Reservation>>> {
    let items = match non_blank(query.code.as_deref()) {
        Some(code) => vec![search_by_code(state, code).await?],
        None => {
            if non_blank(query.email.as_deref()).is_none()
                && non_blank(query.phone_number.as_deref()).is_none()
            {
                return Err(FieldErrors::single(
                    "lookup",
                    "Either code, email, or phone_number is required",
                )
                .into());
            }
            let items =
                search_by_contact(state, query.email.as_deref(), query.phone_number.as_deref())
                    .await?;
            if items.is_empty() {
                return Err(AppError::NotFound);
            }
            items
        }
    };

    Ok(ApiResponse::listing("OK", items))
}

pub async fn edit_reservation(
    state: &AppState,
    payload: EditReservationRequest,
) -> AppResult<ApiResponse<Reservation>> {
    let txn = state.orm.begin().await?;

    let existing = Reservations::find()
        .filter(ResCol::Code.eq(normalize_code(&payload.code)))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    verify_identity(&existing, &payload.identity)?;
    let next_state = existing
        .state
        .edit()
        .map_err(|e| AppError::Forbidden(e.to_string()))?;
    if existing.date_time.with_timezone(&Utc) <= Utc::now() {
        return Err(AppError::Forbidden(
            "reservation has already taken place".into(),
        ));
    }

    let mut errors = FieldErrors::new();
    let date_time = parse_future_date_time(&mut errors, payload.date_time.as_deref(), Utc::now());
    let amount_people = validate_party_size(&mut errors, payload.amount_people);
    let area = resolve_area(&txn, &mut errors, payload.table_area.as_deref()).await?;
    let notes = non_blank(payload.notes.as_deref()).map(str::to_string);
    validate_notes(&mut errors, "notes", notes.as_deref(), MAX_RESERVATION_NOTES);

    let (Some(date_time), true) = (date_time, errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };

    let table_id = existing.table_id;
    let mut active: ReservationActive = existing.into();
    active.date_time = Set(db_time(&date_time));
    active.table_area_id = Set(area.as_ref().map(|a| a.id));
    active.amount_people = Set(amount_people);
    active.notes = Set(notes);
    active.state = Set(next_state);
    active.updated_at = Set(now());
    let updated = active.update(&txn).await?;

    let table_code = table_code_of(&txn, table_id).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        None,
        "reservation_edit",
        "reservations",
        serde_json::json!({ "reservation_id": updated.id, "code": updated.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Reservation updated",
        reservation_from_entity(updated, area.map(|a| a.label), table_code),
        Some(Meta::empty()),
    ))
}

/// Terminal. A second cancellation is refused and changes nothing.
pub async fn cancel_reservation(
    state: &AppState,
    payload: CancelReservationRequest,
) -> AppResult<ApiResponse<Reservation>> {
    let txn = state.orm.begin().await?;

    let existing = Reservations::find()
        .filter(ResCol::Code.eq(normalize_code(&payload.code)))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    verify_identity(&existing, &payload.identity)?;
    let next_state = existing
        .state
        .cancel()
        .map_err(|e| AppError::Forbidden(e.to_string()))?;

    release_held_table(&txn, existing.table_id).await?;

    let mut active: ReservationActive = existing.into();
    active.state = Set(next_state);
    active.updated_at = Set(now());
    let updated = active.update(&txn).await?;
    let reservation = hydrate_one(&txn, updated).await?;
    txn.commit().await?;

    tracing::info!(code = %reservation.code, "reservation cancelled");
    audit::record(
        &state.orm,
        None,
        "reservation_cancel",
        "reservations",
        serde_json::json!({ "reservation_id": reservation.id, "code": reservation.code }),
    )
    .await;
    state.notifier.reservation_cancelled(&reservation);

    Ok(ApiResponse::success(
        "Reservation cancelled",
        reservation,
        Some(Meta::empty()),
    ))
}

/// Active reservations for the restaurant's current local day, earliest first.
pub async fn list_today(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Listing<Reservation>>> {
    ensure_staff(user)?;

    let offset = state.config.restaurant_offset;
    let today = Utc::now().with_timezone(&offset).date_naive();
    let start = today
        .and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("ambiguous local midnight")))?;
    let end = start + Duration::days(1);

    let models = Reservations::find()
        .filter(
            Condition::all()
                .add(ResCol::State.eq(ReservationState::Active))
                .add(ResCol::DateTime.gte(db_time(&start)))
                .add(ResCol::DateTime.lt(db_time(&end))),
        )
        .order_by_asc(ResCol::DateTime)
        .all(&state.orm)
        .await?;

    let items = hydrate(&state.orm, models).await?;
    Ok(ApiResponse::listing("Today's reservations", items))
}

pub async fn list_all(
    state: &AppState,
    user: &AuthUser,
    query: ReservationListQuery,
) -> AppResult<ApiResponse<Listing<Reservation>>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(reservation_state) = query.state {
        condition = condition.add(ResCol::State.eq(reservation_state));
    }

    let mut finder = Reservations::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(ResCol::DateTime),
        SortOrder::Desc => finder.order_by_desc(ResCol::DateTime),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = hydrate(&state.orm, models).await?;
    Ok(ApiResponse::page(
        "Reservations",
        items,
        Meta::new(page, limit, total),
    ))
}

/// Reservations booked under the signed-in user's email, newest date first.
pub async fn list_mine(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Listing<Reservation>>> {
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    let models = Reservations::find()
        .filter(ResCol::Email.eq(normalize_email(&account.email)))
        .order_by_desc(ResCol::DateTime)
        .all(&state.orm)
        .await?;
    let items = hydrate(&state.orm, models).await?;
    Ok(ApiResponse::listing("Your reservations", items))
}

/// Staff-side replacement of every field, contact details included. No identity
/// proof is needed and past reservations may be rescheduled.
pub async fn admin_edit_reservation(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CreateReservationRequest,
) -> AppResult<ApiResponse<Reservation>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Reservations::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let next_state = existing
        .state
        .edit()
        .map_err(|e| AppError::Forbidden(e.to_string()))?;

    let fields = validate_reservation(&txn, payload).await?;

    let mut active: ReservationActive = existing.into();
    active.name = Set(fields.name);
    active.email = Set(fields.email);
    active.phone_number = Set(fields.phone_number);
    active.date_time = Set(db_time(&fields.date_time));
    active.table_area_id = Set(fields.area.as_ref().map(|a| a.id));
    active.amount_people = Set(fields.amount_people);
    active.notes = Set(fields.notes);
    active.state = Set(next_state);
    active.updated_at = Set(now());
    let updated = active.update(&txn).await?;
    let reservation = hydrate_one(&txn, updated).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "reservation_admin_edit",
        "reservations",
        serde_json::json!({ "reservation_id": reservation.id, "code": reservation.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Reservation updated",
        reservation,
        Some(Meta::empty()),
    ))
}

/// Removes the reservation outright and frees a table still held for it.
pub async fn delete_reservation(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Reservations::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    release_held_table(&txn, existing.table_id).await?;
    let code = existing.code.clone();
    existing.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(code = %code, "reservation deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "reservation_delete",
        "reservations",
        serde_json::json!({ "reservation_id": id, "code": code }),
    )
    .await;

    Ok(ApiResponse::success("Reservation deleted", (), Some(Meta::empty())))
}

/// A table that is only reserved goes back to the floor; an occupied one stays.
async fn release_held_table<C: ConnectionTrait>(conn: &C, table_id: Option<Uuid>) -> AppResult<()> {
    let Some(table_id) = table_id else {
        return Ok(());
    };
    let table = Tables::find_by_id(table_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    if let Some(table) = table.filter(|t| t.status == TableStatus::Reserved) {
        let released = table.status.release();
        let mut table: TableActive = table.into();
        table.status = Set(released);
        table.update(conn).await?;
    }
    Ok(())
}

/// Every field a reservation carries, after validation.
struct ReservationFields {
    name: String,
    email: String,
    phone_number: Option<String>,
    date_time: DateTime<FixedOffset>,
    area: Option<AreaModel>,
    amount_people: i32,
    notes: Option<String>,
}

async fn validate_reservation<C: ConnectionTrait>(
    conn: &C,
    payload: CreateReservationRequest,
) -> AppResult<ReservationFields> {
    let mut errors = FieldErrors::new();

    let name = non_blank(payload.name.as_deref()).map(str::to_string);
    match &name {
        None => errors.add("name", "name is required"),
        Some(n) if n.chars().count() > MAX_NAME_LEN => {
            errors.add("name", format!("name must be at most {MAX_NAME_LEN} characters"))
        }
        Some(_) => {}
    }

    let email = non_blank(payload.email.as_deref()).map(normalize_email);
    match &email {
        None => errors.add("email", "email is required"),
        Some(e) if !is_valid_email(e) => errors.add("email", "email is malformed"),
        Some(_) => {}
    }

    let phone_number = non_blank(payload.phone_number.as_deref()).map(str::to_string);
    let date_time = parse_future_date_time(&mut errors, payload.date_time.as_deref(), Utc::now());
    let amount_people = validate_party_size(&mut errors, payload.amount_people);
    let area = resolve_area(conn, &mut errors, payload.table_area.as_deref()).await?;
    let notes = non_blank(payload.notes.as_deref()).map(str::to_string);
    validate_notes(&mut errors, "notes", notes.as_deref(), MAX_RESERVATION_NOTES);

    let (Some(name), Some(email), Some(date_time), true) =
        (name, email, date_time, errors.is_empty())
    else {
        return Err(AppError::Validation(errors));
    };

    Ok(ReservationFields {
        name,
        email,
        phone_number,
        date_time,
        area,
        amount_people,
        notes,
    })
}

/// Email is checked first; the phone number only when no email was offered.
fn verify_identity(reservation: &ReservationModel, proof: &IdentityProof) -> AppResult<()> {
    let matches = match (
        non_blank(proof.email.as_deref()),
        non_blank(proof.phone_number.as_deref()),
    ) {
        (Some(email), _) => normalize_email(email) == reservation.email,
        (None, Some(phone)) => reservation.phone_number.as_deref().map(str::trim) == Some(phone),
        (None, None) => {
            return Err(FieldErrors::single(
                "identity",
                "email or phone_number is required to change a reservation",
            )
            .into());
        }
    };

    if matches {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "contact details do not match the reservation".into(),
        ))
    }
}

async fn resolve_area<C: ConnectionTrait>(
    conn: &C,
    errors: &mut FieldErrors,
    label: Option<&str>,
) -> AppResult<Option<AreaModel>> {
    let Some(label) = non_blank(label) else {
        return Ok(None);
    };
    let area = TableAreas::find()
        .filter(AreaCol::Label.eq(label))
        .one(conn)
        .await?;
    if area.is_none() {
        errors.add("table_area", format!("table area '{label}' does not exist"));
    }
    Ok(area)
}

async fn unique_code<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = random_code(RESERVATION_PREFIX);
        let taken = Reservations::find()
            .filter(ResCol::Code.eq(code.as_str()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not generate a unique reservation code"
    )))
}

async fn table_code_of<C: ConnectionTrait>(
    conn: &C,
    table_id: Option<Uuid>,
) -> AppResult<Option<String>> {
    let Some(table_id) = table_id else {
        return Ok(None);
    };
    Ok(Tables::find_by_id(table_id).one(conn).await?.map(|t| t.code))
}

pub(crate) async fn hydrate_one<C: ConnectionTrait>(
    conn: &C,
    model: ReservationModel,
) -> AppResult<Reservation> {
    let mut items = hydrate(conn, vec![model]).await?;
    items.pop().ok_or(AppError::NotFound)
}

/// Resolves area labels and table codes for a batch of reservations.
pub(crate) async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    models: Vec<ReservationModel>,
) -> AppResult<Vec<Reservation>> {
    let area_ids: Vec<Uuid> = models.iter().filter_map(|m| m.table_area_id).collect();
    let table_ids: Vec<Uuid> = models.iter().filter_map(|m| m.table_id).collect();

    let areas: HashMap<Uuid, String> = if area_ids.is_empty() {
        HashMap::new()
    } else {
        TableAreas::find()
            .filter(AreaCol::Id.is_in(area_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a.label))
            .collect()
    };
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

    Ok(models
        .into_iter()
        .map(|m| {
            let area = m.table_area_id.and_then(|id| areas.get(&id).cloned());
            let table = m.table_id.and_then(|id| tables.get(&id).cloned());
            reservation_from_entity(m, area, table)
        })
        .collect())
}

fn reservation_from_entity(
    model: ReservationModel,
    table_area: Option<String>,
    table_code: Option<String>,
) -> Reservation {
    Reservation {
        id: model.id,
        code: model.code,
        name: model.name,
        email: model.email,
        phone_number: model.phone_number,
        date_time: model.date_time.with_timezone(&Utc),
        table_area,
        table_code,
        amount_people: model.amount_people,
        notes: model.notes,
        state: model.state,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
