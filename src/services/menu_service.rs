use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    db::now,
    dto::menu::{CategoryRequest, PlateRequest},
    entity::{
        BillPlates, PlateCategories, Plates,
        bill_plates::Column as BillPlateCol,
        plate_categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Model as CategoryModel,
        },
        plates::{ActiveModel as PlateActive, Column as PlateCol, Model as PlateModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Plate, PlateCategory},
    money,
    response::{ApiResponse, Listing, Meta},
    state::AppState,
    validation::{FieldErrors, MAX_NAME_LEN, non_blank},
};

pub async fn list_plates(state: &AppState) -> AppResult<ApiResponse<Listing<Plate>>> {
    let categories = categories_by_id(&state.orm).await?;
    let items = Plates::find()
        .order_by_asc(PlateCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| {
            let category = p.category_id.and_then(|id| categories.get(&id).cloned());
            plate_from_entity(p, category)
        })
        .collect();
    Ok(ApiResponse::listing("Menu", items))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Listing<PlateCategory>>> {
    let items = PlateCategories::find()
        .order_by_asc(CategoryCol::Label)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(ApiResponse::listing("Plate categories", items))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<PlateCategory>> {
    ensure_admin(user)?;
    let label = unique_category_label(&state.orm, &payload.label, None).await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        label: Set(label),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "plate_category_create",
        "plate_categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;
    Ok(ApiResponse::success(
        "Plate category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn rename_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<PlateCategory>> {
    ensure_admin(user)?;
    let category = PlateCategories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let label = unique_category_label(&state.orm, &payload.label, Some(id)).await?;

    let mut active: CategoryActive = category.into();
    active.label = Set(label);
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "plate_category_rename",
        "plate_categories",
        serde_json::json!({ "category_id": category.id, "label": category.label }),
    )
    .await;
    Ok(ApiResponse::success(
        "Plate category updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Trimmed label, unique among categories other than `current`.
async fn unique_category_label<C: ConnectionTrait>(
    conn: &C,
    raw: &str,
    current: Option<Uuid>,
) -> AppResult<String> {
    let Some(label) = non_blank(Some(raw)) else {
        return Err(FieldErrors::single("label", "label is required").into());
    };
    let mut clash = PlateCategories::find().filter(CategoryCol::Label.eq(label));
    if let Some(id) = current {
        clash = clash.filter(CategoryCol::Id.ne(id));
    }
    if clash.count(conn).await? > 0 {
        return Err(FieldErrors::single("label", format!("category '{label}' already exists")).into());
    }
    Ok(label.to_string())
}

pub async fn create_plate(
    state: &AppState,
    user: &AuthUser,
    payload: PlateRequest,
) -> AppResult<ApiResponse<Plate>> {
    ensure_admin(user)?;
    let fields = validate_plate(&state.orm, payload, None).await?;

    let plate = PlateActive {
        id: Set(Uuid::new_v4()),
        name: Set(fields.name),
        description: Set(fields.description),
        price: Set(fields.price),
        category_id: Set(fields.category.as_ref().map(|c| c.id)),
        created_at: Set(now()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "plate_create",
        "plates",
        serde_json::json!({ "plate_id": plate.id, "price": plate.price }),
    )
    .await;
    Ok(ApiResponse::success(
        "Plate created",
        plate_from_entity(plate, fields.category.map(category_from_entity)),
        Some(Meta::empty()),
    ))
}

/// Price changes never touch lines already on a bill; those keep their snapshot.
pub async fn update_plate(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PlateRequest,
) -> AppResult<ApiResponse<Plate>> {
    ensure_admin(user)?;
    let existing = Plates::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let fields = validate_plate(&state.orm, payload, Some(id)).await?;

    let mut active: PlateActive = existing.into();
    active.name = Set(fields.name);
    active.description = Set(fields.description);
    active.price = Set(fields.price);
    active.category_id = Set(fields.category.as_ref().map(|c| c.id));
    let plate = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "plate_update",
        "plates",
        serde_json::json!({ "plate_id": plate.id, "price": plate.price }),
    )
    .await;
    Ok(ApiResponse::success(
        "Plate updated",
        plate_from_entity(plate, fields.category.map(category_from_entity)),
        Some(Meta::empty()),
    ))
}

pub async fn delete_plate(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    let plate = Plates::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let ordered = BillPlates::find()
        .filter(BillPlateCol::PlateId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(format!(
            "plate '{}' appears on {ordered} bill line(s)",
            plate.name
        )));
    }

    plate.delete(&state.orm).await?;
    audit::record(
        &state.orm,
        Some(user.user_id),
        "plate_delete",
        "plates",
        serde_json::json!({ "plate_id": id }),
    )
    .await;
    Ok(ApiResponse::success("Plate deleted", (), Some(Meta::empty())))
}

struct PlateFields {
    name: String,
    description: Option<String>,
    price: i64,
    category: Option<CategoryModel>,
}

async fn validate_plate<C: ConnectionTrait>(
    conn: &C,
    payload: PlateRequest,
    existing_id: Option<Uuid>,
) -> AppResult<PlateFields> {
    let mut errors = FieldErrors::new();

    let name = non_blank(payload.name.as_deref()).map(str::to_string);
    match &name {
        None => errors.add("name", "name is required"),
        Some(name) if name.chars().count() > MAX_NAME_LEN => {
            errors.add("name", format!("name must be at most {MAX_NAME_LEN} characters"))
        }
        Some(name) => {
            let mut clash = Plates::find().filter(PlateCol::Name.eq(name.as_str()));
            if let Some(id) = existing_id {
                clash = clash.filter(PlateCol::Id.ne(id));
            }
            if clash.count(conn).await? > 0 {
                errors.add("name", format!("plate '{name}' already exists"));
            }
        }
    }

    let price = match payload.price {
        None => {
            errors.add("price", "price is required");
            None
        }
        Some(price) if price <= rust_decimal::Decimal::ZERO => {
            errors.add("price", "price must be greater than 0");
            None
        }
        Some(price) => match money::to_cents(price) {
            Ok(cents) => Some(cents),
            Err(err) => {
                errors.add("price", format!("price {err}"));
                None
            }
        },
    };

    let category = match non_blank(payload.category.as_deref()) {
        None => None,
        Some(label) => {
            let category = PlateCategories::find()
                .filter(CategoryCol::Label.eq(label))
                .one(conn)
                .await?;
            if category.is_none() {
                errors.add("category", format!("category '{label}' does not exist"));
            }
            category
        }
    };

    let (Some(name), Some(price), true) = (name, price, errors.is_empty()) else {
        return Err(AppError::Validation(errors));
    };
    Ok(PlateFields {
        name,
        description: non_blank(payload.description.as_deref()).map(str::to_string),
        price,
        category,
    })
}

async fn categories_by_id<C: ConnectionTrait>(
    conn: &C,
) -> AppResult<HashMap<Uuid, PlateCategory>> {
    Ok(PlateCategories::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, category_from_entity(c)))
        .collect())
}

fn plate_from_entity(model: PlateModel, category: Option<PlateCategory>) -> Plate {
    Plate {
        id: model.id,
        name: model.name,
        description: model.description,
        price: money::from_cents(model.price),
        category,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> PlateCategory {
    PlateCategory {
        id: model.id,
        label: model.label,
    }
}
