use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    db::now,
    dto::users::CreateUserRequest,
    entity::{
        Bills, Reviews, Users,
        bills::Column as BillCol,
        reviews::Column as ReviewCol,
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Listing, Meta},
    services::auth_service::hash_password,
    state::AppState,
    validation::{FieldErrors, MAX_NAME_LEN, MIN_PASSWORD_LEN, is_valid_email, non_blank},
};

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Listing<User>>> {
    ensure_admin(user)?;
    let items = Users::find()
        .order_by_asc(UserCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();
    Ok(ApiResponse::listing("Users", items))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let mut errors = FieldErrors::new();
    let (name, email) = validate_new_account(
        &state.orm,
        &mut errors,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
    )
    .await?;

    let (Some(name), Some(email), Some(password), true) =
        (name, email, payload.password, errors.is_empty())
    else {
        return Err(AppError::Validation(errors));
    };

    let roles = StaffRoles {
        is_admin: payload.is_admin,
        is_waiter: payload.is_waiter,
        is_kitchen: payload.is_kitchen,
    };
    let created = insert_user(&state.orm, name, email, &password, roles).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_create",
        "users",
        serde_json::json!({ "user_id": created.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StaffRoles {
    pub is_admin: bool,
    pub is_waiter: bool,
    pub is_kitchen: bool,
}

/// Checks name, email uniqueness and password length for a new account.
/// Returns the trimmed name and lowercased email when they are usable.
pub(crate) async fn validate_new_account<C: ConnectionTrait>(
    conn: &C,
    errors: &mut FieldErrors,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<(Option<String>, Option<String>)> {
    let name = non_blank(name).map(str::to_string);
    match &name {
        None => errors.add("name", "name is required"),
        Some(n) if n.chars().count() > MAX_NAME_LEN => {
            errors.add("name", format!("name must be at most {MAX_NAME_LEN} characters"))
        }
        Some(_) => {}
    }

    let email = non_blank(email).map(|e| e.to_lowercase());
    match &email {
        None => errors.add("email", "email is required"),
        Some(e) if !is_valid_email(e) => errors.add("email", "email is malformed"),
        Some(e) => {
            let taken = Users::find()
                .filter(UserCol::Email.eq(e.as_str()))
                .count(conn)
                .await?;
            if taken > 0 {
                errors.add("email", "Email is already taken");
            }
        }
    }

    if password.unwrap_or_default().chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }

    Ok((name, email))
}

pub(crate) async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    name: String,
    email: String,
    password: &str,
    roles: StaffRoles,
) -> AppResult<UserModel> {
    let created = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(password)?),
        is_admin: Set(roles.is_admin),
        is_waiter: Set(roles.is_waiter),
        is_kitchen: Set(roles.is_kitchen),
        created_at: Set(now()),
    }
    .insert(conn)
    .await?;
    Ok(created)
}

/// Admins cannot remove their own account, nor a waiter with bill history.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<()>> {
    ensure_admin(user)?;
    if id == user.user_id {
        return Err(AppError::Forbidden("you cannot delete your own account".into()));
    }

    let target = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let bills = Bills::find()
        .filter(BillCol::WaiterId.eq(id))
        .count(&state.orm)
        .await?;
    if bills > 0 {
        return Err(AppError::Conflict(format!(
            "user '{}' is the waiter on {bills} bill(s)",
            target.email
        )));
    }

    Reviews::delete_many()
        .filter(ReviewCol::UserId.eq(id))
        .exec(&state.orm)
        .await?;
    target.delete(&state.orm).await?;
    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success("User deleted", (), Some(Meta::empty())))
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        is_admin: model.is_admin,
        is_waiter: model.is_waiter,
        is_kitchen: model.is_kitchen,
        created_at: model.created_at.with_timezone(&chrono::Utc),
    }
}
