use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderValue, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_admin: bool,
    pub is_waiter: bool,
    pub is_kitchen: bool,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
        Ok(Self {
            user_id,
            is_admin: claims.is_admin,
            is_waiter: claims.is_waiter,
            is_kitchen: claims.is_kitchen,
        })
    }

    pub fn is_staff(&self) -> bool {
        self.is_admin || self.is_waiter || self.is_kitchen
    }
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden("admin role required".into()));
    }
    Ok(())
}

pub fn ensure_waiter(user: &AuthUser) -> Result<(), AppError> {
    if !(user.is_waiter || user.is_admin) {
        return Err(AppError::Forbidden("waiter role required".into()));
    }
    Ok(())
}

pub fn ensure_kitchen(user: &AuthUser) -> Result<(), AppError> {
    if !(user.is_kitchen || user.is_admin) {
        return Err(AppError::Forbidden("kitchen role required".into()));
    }
    Ok(())
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden("staff role required".into()));
    }
    Ok(())
}

fn decode_bearer(value: &HeaderValue, state: &AppState) -> Result<AuthUser, AppError> {
    let auth_str = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    AuthUser::from_claims(&decoded.claims)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        decode_bearer(auth_header, state)
    }
}

/// Public routes that personalize their answer take `Option<AuthUser>`: no header
/// means anonymous, but a bad token is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|value| decode_bearer(value, state))
            .transpose()
    }
}
