use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

/// Self-service sign up. The account is created without any staff role.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub is_waiter: bool,
    pub is_kitchen: bool,
    pub exp: usize,
}
