use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::roles::{RawRole, Role};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub contact_number: String,
    pub country: String,
    pub city: String,
    pub role: RawRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: String,
    pub user_id: i64,
    pub name: String,
    pub role: Role,
    pub session_token: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
    pub message: String,
}
