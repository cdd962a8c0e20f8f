use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered account. The password hash never leaves the store layer;
/// API responses use `UserResponse` in the handlers instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Session token claims. Profile fields are cached at issuance time and
/// only replaced when a fresh token is minted (login or profile update).
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // Login email
    pub name: String,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}
