use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 hash, not exposed in JSON
    pub is_active: bool,
    pub role: String,
    pub phone_number: Option<String>,
}

/// Row to insert; `id` comes from the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub role: String,
    pub phone_number: Option<String>,
}

/// Every mutable profile attribute. Id and password hash are deliberately absent.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub role: String,
    pub phone_number: String,
}
