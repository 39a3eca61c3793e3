use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for user registration.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(length(min = 3, max = 100))]
    pub email: String,
    #[validate(length(min = 3, max = 100))]
    pub first_name: String,
    #[validate(length(min = 3, max = 100))]
    pub last_name: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 3, max = 100))]
    pub role: String,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
}

/// OAuth2 password-flow form for `/auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}
