use serde::Deserialize;
use validator::Validate;

use crate::users::repo_types::ProfileUpdate;

/// Body of `PUT /user/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct UserVerification {
    pub password: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Body of `PUT /user/{user_id}`. Every field is required.
#[derive(Debug, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 3, max = 100))]
    pub email: String,
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(length(min = 3, max = 100))]
    pub first_name: String,
    #[validate(length(min = 3, max = 100))]
    pub last_name: String,
    pub is_active: bool,
    #[validate(length(min = 3, max = 100))]
    pub role: String,
    #[validate(length(min = 3, max = 100))]
    pub phone_number: String,
}

impl From<UserRequest> for ProfileUpdate {
    fn from(r: UserRequest) -> Self {
        Self {
            email: r.email,
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            is_active: r.is_active,
            role: r.role,
            phone_number: r.phone_number,
        }
    }
}
