use serde::{Deserialize, Serialize};

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub id: i64,     // users.id
    pub role: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}
