use std::sync::Arc;

use axum::{
    body::{self, Body},
    extract::FromRef,
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, Header};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt; // for `oneshot`

use crate::{
    app::build_app,
    auth::{claims::Claims, jwt::JwtKeys, password::hash_password},
    config::JwtConfig,
    state::AppState,
    users::{memory::MemoryUserStore, repo_types::User},
};

pub fn seeded_user(id: i64, username: &str, password: &str) -> User {
    User {
        id,
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "First".into(),
        last_name: "Last".into(),
        hashed_password: hash_password(password).expect("hash seed password"),
        is_active: true,
        role: "user".into(),
        phone_number: None,
    }
}

pub fn app(store: Arc<MemoryUserStore>) -> Router {
    build_app(AppState::fake(store))
}

/// `Authorization` header value for a session belonging to `user_id`.
pub fn bearer(user_id: i64, username: &str) -> String {
    let state = AppState::fake(Arc::new(MemoryUserStore::default()));
    let token = JwtKeys::from_ref(&state)
        .sign(user_id, username, "user")
        .expect("sign test token");
    format!("Bearer {token}")
}

/// Well-formed and correctly signed, but expired an hour ago.
pub fn expired_bearer(user_id: i64, username: &str) -> String {
    let state = AppState::fake(Arc::new(MemoryUserStore::default()));
    let keys = JwtKeys::from_ref(&state);
    let issued = OffsetDateTime::now_utc() - Duration::hours(2);
    let claims = Claims {
        sub: username.to_string(),
        id: user_id,
        role: "user".into(),
        iat: issued.unix_timestamp() as usize,
        exp: (issued + Duration::hours(1)).unix_timestamp() as usize,
        iss: keys.issuer.clone(),
        aud: keys.audience.clone(),
    };
    let token = encode(&Header::default(), &claims, &keys.encoding).expect("sign expired token");
    format!("Bearer {token}")
}

/// Same secret and issuer as the app, but minted for another audience.
pub fn foreign_audience_bearer(user_id: i64, username: &str) -> String {
    let state = AppState::fake(Arc::new(MemoryUserStore::default()));
    let keys = JwtKeys::from(&JwtConfig {
        audience: "someone-else".into(),
        ..state.config.jwt.clone()
    });
    let token = keys
        .sign(user_id, username, "user")
        .expect("sign foreign token");
    format!("Bearer {token}")
}

/// Sends one request and returns the status and the body parsed as JSON (`Null` when empty).
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("request should succeed");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, json)
}
