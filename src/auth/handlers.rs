use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    auth::{
        dto::{CreateUserRequest, TokenForm, TokenResponse},
        password::{hash_password, verify_password},
    },
    error::{AppError, AppResult},
    extract::{AppForm, AppJson},
    state::AppState,
    users::{repo::UniqueViolation, repo_types::NewUser},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/", post(register))
        .route("/auth/token", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<CreateUserRequest>,
) -> AppResult<StatusCode> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    let hashed_password = hash_password(&payload.password)?;
    let new_user = NewUser {
        email: payload.email,
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
        hashed_password,
        is_active: true,
        role: payload.role,
        phone_number: payload.phone_number,
    };

    let user = state.users.create(new_user).await.map_err(|e| {
        if e.is::<UniqueViolation>() {
            warn!("username or email already registered");
            AppError::Conflict("Username or email already registered")
        } else {
            AppError::Internal(e)
        }
    })?;

    info!(user_id = user.id, "user registered");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<TokenForm>,
) -> AppResult<Json<TokenResponse>> {
    let Some(user) = state.users.find_by_username(&form.username).await? else {
        warn!("login unknown username");
        return Err(AppError::Unauthorized("Could not validate user."));
    };

    if !verify_password(&form.password, &user.hashed_password)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized("Could not validate user."));
    }

    let access_token = state.jwt.sign(user.id, &user.username, &user.role)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
