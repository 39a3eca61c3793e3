use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        AuthUser,
    },
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    state::AppState,
    users::{
        dto::{UserRequest, UserVerification},
        repo_types::{ProfileUpdate, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/", get(get_user))
        .route("/user/password", put(change_password))
        .route("/user/phonenumber/:phone_number", put(change_phone_number))
        .route("/user/:user_id", put(update_user))
}

/// GET /user/ → the caller's own row, or `null` if it no longer exists.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    session: AuthUser,
) -> AppResult<Json<Option<User>>> {
    let user = state.users.find_by_id(session.id).await?;
    debug!(user_id = session.id, role = %session.role, found = user.is_some(), "profile read");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    session: AuthUser,
    AppJson(payload): AppJson<UserVerification>,
) -> AppResult<StatusCode> {
    payload.validate()?;

    let user = state
        .users
        .find_by_id(session.id)
        .await?
        .ok_or(AppError::NotFound("User not found."))?;

    if !verify_password(&payload.password, &user.hashed_password)? {
        warn!(user_id = user.id, "password change with wrong current password");
        return Err(AppError::Unauthorized("Error on password change"));
    }

    let hashed = hash_password(&payload.new_password)?;
    state.users.update_password(user.id, &hashed).await?;

    info!(user_id = user.id, username = %session.username, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /user/{user_id}. Any valid session may replace any profile; see DESIGN.md.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    session: AuthUser,
    AppPath(user_id): AppPath<i64>,
    AppJson(payload): AppJson<UserRequest>,
) -> AppResult<StatusCode> {
    if user_id <= 0 {
        return Err(AppError::Validation("user_id must be greater than 0".into()));
    }
    payload.validate()?;

    if state.users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found."));
    }

    if session.id != user_id {
        warn!(session_id = session.id, user_id, "profile replaced by another user");
    }

    let update = ProfileUpdate::from(payload);
    state.users.update_profile(user_id, &update).await?;

    info!(user_id, "profile replaced");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, phone_number))]
pub async fn change_phone_number(
    State(state): State<AppState>,
    session: AuthUser,
    AppPath(phone_number): AppPath<String>,
) -> AppResult<StatusCode> {
    // Missing rows answer 404 instead of failing unguarded.
    if state.users.find_by_id(session.id).await?.is_none() {
        return Err(AppError::NotFound("User not found."));
    }

    state
        .users
        .update_phone_number(session.id, &phone_number)
        .await?;

    info!(user_id = session.id, "phone number replaced");
    Ok(StatusCode::NO_CONTENT)
}
