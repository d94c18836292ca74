use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, LogoutResponse, RegisterRequest, RegisterResponse},
        extractors::{CurrentUser, MaybeUser},
        password::hash_password,
        repo::{NewUser, User},
        validate,
    },
    error::AppError,
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    MaybeUser(existing): MaybeUser,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    if existing.is_some() {
        return Err(AppError::AlreadyLoggedIn);
    }

    payload.email = payload.email.trim().to_lowercase();

    let issues = validate::validate_registration(&payload);
    if !issues.is_empty() {
        warn!(email = %payload.email, ?issues, "registration rejected");
        return Err(AppError::Validation(issues));
    }

    let role = payload
        .role
        .normalize()
        .ok_or_else(|| AppError::BadRequest("Invalid user role".into()))?;

    // Fast-path duplicate check; the unique index on users.email is the
    // authoritative one under concurrency.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Internal
    })?;

    let user = User::create(
        &state.db,
        &NewUser {
            full_name: payload.full_name.trim(),
            email: &payload.email,
            password_hash: &hash,
            contact: payload.contact_number.trim(),
            country: Some(payload.country.trim()),
            city: Some(payload.city.trim()),
            role,
        },
    )
    .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success",
            message: "Registration successful".into(),
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    MaybeUser(existing): MaybeUser,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if existing.is_some() {
        return Err(AppError::AlreadyLoggedIn);
    }

    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }
    if !validate::is_valid_email(&payload.email) {
        return Err(AppError::BadRequest("Invalid email format".into()));
    }

    // Unknown email and wrong password produce the identical reply; nothing
    // here may leak which factor failed.
    let Some(user) = User::verify_credentials(&state.db, &payload.email, &payload.password).await?
    else {
        warn!(email = %payload.email, "login failed");
        return Err(AppError::InvalidCredentials);
    };

    let role = user.role();
    let token = state
        .sessions
        .create(user.id, role, user.full_name.clone())
        .await;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        status: "success",
        message: "Login successful".into(),
        user_id: user.id,
        name: user.full_name,
        role,
        session_token: token,
    }))
}

#[instrument(skip(state, user))]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<LogoutResponse>, AppError> {
    state.sessions.destroy(user.token).await;
    info!(user_id = user.session.user_id, "user logged out");
    Ok(Json(LogoutResponse {
        status: "success",
        message: "Logged out successfully".into(),
    }))
}
