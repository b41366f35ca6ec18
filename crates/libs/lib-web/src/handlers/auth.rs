//! # Authentication Handlers
//!
//! Account registration and login.
//!
//! Both endpoints return the same [`AuthResponse`] shape: the public user
//! info plus a freshly minted JWT whose `sub` claim doubles as the chat
//! identity for the WebSocket channel.

use axum::{extract::State, http::StatusCode, Json};
use lib_auth::{encode_jwt, hash_password, verify_password};
use lib_core::dto::{AuthResponse, ErrorResponse, LoginRequest, RegisterRequest, UserInfo};
use lib_core::model::store::{User, UserForCreate, UserRepository};
use lib_core::{Config, DbPool};
use lib_utils::time::format_time;
use lib_utils::validation::{validate_min_length, validate_not_empty};
use tracing::{error, info, warn};

/// Build the public view of a user row.
pub(crate) fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.to_string(),
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        profile_pic: user.profile_pic.clone(),
        created_at: format_time(user.created_at),
    }
}

fn bad_request(msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: msg.into() }),
    )
}

/// Handle account registration.
///
/// **Route**: `POST /api/auth/register`
///
/// # Returns
///
/// * `201 Created` with [`AuthResponse`] on success
/// * `400 Bad Request` for invalid username/password
/// * `409 Conflict` when the username is taken
pub async fn register(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("[REGISTER] Attempt for username: {}", req.username);

    // Validate input
    validate_not_empty(&req.username, "username").map_err(bad_request)?;
    validate_min_length(&req.username, 3, "username").map_err(bad_request)?;

    // Check username availability
    match UserRepository::find_by_username(&pool, &req.username).await {
        Ok(Some(_)) => {
            warn!("[REGISTER] Username already taken: {}", req.username);
            return Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Username already taken".to_string(),
                }),
            ));
        }
        Ok(None) => {}
        Err(e) => {
            error!("[REGISTER] Database error checking username: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Registration failed".to_string(),
                }),
            ));
        }
    }

    // Hash the password (also enforces minimum length)
    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("[REGISTER] Password rejected for {}: {}", req.username, e);
            return Err(bad_request(e));
        }
    };

    // New accounts start with the username as display name
    let user_data = UserForCreate::new(req.username.clone(), password_hash, req.username.clone());

    let user = match UserRepository::create(&pool, user_data).await {
        Ok(user) => user,
        Err(e) => {
            error!("[REGISTER] Failed to create user {}: {}", req.username, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Registration failed".to_string(),
                }),
            ));
        }
    };

    let token = match encode_jwt(
        user.id,
        user.username.clone(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("[REGISTER] Failed to generate token: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Registration failed".to_string(),
                }),
            ));
        }
    };

    info!(
        "[REGISTER] Created user: {} (id: {})",
        user.username, user.id
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user_info(&user),
            token,
            message: "Registration successful".to_string(),
        }),
    ))
}

/// Handle user login.
///
/// **Route**: `POST /api/auth/login`
///
/// # Returns
///
/// * `200 OK` with [`AuthResponse`] on success
/// * `401 Unauthorized` for unknown user, wrong password, or disabled account
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("[LOGIN] Attempt for username: {}", req.username);

    // Same response for unknown user and wrong password
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid username or password".to_string(),
            }),
        )
    };

    let user = match UserRepository::find_by_username(&pool, &req.username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("[LOGIN] Unknown username: {}", req.username);
            return Err(invalid());
        }
        Err(e) => {
            error!("[LOGIN] Database error: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Login failed".to_string(),
                }),
            ));
        }
    };

    if !user.is_active {
        warn!("[LOGIN] Disabled account: {}", req.username);
        return Err(invalid());
    }

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!("[LOGIN] Wrong password for: {}", req.username);
            return Err(invalid());
        }
        Err(e) => {
            error!("[LOGIN] Password verification error: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Login failed".to_string(),
                }),
            ));
        }
    }

    // Best-effort; a failed timestamp update must not fail the login
    if let Err(e) = UserRepository::update_last_login(&pool, user.id).await {
        warn!("[LOGIN] Failed to update last_login: {}", e);
    }

    let token = match encode_jwt(
        user.id,
        user.username.clone(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("[LOGIN] Failed to generate token: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Login failed".to_string(),
                }),
            ));
        }
    };

    info!("[LOGIN] Success for: {} (id: {})", user.username, user.id);

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            user: user_info(&user),
            token,
            message: "Login successful".to_string(),
        }),
    ))
}
