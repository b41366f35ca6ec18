//! # User Handlers
//!
//! Contact listing and profile updates.

use super::auth::user_info;
use axum::{extract::State, http::StatusCode, Extension, Json};
use lib_auth::Claims;
use lib_core::dto::{ErrorResponse, UpdateProfileRequest, UserInfo};
use lib_core::model::store::{UserForUpdate, UserProfile, UserRepository};
use lib_core::DbPool;
use lib_utils::validation::{validate_image_ref, validate_not_empty};
use tracing::{error, info, warn};

/// List all contactable users.
///
/// **Route**: `GET /api/users` (authenticated)
///
/// Returns the public profile of every active account, ordered by display
/// name. The caller's own profile is included; clients filter it out.
pub async fn list_users(
    State(pool): State<DbPool>,
) -> Result<Json<Vec<UserProfile>>, (StatusCode, Json<ErrorResponse>)> {
    match UserRepository::list_profiles(&pool).await {
        Ok(profiles) => Ok(Json(profiles)),
        Err(e) => {
            error!("[USERS] Failed to list profiles: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load users".to_string(),
                }),
            ))
        }
    }
}

/// Update the authenticated user's profile.
///
/// **Route**: `POST /api/profile` (authenticated)
///
/// Only fields present in the body are changed.
pub async fn update_profile(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserInfo>, (StatusCode, Json<ErrorResponse>)> {
    let bad_request = |msg: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: msg }),
        )
    };

    // Claims are produced by this service, sub is always a numeric id
    let user_id: i64 = claims.sub.parse().map_err(|_| {
        warn!("[PROFILE] Malformed subject claim: {}", claims.sub);
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid token".to_string(),
            }),
        )
    })?;

    let mut update = UserForUpdate::new();

    if let Some(display_name) = req.display_name {
        validate_not_empty(&display_name, "displayName").map_err(bad_request)?;
        update = update.display_name(display_name);
    }

    if let Some(profile_pic) = req.profile_pic {
        validate_image_ref(&profile_pic).map_err(bad_request)?;
        update = update.profile_pic(profile_pic);
    }

    match UserRepository::update(&pool, user_id, update).await {
        Ok(user) => {
            info!(
                "[PROFILE] Updated profile for {} (id: {})",
                user.username, user.id
            );
            Ok(Json(user_info(&user)))
        }
        Err(sqlx::Error::RowNotFound) => {
            warn!("[PROFILE] No such user: {}", user_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".to_string(),
                }),
            ))
        }
        Err(e) => {
            error!("[PROFILE] Update failed for {}: {}", user_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Profile update failed".to_string(),
                }),
            ))
        }
    }
}
