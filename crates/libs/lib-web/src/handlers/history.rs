//! # History Handler
//!
//! Conversation history for the public room and private threads.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use lib_auth::Claims;
use lib_core::model::store::{ChatMessage, MessageRepository, PUBLIC_RECIPIENT};
use lib_core::{AppError, Config, DbPool};
use tracing::debug;

/// Fetch conversation history.
///
/// **Route**: `GET /api/messages/{target}` (authenticated)
///
/// `target` is either the literal `public` room or another user's id. For a
/// private thread the result contains both directions of the conversation
/// between the caller and `target`; messages involving anyone else never
/// appear. Oldest first, capped at the configured page size.
pub async fn get_history(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(target): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let limit = config.history_page_size;

    let messages = if target == PUBLIC_RECIPIENT {
        MessageRepository::public_history(&pool, limit).await?
    } else {
        MessageRepository::private_history(&pool, &claims.sub, &target, limit).await?
    };

    debug!(
        "[HISTORY] requester={} target={} count={}",
        claims.sub,
        target,
        messages.len()
    );

    Ok(Json(messages))
}
