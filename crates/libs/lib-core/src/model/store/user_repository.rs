//! # User Repository
//!
//! Provides database access layer for user-related operations.
//!
//! This module implements the repository pattern for user data access,
//! providing a clean abstraction over SQL queries. Credential verification
//! itself lives in `lib-auth`; this layer only stores and retrieves rows.

use super::models::{User, UserForCreate, UserForUpdate, UserProfile};
use super::DbPool;
use sqlx::query_as;

/// User repository for database operations.
///
/// Provides methods for creating, retrieving, and updating user records.
/// All methods are async and return `Result` types for proper error handling.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by their username.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching username
    /// * `Ok(None)` - No user found with that username
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Create a new user using `UserForCreate`.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Username already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &DbPool, user_data: UserForCreate) -> Result<User, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, display_name) VALUES (?, ?, ?)",
        )
        .bind(&user_data.username)
        .bind(&user_data.password_hash)
        .bind(&user_data.display_name)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update an existing user using `UserForUpdate`.
    ///
    /// Only fields that are `Some` in `user_data` will be updated.
    pub async fn update(
        pool: &DbPool,
        id: i64,
        user_data: UserForUpdate,
    ) -> Result<User, sqlx::Error> {
        // Build update query dynamically
        let mut updates = Vec::new();

        if user_data.display_name.is_some() {
            updates.push("display_name = ?");
        }
        if user_data.profile_pic.is_some() {
            updates.push("profile_pic = ?");
        }
        if user_data.is_active.is_some() {
            updates.push("is_active = ?");
        }

        if updates.is_empty() {
            // No updates, just return the existing user
            return query_as::<_, User>("SELECT * FROM users WHERE id = ?")
                .bind(id)
                .fetch_one(pool)
                .await;
        }

        updates.push("updated_at = CURRENT_TIMESTAMP");
        let query_str = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));

        let mut query = sqlx::query(&query_str);

        if let Some(ref display_name) = user_data.display_name {
            query = query.bind(display_name);
        }
        if let Some(ref profile_pic) = user_data.profile_pic {
            query = query.bind(profile_pic);
        }
        if let Some(is_active) = user_data.is_active {
            query = query.bind(is_active);
        }

        query.bind(id).execute(pool).await?;

        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update the last login timestamp for a user.
    ///
    /// # Note
    ///
    /// This method does not verify that the user exists. If the user ID is invalid,
    /// it will succeed but not update any rows.
    pub async fn update_last_login(pool: &DbPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// List public profiles of all active users, for the contact sidebar.
    pub async fn list_profiles(pool: &DbPool) -> Result<Vec<UserProfile>, sqlx::Error> {
        query_as::<_, UserProfile>(
            "SELECT id, display_name, profile_pic FROM users WHERE is_active = 1 ORDER BY display_name",
        )
        .fetch_all(pool)
        .await
    }

    /// Delete all users from the database.
    ///
    /// **WARNING**: This is a destructive operation that cannot be undone.
    pub async fn delete_all(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
