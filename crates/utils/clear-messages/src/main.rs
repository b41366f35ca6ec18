//! # Clear Messages Utility
//!
//! Maintenance tool that wipes the entire message history.
//!
//! Asks for confirmation before deleting. Useful when resetting a dev
//! database without touching the user accounts.
//!
//! ```bash
//! cargo run --bin clear_messages
//! ```

use lib_core::model::store::MessageRepository;
use lib_core::{create_pool, DbPool};
use std::io::{self, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let pool = create_pool().await?;

    let count = message_count(&pool).await?;
    if count == 0 {
        println!("No messages in the database. Nothing to do.");
        return Ok(());
    }

    println!("This will delete {} message(s). This cannot be undone.", count);
    print!("Continue? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        println!("Aborted.");
        return Ok(());
    }

    let deleted = MessageRepository::delete_all(&pool).await?;
    println!("Deleted {} message(s).", deleted);

    Ok(())
}

async fn message_count(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(pool)
        .await
}
