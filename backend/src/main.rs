//! # Chat Backend
//!
//! Binary entry point. All real work happens in `lib-web`.

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    start_server(ServerConfig {
        bind_address,
        allowed_origins,
        migrations_path: "migrations".to_string(),
    })
    .await
}
