//! Provisioning entry point for the `AgriChain` ledger.
//!
//! Creates the database schema from the entity definitions and seeds the
//! registry users listed in config.toml. Safe to re-run; existing tables
//! and users are left untouched.

use agrichain::{config, errors::Result};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 3. Connect and provision the schema
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema provisioned."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed registry users when a config.toml is present
    match config::users::load_default_config() {
        Ok(user_config) => {
            let seeded = config::users::seed_initial_users(&db, &user_config).await?;
            info!("Seeded {} registry users from config.toml.", seeded);
        }
        Err(e) => info!("Skipping user seed: {}", e),
    }

    info!(
        "AgriChain ledger ready at {}",
        config::database::get_database_url()
    );
    Ok(())
}
