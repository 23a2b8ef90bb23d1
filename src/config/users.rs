//! Registry user seeding from config.toml.
//!
//! This module loads initial users (farmers, distributors, retailers) from
//! a TOML configuration file. The users defined there are used to seed the
//! registry on first run; ids that already exist are left untouched.

use crate::core::user::register_user;
use crate::errors::{Error, Result};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of registry users to seed
    pub users: Vec<UserConfig>,
}

/// Configuration for a single registry user
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    /// Caller-chosen unique user id
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Initial clear-text password; hashed before storage
    pub password: String,
    /// Role in the supply chain: "farmer", "distributor" or "retailer"
    pub user_type: String,
    /// Optional contact phone number
    pub phone: Option<String>,
    /// Optional postal address
    pub address: Option<String>,
}

/// Loads user configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads user configuration from the default location (./config.toml)
///
/// # Errors
/// Returns an error if the file is missing or malformed.
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

/// Seeds the registry with the configured users, skipping ids that are
/// already registered. Returns how many users were inserted.
///
/// # Errors
/// Returns an error if a registration fails for any reason other than the
/// user already existing.
pub async fn seed_initial_users(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut seeded = 0;
    for user in &config.users {
        let outcome = register_user(
            db,
            user.user_id.clone(),
            user.name.clone(),
            user.email.clone(),
            &user.password,
            user.user_type.clone(),
            user.phone.clone(),
            user.address.clone(),
        )
        .await;

        match outcome {
            Ok(_) => seeded += 1,
            Err(Error::DuplicateUser { user_id }) => {
                debug!("user {} already registered, skipping", user_id);
            }
            Err(other) => return Err(other),
        }
    }
    Ok(seeded)
}
