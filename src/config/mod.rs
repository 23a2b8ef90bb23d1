/// Database configuration and connection management
pub mod database;

/// Registry user seeding from config.toml
pub mod users;
