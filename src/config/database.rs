//! Database configuration module for the `AgriChain` ledger.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. The schema is generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database always matches the
//! Rust struct definitions without hand-written SQL.

use crate::entities::{Product, Stock, Transaction, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/agrichain.sqlite".to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all ledger tables from the entity definitions.
///
/// Safe to call on an already-provisioned database; existing tables are
/// left alone.
///
/// # Errors
/// Returns an error if a table creation statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Users first: stock and transactions carry foreign keys into it
    let mut user_table = schema.create_table_from_entity(User);
    user_table.if_not_exists();
    let mut product_table = schema.create_table_from_entity(Product);
    product_table.if_not_exists();
    let mut stock_table = schema.create_table_from_entity(Stock);
    stock_table.if_not_exists();
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table.if_not_exists();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&stock_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;

    Ok(())
}
