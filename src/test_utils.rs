//! Shared test utilities for the ledger.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{self, user::Identity},
    entities::{Stock, Transaction, product, stock, transaction, user},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed sale date used across tests.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
}

/// Builds a caller [`Identity`] without touching the database.
///
/// The name matches what [`register_test_user`] stores for the same id, so
/// display assertions line up.
pub fn test_identity(user_id: &str, user_type: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        name: format!("{user_id} Test"),
        user_type: user_type.to_string(),
    }
}

/// Inserts a user row directly, with a cheap low-cost password hash.
///
/// # Defaults
/// * `name`: `"<user_id> Test"`
/// * `email`: `"<user_id>@users.test"`
/// * password: `"secret"` (bcrypt cost 4; `DEFAULT_COST` is too slow for tests)
pub async fn register_test_user(
    db: &DatabaseConnection,
    user_id: &str,
    user_type: &str,
) -> Result<user::Model> {
    let row = user::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(format!("{user_id} Test")),
        email: Set(format!("{user_id}@users.test")),
        password_hash: Set(bcrypt::hash("secret", 4)?),
        user_type: Set(user_type.to_string()),
        phone: Set(None),
        address: Set(None),
        created_at: Set(chrono::Utc::now()),
    };
    Ok(row.insert(db).await?)
}

/// Sets up a database with one registered farmer.
/// Returns (db, farmer identity) for common test scenarios.
pub async fn setup_with_farmer() -> Result<(DatabaseConnection, Identity)> {
    let db = setup_test_db().await?;
    let farmer = register_test_user(&db, "F001", "farmer").await?;
    Ok((db, Identity::from(&farmer)))
}

/// Sets up a database with a farmer holding 100 kg of product "P1".
/// Returns (db, farmer identity, product) for transfer tests.
pub async fn setup_with_product() -> Result<(DatabaseConnection, Identity, product::Model)> {
    let (db, farmer) = setup_with_farmer().await?;
    let product = core::product::create_product(
        &db,
        &farmer,
        "P1".to_string(),
        "Tomato".to_string(),
        "North Field".to_string(),
        100.0,
        "kg".to_string(),
    )
    .await?;
    Ok((db, farmer, product))
}

/// Sums the quantity held across all holders of a product.
pub async fn total_stock(db: &DatabaseConnection, product_id: &str) -> Result<f64> {
    let rows = Stock::find()
        .filter(stock::Column::ProductId.eq(product_id))
        .all(db)
        .await?;
    Ok(rows.iter().map(|row| row.quantity).sum())
}

/// Sums the quantity a product's ledger records as sold to anonymous customers.
pub async fn sold_to_customer_total(db: &DatabaseConnection, product_id: &str) -> Result<f64> {
    let rows = Transaction::find()
        .filter(transaction::Column::ProductId.eq(product_id))
        .filter(transaction::Column::Status.eq(transaction::STATUS_SOLD_TO_CUSTOMER))
        .all(db)
        .await?;
    Ok(rows.iter().map(|row| row.quantity).sum())
}
