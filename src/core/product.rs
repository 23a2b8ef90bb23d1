//! Ownership engine, creation half - registering new products.
//!
//! A product enters the ledger exactly once, registered by the farmer who
//! grew it. Registration atomically inserts the product row and the
//! farmer's opening stock row, so a product never exists without a holder.

use crate::{
    core::user::Identity,
    entities::{Product, product, stock},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Registers a new product and credits the full quantity to the caller.
///
/// Only farmers may register products. The caller becomes both the
/// product's `initial_farmer_id` (fixed forever) and its first
/// `current_owner_id`. The opening stock row carries no purchase price,
/// since the farmer grew the crop rather than buying it.
///
/// # Errors
/// Returns an error if:
/// - The caller is not a farmer
/// - The product id or crop name is blank
/// - The quantity is not a positive finite number
/// - The product id is already registered
/// - The database writes fail (nothing is committed in that case)
pub async fn create_product(
    db: &DatabaseConnection,
    caller: &Identity,
    product_id: String,
    crop_name: String,
    area: String,
    quantity: f64,
    unit: String,
) -> Result<product::Model> {
    if !caller.is_farmer() {
        return Err(Error::Forbidden {
            message: "only farmers can add new products".to_string(),
        });
    }

    // Validate inputs
    if product_id.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "product id cannot be empty".to_string(),
        });
    }

    if crop_name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "crop name cannot be empty".to_string(),
        });
    }

    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(Error::InvalidQuantity { quantity });
    }

    let product_id = product_id.trim().to_string();
    let crop_name = crop_name.trim().to_string();

    // Product and opening stock must land together
    let txn = db.begin().await?;

    let existing = Product::find_by_id(product_id.clone()).one(&txn).await?;
    if existing.is_some() {
        return Err(Error::DuplicateProduct { product_id });
    }

    let now = chrono::Utc::now();

    let registered = product::ActiveModel {
        product_id: Set(product_id.clone()),
        crop_name: Set(crop_name.clone()),
        initial_farmer_id: Set(caller.user_id.clone()),
        current_owner_id: Set(caller.user_id.clone()),
        area: Set(area),
        unit: Set(unit),
        created_at: Set(now),
    };
    let registered = registered.insert(&txn).await?;

    let opening_stock = stock::ActiveModel {
        user_id: Set(caller.user_id.clone()),
        product_id: Set(product_id),
        crop_name: Set(crop_name),
        quantity: Set(quantity),
        purchase_price: Set(None),
        purchase_date: Set(now.date_naive()),
        ..Default::default()
    };
    opening_stock.insert(&txn).await?;

    txn.commit().await?;

    Ok(registered)
}

/// Retrieves a product by id, returning None if not registered.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: &str,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all registered products, ordered by product id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::ProductId)
        .all(db)
        .await
        .map_err(Into::into)
}
