//! Ownership engine, transfer half - moving stock between holders.
//!
//! [`transfer_product`] is the only way stock changes hands. It runs as one
//! SQL transaction: append the ledger row, update the product owner for an
//! identified buyer, decrement the seller's stock with a guarded atomic
//! update, and credit the buyer. Every failure path before commit rolls the
//! whole operation back, so readers never observe a half-applied transfer.

use crate::{
    core::user::Identity,
    entities::{Product, Stock, User, product, stock, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{Set, TransactionTrait, prelude::*};

/// Who is receiving the product in a transfer.
///
/// Replaces the null / empty-string / `"customer"` sentinel duality of the
/// browser form: a buyer is either a registered user or an anonymous end
/// customer, never an ambiguous string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Buyer {
    /// A registered user who becomes the product's next holder
    Identified(String),
    /// An anonymous end customer; the terminal link of the custody chain
    AnonymousCustomer,
}

impl Buyer {
    /// Folds the raw buyer field of a transfer request into the union.
    ///
    /// A missing, empty or literal `"customer"` value means the sale goes to
    /// an anonymous end customer; anything else names a registered user.
    #[must_use]
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw {
            None | Some("" | "customer") => Self::AnonymousCustomer,
            Some(id) => Self::Identified(id.to_string()),
        }
    }
}

/// Transfers `quantity` of a product from the caller to `buyer`.
///
/// Runs as a single atomic transaction:
/// 1. Append the immutable ledger row (`sold_to_customer` status and no
///    buyer id for an anonymous customer, `normal` otherwise).
/// 2. For an identified buyer, point `current_owner_id` at the buyer. A
///    terminal sale leaves it at the last identified holder.
/// 3. Decrement the caller's stock. The update is guarded with
///    `quantity >= ?` so two concurrent sales cannot both spend the same
///    stock; losing the race fails the transfer. Exact depletion deletes
///    the row.
/// 4. For an identified buyer, increase an existing holding of the product
///    or create a fresh stock row priced at this sale.
///
/// # Errors
/// Returns an error if:
/// - The quantity is not positive finite, or the price not non-negative finite
/// - The caller holds less of the product than requested
/// - An identified buyer is not a registered user
/// - Any write fails; the transaction is rolled back and nothing is applied
pub async fn transfer_product(
    db: &DatabaseConnection,
    caller: &Identity,
    product_id: &str,
    buyer: Buyer,
    price: f64,
    quantity: f64,
    sale_date: NaiveDate,
) -> Result<transaction::Model> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(Error::InvalidQuantity { quantity });
    }

    if price < 0.0 || !price.is_finite() {
        return Err(Error::InvalidPrice { price });
    }

    // All reads and writes below share one transaction; any early return
    // drops it un-committed and the store rolls back.
    let txn = db.begin().await?;

    let held = Stock::find()
        .filter(stock::Column::UserId.eq(&caller.user_id))
        .filter(stock::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?
        .ok_or(Error::InsufficientStock {
            available: 0.0,
            requested: quantity,
        })?;

    if held.quantity < quantity {
        return Err(Error::InsufficientStock {
            available: held.quantity,
            requested: quantity,
        });
    }

    let buyer_user = match &buyer {
        Buyer::Identified(id) => Some(
            User::find_by_id(id.clone())
                .one(&txn)
                .await?
                .ok_or_else(|| Error::BuyerNotFound {
                    buyer_id: id.clone(),
                })?,
        ),
        Buyer::AnonymousCustomer => None,
    };

    let (buyer_id, status) = match &buyer_user {
        Some(user) => (Some(user.user_id.clone()), transaction::STATUS_NORMAL),
        None => (None, transaction::STATUS_SOLD_TO_CUSTOMER),
    };

    let record = transaction::ActiveModel {
        product_id: Set(product_id.to_string()),
        seller_id: Set(caller.user_id.clone()),
        buyer_id: Set(buyer_id),
        price: Set(price),
        quantity: Set(quantity),
        transaction_date: Set(sale_date),
        transaction_time: Set(chrono::Utc::now()),
        status: Set(status.to_string()),
        ..Default::default()
    };
    let record = record.insert(&txn).await?;

    if let Some(buyer_user) = &buyer_user {
        let updated = Product::update_many()
            .col_expr(
                product::Column::CurrentOwnerId,
                Expr::value(buyer_user.user_id.clone()),
            )
            .filter(product::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            return Err(Error::ProductNotFound {
                product_id: product_id.to_string(),
            });
        }
    }

    // Guarded decrement: the `quantity >= ?` filter is the compare-and-swap
    // that serializes concurrent sales from the same stock row.
    let debited = Stock::update_many()
        .col_expr(
            stock::Column::Quantity,
            Expr::col(stock::Column::Quantity).sub(quantity),
        )
        .filter(stock::Column::StockId.eq(held.stock_id))
        .filter(stock::Column::Quantity.gte(quantity))
        .exec(&txn)
        .await?;

    if debited.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            available: held.quantity,
            requested: quantity,
        });
    }

    // Exact depletion removes the row; stock never sits at zero.
    Stock::delete_many()
        .filter(stock::Column::StockId.eq(held.stock_id))
        .filter(stock::Column::Quantity.lte(0.0))
        .exec(&txn)
        .await?;

    if let Some(buyer_user) = &buyer_user {
        let existing = Stock::find()
            .filter(stock::Column::UserId.eq(&buyer_user.user_id))
            .filter(stock::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        match existing {
            Some(holding) => {
                // Re-acquisition: grow the holding, keep its original cost basis.
                Stock::update_many()
                    .col_expr(
                        stock::Column::Quantity,
                        Expr::col(stock::Column::Quantity).add(quantity),
                    )
                    .filter(stock::Column::StockId.eq(holding.stock_id))
                    .exec(&txn)
                    .await?;
            }
            None => {
                let acquired = stock::ActiveModel {
                    user_id: Set(buyer_user.user_id.clone()),
                    product_id: Set(product_id.to_string()),
                    crop_name: Set(held.crop_name.clone()),
                    quantity: Set(quantity),
                    purchase_price: Set(Some(price)),
                    purchase_date: Set(sale_date),
                    ..Default::default()
                };
                acquired.insert(&txn).await?;
            }
        }
    }

    txn.commit().await?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::Transaction;
    use crate::test_utils::{
        register_test_user, setup_with_product, sold_to_customer_total, test_date, test_identity,
        total_stock,
    };
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    #[test]
    fn test_buyer_from_request() {
        assert_eq!(Buyer::from_request(None), Buyer::AnonymousCustomer);
        assert_eq!(Buyer::from_request(Some("")), Buyer::AnonymousCustomer);
        assert_eq!(
            Buyer::from_request(Some("customer")),
            Buyer::AnonymousCustomer
        );
        assert_eq!(
            Buyer::from_request(Some("D001")),
            Buyer::Identified("D001".to_string())
        );
    }

    #[tokio::test]
    async fn test_transfer_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let seller = test_identity("F001", "farmer");

        // Zero quantity
        let result = transfer_product(
            &db,
            &seller,
            "P1",
            Buyer::AnonymousCustomer,
            10.0,
            0.0,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: 0.0 }
        ));

        // NaN quantity
        let result = transfer_product(
            &db,
            &seller,
            "P1",
            Buyer::AnonymousCustomer,
            10.0,
            f64::NAN,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: _ }
        ));

        // Negative price
        let result = transfer_product(
            &db,
            &seller,
            "P1",
            Buyer::AnonymousCustomer,
            -1.0,
            10.0,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidPrice { price: -1.0 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_without_stock() -> Result<()> {
        let (db, _farmer, _product) = setup_with_product().await?;
        let outsider = register_test_user(&db, "R001", "retailer").await?;

        let result = transfer_product(
            &db,
            &test_identity(&outsider.user_id, &outsider.user_type),
            "P1",
            Buyer::AnonymousCustomer,
            10.0,
            5.0,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 0.0,
                requested: 5.0
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_more_than_held() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;

        let result = transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::AnonymousCustomer,
            10.0,
            150.0,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 100.0,
                requested: 150.0
            }
        ));

        // Nothing was applied
        assert_eq!(total_stock(&db, &product.product_id).await?, 100.0);
        assert!(Transaction::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_unknown_buyer_rolls_back() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;

        let result = transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::Identified("D999".to_string()),
            8.0,
            40.0,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::BuyerNotFound { buyer_id: _ }
        ));

        // Ledger and stock unchanged
        assert!(Transaction::find().all(&db).await?.is_empty());
        assert_eq!(total_stock(&db, &product.product_id).await?, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_sell_to_customer() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;

        let record = transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::AnonymousCustomer,
            10.0,
            40.0,
            test_date(),
        )
        .await?;

        assert_eq!(record.status, transaction::STATUS_SOLD_TO_CUSTOMER);
        assert_eq!(record.buyer_id, None);
        assert_eq!(record.quantity, 40.0);

        // Seller's stock shrank in place
        let remaining = Stock::find()
            .filter(stock::Column::UserId.eq(&farmer.user_id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(remaining.quantity, 60.0);

        // A terminal sale never reassigns the product
        let product = Product::find_by_id(product.product_id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(product.current_owner_id, farmer.user_id);

        Ok(())
    }

    #[tokio::test]
    async fn test_sell_to_identified_buyer() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;
        let buyer = register_test_user(&db, "D001", "distributor").await?;

        let record = transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::Identified("D001".to_string()),
            8.0,
            30.0,
            test_date(),
        )
        .await?;

        assert_eq!(record.status, transaction::STATUS_NORMAL);
        assert_eq!(record.buyer_id, Some("D001".to_string()));

        // Ownership follows the sale
        let product = Product::find_by_id(product.product_id.clone())
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(product.current_owner_id, buyer.user_id);

        // Buyer's stock row carries this sale's price and date
        let holding = Stock::find()
            .filter(stock::Column::UserId.eq("D001"))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(holding.quantity, 30.0);
        assert_eq!(holding.purchase_price, Some(8.0));
        assert_eq!(holding.purchase_date, test_date());
        assert_eq!(holding.crop_name, product.crop_name);

        // Seller keeps the remainder
        let remaining = Stock::find()
            .filter(stock::Column::UserId.eq(&farmer.user_id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(remaining.quantity, 70.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_exact_depletion_deletes_stock_row() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;
        register_test_user(&db, "D001", "distributor").await?;

        transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::Identified("D001".to_string()),
            8.0,
            100.0,
            test_date(),
        )
        .await?;

        // The seller's row is gone, not zeroed
        let seller_rows = Stock::find()
            .filter(stock::Column::UserId.eq(&farmer.user_id))
            .all(&db)
            .await?;
        assert!(seller_rows.is_empty());

        // No stock row anywhere at or below zero
        let non_positive = Stock::find()
            .filter(stock::Column::Quantity.lte(0.0))
            .all(&db)
            .await?;
        assert!(non_positive.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_reacquisition_grows_existing_holding() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;
        register_test_user(&db, "D001", "distributor").await?;

        transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::Identified("D001".to_string()),
            8.0,
            30.0,
            test_date(),
        )
        .await?;
        transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::Identified("D001".to_string()),
            9.5,
            20.0,
            test_date(),
        )
        .await?;

        // One row, summed quantity, original cost basis
        let holdings = Stock::find()
            .filter(stock::Column::UserId.eq("D001"))
            .all(&db)
            .await?;
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, 50.0);
        assert_eq!(holdings[0].purchase_price, Some(8.0));

        Ok(())
    }

    #[tokio::test]
    async fn test_conservation_across_mixed_sales() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;
        register_test_user(&db, "D001", "distributor").await?;
        register_test_user(&db, "R001", "retailer").await?;

        // Farmer: 25 to customers, 60 to the distributor; 15 remain
        transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::AnonymousCustomer,
            12.0,
            25.0,
            test_date(),
        )
        .await?;
        transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::Identified("D001".to_string()),
            8.0,
            60.0,
            test_date(),
        )
        .await?;

        // Distributor: 35 to the retailer, 10 to customers
        let distributor = test_identity("D001", "distributor");
        transfer_product(
            &db,
            &distributor,
            &product.product_id,
            Buyer::Identified("R001".to_string()),
            10.0,
            35.0,
            test_date(),
        )
        .await?;
        transfer_product(
            &db,
            &distributor,
            &product.product_id,
            Buyer::AnonymousCustomer,
            14.0,
            10.0,
            test_date(),
        )
        .await?;

        // Conservation: held everywhere + sold to customers == created
        let held = total_stock(&db, &product.product_id).await?;
        let consumed = sold_to_customer_total(&db, &product.product_id).await?;
        assert_eq!(held + consumed, 100.0);
        assert_eq!(held, 65.0);
        assert_eq!(consumed, 35.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_storage_fault_during_ledger_append() -> Result<()> {
        // Script the store: the seller's stock check succeeds, then the
        // ledger append blows up. The engine must surface the storage
        // failure (the enclosing transaction never commits).
        let held = stock::Model {
            stock_id: 1,
            user_id: "F001".to_string(),
            product_id: "P1".to_string(),
            crop_name: "Tomato".to_string(),
            quantity: 100.0,
            purchase_price: None,
            purchase_date: test_date(),
        };
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![held]])
            .append_exec_errors([DbErr::Custom("forced write failure".to_string())])
            .append_query_errors([DbErr::Custom("forced write failure".to_string())])
            .into_connection();

        let result = transfer_product(
            &db,
            &test_identity("F001", "farmer"),
            "P1",
            Buyer::AnonymousCustomer,
            10.0,
            40.0,
            test_date(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Database(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_sequential_overdraw_is_rejected() -> Result<()> {
        let (db, farmer, product) = setup_with_product().await?;

        transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::AnonymousCustomer,
            10.0,
            70.0,
            test_date(),
        )
        .await?;

        // Only 30 remain; a second sale of 70 must fail and change nothing
        let result = transfer_product(
            &db,
            &farmer,
            &product.product_id,
            Buyer::AnonymousCustomer,
            10.0,
            70.0,
            test_date(),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                available: 30.0,
                requested: 70.0
            }
        ));

        assert_eq!(total_stock(&db, &product.product_id).await?, 30.0);
        assert_eq!(Transaction::find().all(&db).await?.len(), 1);

        Ok(())
    }
}
