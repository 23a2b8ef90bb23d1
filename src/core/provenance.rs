//! Provenance reader - read-only reconstruction of custody chains.
//!
//! [`track`] is the public entry point: given a product id it returns the
//! product, its farmer and current owner, and every transfer in
//! chronological order, with display identities resolved. It needs no
//! authentication and never mutates anything. Stock rows come and go, but
//! the ledger is append-only, so the chain survives holders who have long
//! since sold out.

use crate::{
    entities::{Stock, Transaction, User, stock, transaction, user},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// Display identity shown for anonymous end customers.
pub const ANONYMOUS_CUSTOMER: &str = "anonymous customer";

/// Resolved display identity of one registered party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyView {
    /// Registered user id
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Role in the supply chain
    pub user_type: String,
}

impl From<&user::Model> for PartyView {
    fn from(model: &user::Model) -> Self {
        Self {
            user_id: model.user_id.clone(),
            name: model.name.clone(),
            user_type: model.user_type.clone(),
        }
    }
}

/// A product joined with its origin and current-holder identities.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    /// Product id
    pub product_id: String,
    /// Crop name
    pub crop_name: String,
    /// Growing area / origin description
    pub area: String,
    /// Unit quantities are measured in
    pub unit: String,
    /// When the product was registered
    pub created_at: DateTimeUtc,
    /// The farmer who registered the product
    pub farmer: PartyView,
    /// The last identified holder
    pub current_owner: PartyView,
}

/// One link of the custody chain, with both sides resolved.
#[derive(Debug, Clone, Serialize)]
pub struct TransferView {
    /// Ledger id of the transfer
    pub transaction_id: i64,
    /// The selling party
    pub seller: PartyView,
    /// The buying party; None for a sale to an anonymous customer
    pub buyer: Option<PartyView>,
    /// Price per unit agreed for the transfer
    pub price: f64,
    /// Quantity transferred
    pub quantity: f64,
    /// Caller-supplied date of the sale
    pub transaction_date: Date,
    /// Server clock at commit; the chain is ordered by this
    pub transaction_time: DateTimeUtc,
    /// `"normal"` or `"sold_to_customer"`
    pub status: String,
}

impl TransferView {
    /// Buyer display name, `"anonymous customer"` for terminal sales.
    #[must_use]
    pub fn buyer_display(&self) -> &str {
        self.buyer
            .as_ref()
            .map_or(ANONYMOUS_CUSTOMER, |buyer| buyer.name.as_str())
    }
}

/// Full provenance of one product: the product plus its chronological chain.
#[derive(Debug, Clone, Serialize)]
pub struct ProvenanceView {
    /// The tracked product with resolved holder identities
    pub product: ProductView,
    /// Every transfer, ordered by `transaction_time` ascending
    pub transactions: Vec<TransferView>,
}

/// One row of a holder's current inventory, joined with product detail.
#[derive(Debug, Clone, Serialize)]
pub struct StockView {
    /// Stock row id
    pub stock_id: i64,
    /// Product held
    pub product_id: String,
    /// Crop name
    pub crop_name: String,
    /// Quantity held
    pub quantity: f64,
    /// Unit quantities are measured in
    pub unit: String,
    /// Price per unit paid at acquisition; None for farmer-grown stock
    pub purchase_price: Option<f64>,
    /// Date the holding was acquired
    pub purchase_date: Date,
    /// The farmer the product originates from
    pub initial_farmer_id: String,
}

/// One entry of a user's transaction history, seller or buyer side.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    /// Ledger id of the transfer
    pub transaction_id: i64,
    /// Product that changed hands
    pub product_id: String,
    /// Crop name of the product
    pub crop_name: String,
    /// Seller user id
    pub seller_id: String,
    /// Seller display name
    pub seller_name: String,
    /// Buyer user id; None for a sale to an anonymous customer
    pub buyer_id: Option<String>,
    /// Buyer display name; None for a sale to an anonymous customer
    pub buyer_name: Option<String>,
    /// Price per unit
    pub price: f64,
    /// Quantity transferred
    pub quantity: f64,
    /// Caller-supplied date of the sale
    pub transaction_date: Date,
    /// Server clock at commit
    pub transaction_time: DateTimeUtc,
    /// `"normal"` or `"sold_to_customer"`
    pub status: String,
}

/// Reconstructs the full custody chain of a product.
///
/// Publicly trackable: no authentication, no mutation. Transactions are
/// ordered by server commit time ascending, so the result reads as the
/// product's life from registration to the present.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if the product does not exist, or an
/// error if a query fails.
pub async fn track(db: &DatabaseConnection, product_id: &str) -> Result<ProvenanceView> {
    let product = crate::core::product::get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            product_id: product_id.to_string(),
        })?;

    let rows = Transaction::find()
        .filter(transaction::Column::ProductId.eq(product_id))
        .order_by_asc(transaction::Column::TransactionTime)
        .all(db)
        .await?;

    // Resolve every identity the product or its ledger names, in one query
    let mut ids = vec![
        product.initial_farmer_id.clone(),
        product.current_owner_id.clone(),
    ];
    for row in &rows {
        ids.push(row.seller_id.clone());
        if let Some(buyer_id) = &row.buyer_id {
            ids.push(buyer_id.clone());
        }
    }
    ids.sort();
    ids.dedup();
    let parties = load_parties(db, ids).await?;

    let transactions = rows
        .into_iter()
        .map(|row| {
            let buyer = match &row.buyer_id {
                Some(buyer_id) => Some(resolve(&parties, buyer_id)?),
                None => None,
            };
            Ok(TransferView {
                transaction_id: row.transaction_id,
                seller: resolve(&parties, &row.seller_id)?,
                buyer,
                price: row.price,
                quantity: row.quantity,
                transaction_date: row.transaction_date,
                transaction_time: row.transaction_time,
                status: row.status,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProvenanceView {
        product: ProductView {
            product_id: product.product_id,
            crop_name: product.crop_name,
            area: product.area,
            unit: product.unit,
            created_at: product.created_at,
            farmer: resolve(&parties, &product.initial_farmer_id)?,
            current_owner: resolve(&parties, &product.current_owner_id)?,
        },
        transactions,
    })
}

/// Lists a user's current holdings, joined with product detail.
///
/// # Errors
/// Returns an error if a query fails or a stock row references a missing
/// product.
pub async fn list_stock(db: &DatabaseConnection, user_id: &str) -> Result<Vec<StockView>> {
    let rows = Stock::find()
        .filter(stock::Column::UserId.eq(user_id))
        .order_by_asc(stock::Column::ProductId)
        .find_also_related(crate::entities::Product)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(held, product)| {
            let product = product.ok_or_else(|| Error::ProductNotFound {
                product_id: held.product_id.clone(),
            })?;
            Ok(StockView {
                stock_id: held.stock_id,
                product_id: held.product_id,
                crop_name: held.crop_name,
                quantity: held.quantity,
                unit: product.unit,
                purchase_price: held.purchase_price,
                purchase_date: held.purchase_date,
                initial_farmer_id: product.initial_farmer_id,
            })
        })
        .collect()
}

/// Lists a user's transaction history, as seller or buyer, newest first.
///
/// # Errors
/// Returns an error if a query fails or a ledger row references a missing
/// product or party.
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<TransactionView>> {
    let rows = Transaction::find()
        .filter(
            Condition::any()
                .add(transaction::Column::SellerId.eq(user_id))
                .add(transaction::Column::BuyerId.eq(user_id)),
        )
        .order_by_desc(transaction::Column::TransactionTime)
        .find_also_related(crate::entities::Product)
        .all(db)
        .await?;

    let mut ids = Vec::new();
    for (row, _) in &rows {
        ids.push(row.seller_id.clone());
        if let Some(buyer_id) = &row.buyer_id {
            ids.push(buyer_id.clone());
        }
    }
    ids.sort();
    ids.dedup();
    let parties = load_parties(db, ids).await?;

    rows.into_iter()
        .map(|(row, product)| {
            let product = product.ok_or_else(|| Error::ProductNotFound {
                product_id: row.product_id.clone(),
            })?;
            let seller_name = resolve(&parties, &row.seller_id)?.name;
            let buyer_name = match &row.buyer_id {
                Some(buyer_id) => Some(resolve(&parties, buyer_id)?.name),
                None => None,
            };
            Ok(TransactionView {
                transaction_id: row.transaction_id,
                product_id: row.product_id,
                crop_name: product.crop_name,
                seller_id: row.seller_id,
                seller_name,
                buyer_id: row.buyer_id,
                buyer_name,
                price: row.price,
                quantity: row.quantity,
                transaction_date: row.transaction_date,
                transaction_time: row.transaction_time,
                status: row.status,
            })
        })
        .collect()
}

async fn load_parties(
    db: &DatabaseConnection,
    ids: Vec<String>,
) -> Result<HashMap<String, PartyView>> {
    Ok(User::find()
        .filter(user::Column::UserId.is_in(ids))
        .all(db)
        .await?
        .iter()
        .map(|model| (model.user_id.clone(), PartyView::from(model)))
        .collect())
}

fn resolve(parties: &HashMap<String, PartyView>, user_id: &str) -> Result<PartyView> {
    parties
        .get(user_id)
        .cloned()
        .ok_or_else(|| Error::UserNotFound {
            user_id: user_id.to_string(),
        })
}
