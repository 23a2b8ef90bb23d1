//! Transaction entity - The append-only custody ledger.
//!
//! Each row records one transfer: seller, optional buyer, price, quantity,
//! the caller-supplied `transaction_date` and the server-clock
//! `transaction_time` the chain is ordered by. Rows are never mutated or
//! deleted once written. `buyer_id` is `None` exactly when `status` is
//! [`STATUS_SOLD_TO_CUSTOMER`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of a transfer between two identified parties.
pub const STATUS_NORMAL: &str = "normal";
/// Status of a terminal sale to an anonymous end customer.
pub const STATUS_SOLD_TO_CUSTOMER: &str = "sold_to_customer";

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub transaction_id: i64,
    /// Product that changed hands
    pub product_id: String,
    /// User id of the seller
    pub seller_id: String,
    /// User id of the buyer; None for a sale to an anonymous customer
    pub buyer_id: Option<String>,
    /// Price per unit agreed for this transfer
    pub price: f64,
    /// Quantity transferred, in the product's unit
    pub quantity: f64,
    /// Caller-supplied date of the sale
    pub transaction_date: Date,
    /// Server clock at commit time; the custody chain orders by this
    pub transaction_time: DateTimeUtc,
    /// [`STATUS_NORMAL`] or [`STATUS_SOLD_TO_CUSTOMER`]
    pub status: String,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction concerns one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::ProductId"
    )]
    Product,
    /// Seller side of the transfer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerId",
        to = "super::user::Column::UserId"
    )]
    Seller,
    /// Buyer side of the transfer, absent for terminal sales
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::BuyerId",
        to = "super::user::Column::UserId"
    )]
    Buyer,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
