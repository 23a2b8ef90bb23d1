//! Stock entity - Represents one holder's current inventory of one product.
//!
//! Invariant: `quantity` is always strictly positive. Selling the exact
//! remaining quantity deletes the row instead of leaving it at zero, and a
//! later re-acquisition creates a fresh row. Only the ownership engine's
//! creation and transfer operations mutate stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock")]
pub struct Model {
    /// Unique identifier for the stock row
    #[sea_orm(primary_key)]
    pub stock_id: i64,
    /// User id of the holder
    pub user_id: String,
    /// Product this row holds
    pub product_id: String,
    /// Denormalized crop name, carried along for listings
    pub crop_name: String,
    /// Quantity held, in the product's unit; always > 0
    pub quantity: f64,
    /// Price per unit paid at acquisition; None for farmer-grown stock
    pub purchase_price: Option<f64>,
    /// Date the holding was acquired
    pub purchase_date: Date,
}

/// Defines relationships between Stock and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stock row belongs to one holder
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId"
    )]
    User,
    /// Each stock row holds one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::ProductId"
    )]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
