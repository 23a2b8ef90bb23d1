//! Product entity - Represents one registered crop lot.
//!
//! A product is created exactly once, by a farmer. `initial_farmer_id` is
//! permanently fixed at creation; `current_owner_id` follows the product
//! through each sale to an identified buyer. A sale to an anonymous customer
//! intentionally leaves `current_owner_id` at the last identified holder, so
//! the record always names the last business in the chain. Products are
//! never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Caller-chosen unique identifier (e.g. "MANGO-2026-017")
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    /// Name of the crop (e.g. "Alphonso Mango")
    pub crop_name: String,
    /// User id of the farmer who registered the product; fixed forever
    pub initial_farmer_id: String,
    /// User id of the last identified holder
    pub current_owner_id: String,
    /// Free-form growing area / origin description
    pub area: String,
    /// Unit the quantity is measured in (e.g. "kg")
    pub unit: String,
    /// When the product was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many stock rows across holders
    #[sea_orm(has_many = "super::stock::Entity")]
    Stock,
    /// One product accumulates many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stock.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
