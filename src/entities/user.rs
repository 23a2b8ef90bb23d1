//! User entity - Represents every registered party in the supply chain.
//!
//! A user is a farmer, distributor or retailer identified by a caller-chosen
//! `user_id`. Users are created at registration and never deleted, because
//! transaction history references them forever. End customers are anonymous
//! and have no user row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role string for the privileged producer role; only farmers register products.
pub const ROLE_FARMER: &str = "farmer";

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Caller-chosen unique identifier (e.g. "FARM001")
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Display name of the party
    pub name: String,
    /// Contact email, unique across the registry
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash of the password; the clear text is never stored
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role in the supply chain: `"farmer"`, `"distributor"` or `"retailer"`
    pub user_type: String,
    /// Optional contact phone number
    pub phone: Option<String>,
    /// Optional postal address
    pub address: Option<String>,
    /// When the user registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user holds many stock rows
    #[sea_orm(has_many = "super::stock::Entity")]
    Stock,
}

impl Related<super::stock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stock.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
