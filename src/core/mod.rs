//! Core business logic - framework-agnostic ledger operations.
//!
//! `user` is the identity registry, `product` and `transfer` together form
//! the ownership engine, and `provenance` is the read-only custody-chain
//! reader. Every mutating operation takes an explicit [`user::Identity`]
//! for the authenticated caller; nothing in this layer reads ambient
//! session state.

pub mod product;
pub mod provenance;
pub mod transfer;
pub mod user;
