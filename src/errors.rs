//! Unified error type for the ledger.
//!
//! Validation and business-rule violations are detected before any mutation
//! begins where possible; storage faults surface as [`Error::Database`] after
//! the enclosing SQL transaction has been rolled back. Callers only ever see
//! fully-committed or fully-rejected outcomes.

use thiserror::Error;

/// All failure modes surfaced by the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// A required field was blank or otherwise malformed.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description of the rejected field
        message: String,
    },

    /// Quantity must be positive and finite.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: f64,
    },

    /// Price must be non-negative and finite.
    #[error("Invalid price: {price}")]
    InvalidPrice {
        /// The rejected price
        price: f64,
    },

    /// The caller's role does not permit the attempted operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable description of the denied action
        message: String,
    },

    /// No user with the given id exists.
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// The unresolved user id
        user_id: String,
    },

    /// No product with the given id exists.
    #[error("Product not found: {product_id}")]
    ProductNotFound {
        /// The unresolved product id
        product_id: String,
    },

    /// A transfer named a buyer that does not resolve to a registered user.
    #[error("Buyer not found: {buyer_id}")]
    BuyerNotFound {
        /// The unresolved buyer id
        buyer_id: String,
    },

    /// A user with the given id or email is already registered.
    #[error("User already exists: {user_id}")]
    DuplicateUser {
        /// The conflicting user id
        user_id: String,
    },

    /// A product with the given id is already registered.
    #[error("Product already exists: {product_id}")]
    DuplicateProduct {
        /// The conflicting product id
        product_id: String,
    },

    /// The seller holds less of the product than the transfer requests.
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Quantity the seller currently holds
        available: f64,
        /// Quantity the transfer asked for
        requested: f64,
    },

    /// Unknown user id or wrong password.
    #[error("Invalid user ID or password")]
    InvalidCredentials,

    /// Underlying storage failure; the enclosing transaction was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Password hashing or verification failure.
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// I/O error, e.g. while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
